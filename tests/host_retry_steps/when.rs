//! When steps for host retry BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use super::world::{RetryWorld, agent_host, parse_endpoint, run_async};
use dockhand::host_registry::services::{HostRegistry, SubscriptionScope};
use rstest_bdd_macros::when;
use tokio::sync::mpsc;

#[when("the registry is built")]
fn build_registry(world: &mut RetryWorld) {
    let registry = run_async(HostRegistry::new(
        world.endpoints.clone(),
        Arc::clone(&world.connector),
        String::new(),
        Vec::new(),
    ));
    world.registry = Some(registry);
}

#[when("a subscriber is listening for hosts")]
fn subscriber_listening(world: &mut RetryWorld) -> Result<(), eyre::Report> {
    let scope = SubscriptionScope::new();
    let (sender, receiver) = mpsc::channel(8);
    world.registry()?.subscribe(scope.clone(), sender);
    world.scope = Some(scope);
    world.receiver = Some(receiver);
    Ok(())
}

#[when("the subscriber cancels its subscription")]
fn subscriber_cancels(world: &mut RetryWorld) -> Result<(), eyre::Report> {
    let scope = world
        .scope
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no subscriber in scenario world"))?;
    scope.cancel();

    let registry = world.registry()?;
    run_async(async {
        for _ in 0..100 {
            if registry.subscriber_count() == 0 {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        Err(eyre::eyre!("cancelled subscriber was not removed"))
    })
}

#[when(r#"the agent "{id}" comes online at "{endpoint}""#)]
fn agent_comes_online(
    world: &mut RetryWorld,
    id: String,
    endpoint: String,
) -> Result<(), eyre::Report> {
    let agent_endpoint = parse_endpoint(&endpoint)?;
    let host = agent_host(&id, &agent_endpoint)?;
    world
        .connector
        .bring_online(agent_endpoint, host)
        .map_err(|err| eyre::eyre!("bring agent online: {err}"))?;
    Ok(())
}

#[when("the registry retries pending agents")]
fn registry_retries(world: &mut RetryWorld) -> Result<(), eyre::Report> {
    let report = run_async(world.registry()?.retry_and_list());
    world.last_report = Some(report);
    Ok(())
}
