//! In-memory integration tests for the host registry.

use std::sync::Arc;
use std::time::Duration;

use dockhand::host_registry::{
    adapters::memory::{InMemoryAgentConnector, StaticClientService},
    config::RegistryConfig,
    domain::{AgentEndpoint, Host, HostId, HostKind},
    ports::ClientService,
    services::{HostRegistry, SubscriptionScope},
};
use rstest::{fixture, rstest};
use tokio::sync::mpsc;
use tokio::time::timeout;

type TestRegistry = HostRegistry<InMemoryAgentConnector>;

#[fixture]
fn connector() -> Arc<InMemoryAgentConnector> {
    Arc::new(InMemoryAgentConnector::new())
}

fn agent(connector: &InMemoryAgentConnector, id: &str, raw_endpoint: &str) -> AgentEndpoint {
    let endpoint = AgentEndpoint::new(raw_endpoint).expect("valid endpoint");
    let host = Host::new(
        HostId::new(id).expect("valid host id"),
        id,
        raw_endpoint,
        HostKind::Agent,
    );
    connector
        .bring_online(endpoint.clone(), host)
        .expect("agent online");
    endpoint
}

async fn registry_from_config(
    connector: &Arc<InMemoryAgentConnector>,
    document: &str,
) -> TestRegistry {
    let config = RegistryConfig::from_json_str(document).expect("config should parse");
    let local: Arc<dyn ClientService> = Arc::new(StaticClientService::local(
        HostId::new("local").expect("valid host id"),
        "local",
    ));
    HostRegistry::new(
        config.endpoints().to_vec(),
        Arc::clone(connector),
        String::new(),
        vec![local],
    )
    .await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn configured_fleet_counts_reachable_and_pending(connector: Arc<InMemoryAgentConnector>) {
    agent(&connector, "host-1", "agent-1:7007");
    agent(&connector, "host-2", "agent-2:7007");

    let registry = registry_from_config(
        &connector,
        r#"{"endpoints": ["agent-1:7007", "agent-2:7007", "agent-3:7007"]}"#,
    )
    .await;

    let summary = registry.summary().await;
    assert_eq!(summary.clients, 3);
    assert_eq!(summary.pending_endpoints, 1);
    assert_eq!(registry.hosts().await.len(), 4);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn agents_coming_online_across_passes_are_each_announced_once(
    connector: Arc<InMemoryAgentConnector>,
) {
    let registry = registry_from_config(
        &connector,
        r#"{"endpoints": ["agent-1:7007", "agent-2:7007"]}"#,
    )
    .await;
    let (sender, mut receiver) = mpsc::channel(8);
    registry.subscribe(SubscriptionScope::new(), sender);

    agent(&connector, "host-1", "agent-1:7007");
    let first = registry.retry_and_list().await;
    agent(&connector, "host-2", "agent-2:7007");
    let second = registry.retry_and_list().await;
    let third = registry.retry_and_list().await;

    assert_eq!(first.errors().len(), 1);
    assert!(second.errors().is_empty());
    assert!(third.errors().is_empty());
    assert_eq!(third.clients().len(), 3);

    let mut announced = Vec::new();
    for _ in 0..2 {
        let host = timeout(Duration::from_secs(1), receiver.recv())
            .await
            .expect("event should arrive")
            .expect("channel open");
        announced.push(host.id().as_str().to_owned());
    }
    announced.sort();
    assert_eq!(announced, vec!["host-1", "host-2"]);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(receiver.try_recv().is_err());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn every_live_subscriber_receives_the_promotion(connector: Arc<InMemoryAgentConnector>) {
    let registry = registry_from_config(&connector, r#"{"endpoints": ["agent-1:7007"]}"#).await;
    let mut receivers = Vec::new();
    for _ in 0..3 {
        let (sender, receiver) = mpsc::channel(1);
        registry.subscribe(SubscriptionScope::new(), sender);
        receivers.push(receiver);
    }
    assert_eq!(registry.subscriber_count(), 3);

    agent(&connector, "host-1", "agent-1:7007");
    registry.retry_and_list().await;

    for mut receiver in receivers {
        let host = timeout(Duration::from_secs(1), receiver.recv())
            .await
            .expect("event should arrive")
            .expect("channel open");
        assert_eq!(host.id().as_str(), "host-1");
        assert!(host.is_available());
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stalled_subscriber_does_not_block_retry(connector: Arc<InMemoryAgentConnector>) {
    let registry = registry_from_config(
        &connector,
        r#"{"endpoints": ["agent-1:7007", "agent-2:7007"]}"#,
    )
    .await;
    let (sender, _never_drained) = mpsc::channel(1);
    registry.subscribe(SubscriptionScope::new(), sender);
    agent(&connector, "host-1", "agent-1:7007");
    agent(&connector, "host-2", "agent-2:7007");

    let report = timeout(Duration::from_secs(1), registry.retry_and_list())
        .await
        .expect("retry should not wait for subscribers");

    assert!(report.errors().is_empty());
    assert_eq!(report.clients().len(), 3);
}
