//! In-memory integration tests for the periodic retry loop.

use std::sync::Arc;
use std::time::Duration;

use dockhand::host_registry::{
    adapters::memory::InMemoryAgentConnector,
    domain::{AgentEndpoint, Host, HostId, HostKind},
    services::{HostRegistry, RetryLoop},
};
use rstest::rstest;
use tokio::sync::watch;
use tokio::time::timeout;

fn endpoint() -> AgentEndpoint {
    AgentEndpoint::new("agent-1:7007").expect("valid endpoint")
}

async fn offline_registry(
    connector: &Arc<InMemoryAgentConnector>,
) -> Arc<HostRegistry<InMemoryAgentConnector>> {
    Arc::new(
        HostRegistry::new(
            vec![endpoint()],
            Arc::clone(connector),
            String::new(),
            Vec::new(),
        )
        .await,
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn loop_promotes_agent_and_stops_on_shutdown() {
    let connector = Arc::new(InMemoryAgentConnector::new());
    let registry = offline_registry(&connector).await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let retry_loop = RetryLoop::new(Arc::clone(&registry), Duration::from_millis(10), shutdown_rx);
    let handle = tokio::spawn(retry_loop.run());

    connector
        .bring_online(
            endpoint(),
            Host::new(
                HostId::new("host-1").expect("valid host id"),
                "host-1",
                "agent-1:7007",
                HostKind::Agent,
            ),
        )
        .expect("agent online");

    let promoted = timeout(Duration::from_secs(2), async {
        while !registry.pending_endpoints().await.is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(promoted.is_ok(), "agent should be promoted by the loop");

    shutdown_tx.send(true).expect("loop should still be listening");
    timeout(Duration::from_secs(1), handle)
        .await
        .expect("loop should stop")
        .expect("loop task should not panic");
    assert_eq!(registry.list().await.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn loop_stops_when_shutdown_sender_is_dropped() {
    let connector = Arc::new(InMemoryAgentConnector::new());
    let registry = offline_registry(&connector).await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(RetryLoop::new(registry, Duration::from_secs(60), shutdown_rx).run());

    drop(shutdown_tx);

    timeout(Duration::from_secs(1), handle)
        .await
        .expect("loop should stop")
        .expect("loop task should not panic");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn run_once_retries_every_pending_endpoint() {
    let connector = Arc::new(InMemoryAgentConnector::new());
    let registry = offline_registry(&connector).await;
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let retry_loop = RetryLoop::new(registry, Duration::from_secs(60), shutdown_rx);

    let report = retry_loop.run_once().await;

    assert_eq!(report.errors().len(), 1);
    assert_eq!(connector.attempts(&endpoint()), 2);
}
