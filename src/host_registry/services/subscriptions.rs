//! Subscriber fan-out for host availability events.
//!
//! Subscribers are keyed by their [`SubscriptionScope`]. Each entry removes
//! itself once its scope is cancelled; there is no explicit unsubscribe.
//! Delivery is best-effort: every event is sent from its own task, which
//! gives up as soon as the subscriber's scope is cancelled.

use crate::host_registry::domain::{Host, ScopeId};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::debug;

/// Cancellation handle that bounds the lifetime of a subscription.
///
/// Clones share the same cancellation state and the same [`ScopeId`], so
/// cancelling any clone cancels them all.
#[derive(Debug, Clone)]
pub struct SubscriptionScope {
    id: ScopeId,
    cancelled: Arc<watch::Sender<bool>>,
}

impl SubscriptionScope {
    /// Creates a live scope.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            id: ScopeId::new(),
            cancelled: Arc::new(sender),
        }
    }

    /// Returns the key this scope is stored under.
    #[must_use]
    pub const fn id(&self) -> ScopeId {
        self.id
    }

    /// Cancels the scope. Cancelling twice is a no-op.
    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    /// Returns whether the scope has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Completes once the scope is cancelled.
    pub async fn cancelled(&self) {
        let mut receiver = self.cancelled.subscribe();
        // The sender lives in `self`, so the wait only ends on cancellation.
        drop(receiver.wait_for(|cancelled| *cancelled).await);
    }
}

impl Default for SubscriptionScope {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
struct Subscriber {
    scope: SubscriptionScope,
    channel: mpsc::Sender<Host>,
}

/// Concurrent set of live subscribers.
///
/// The set is synchronised independently of the registry state, so
/// subscribing never contends with a retry pass.
#[derive(Debug, Clone, Default)]
pub struct SubscriberSet {
    entries: Arc<DashMap<ScopeId, Subscriber>>,
}

impl SubscriberSet {
    /// Creates an empty subscriber set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `channel` for future events until `scope` is cancelled.
    ///
    /// Subscribing again with the same scope replaces the stored channel.
    /// Must be called from within a Tokio runtime.
    pub fn subscribe(&self, scope: SubscriptionScope, channel: mpsc::Sender<Host>) {
        let scope_id = scope.id();
        let watched_scope = scope.clone();
        if self
            .entries
            .insert(scope_id, Subscriber { scope, channel })
            .is_some()
        {
            debug!(scope = %scope_id, "replaced subscriber channel");
        }

        let entries = Arc::clone(&self.entries);
        tokio::spawn(async move {
            watched_scope.cancelled().await;
            if entries.remove(&scope_id).is_some() {
                debug!(scope = %scope_id, "removed cancelled subscriber");
            }
        });
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no subscriber is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dispatches `host` to every live subscriber without waiting.
    ///
    /// Returns the number of deliveries dispatched. Must be called from
    /// within a Tokio runtime.
    #[must_use = "the dispatch count reports how many subscribers were notified"]
    pub fn broadcast(&self, host: &Host) -> usize {
        let subscribers: Vec<Subscriber> = self
            .entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        let dispatched = subscribers.len();
        for Subscriber { scope, channel } in subscribers {
            let event = host.clone();
            tokio::spawn(async move {
                tokio::select! {
                    biased;
                    () = scope.cancelled() => {
                        debug!(scope = %scope.id(), "abandoned delivery to cancelled subscriber");
                    }
                    sent = channel.send(event) => {
                        if sent.is_err() {
                            debug!(scope = %scope.id(), "subscriber channel closed");
                        }
                    }
                }
            });
        }
        dispatched
    }
}
