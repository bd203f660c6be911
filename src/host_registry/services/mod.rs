//! Application services for the host registry.

mod registry;
mod retry_loop;
mod subscriptions;

pub use registry::{EndpointRetryError, HostRegistry, RegistrySummary, RetryReport};
pub use retry_loop::RetryLoop;
pub use subscriptions::{SubscriberSet, SubscriptionScope};
