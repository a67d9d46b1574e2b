// Client-side state stores kept in sync with the backend
pub mod jobs;
pub mod observer;
pub mod poller;
pub mod queue;
pub mod readiness;

pub use jobs::JobMonitor;
pub use observer::{SubscriptionId, Subscribers};
pub use poller::{PollOutcome, PollStats, QueueController, QueuePoller, DEFAULT_POLL_INTERVAL};
pub use queue::{QueueSnapshot, QueueStore};
pub use readiness::{readiness_of, ReadinessGate, SshStore, SyncStore};
