//! Control-plane client for a remote Python benchmark runner.
//!
//! The backend owns SSH sessions, the job database and the worker; this crate
//! keeps a local view of the job queue in sync with it, gates work on SSH
//! readiness and routes notifications and keyboard shortcuts for a UI.

pub mod client;
pub mod error;
pub mod file_manager;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod settings;
pub mod shortcuts;
pub mod stores;
pub mod utils;

pub use client::{BenchClient, FollowUp};
pub use error::{BackendError, ClientError, FileError, ReadinessError, Result};
pub use gateway::{Backend, BackendResult, Gateway, HandlerTransport, Transport};
pub use notifications::{Notification, NotificationAction, NotificationCenter, NotificationKind};
pub use shortcuts::{DispatchOutcome, KeyEvent, Shortcut, ShortcutConfig, ShortcutRegistry};
pub use stores::{PollOutcome, QueueController, QueuePoller, QueueSnapshot, QueueStore};
