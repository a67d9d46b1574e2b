// Transient user notifications (toasts)
use crate::models::ClientSettings;
use crate::stores::{SubscriptionId, Subscribers};
use log::{debug, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::AbortHandle;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

/// Follow-up button attached to a notification
#[derive(Clone)]
pub struct NotificationAction {
    pub label: String,
    callback: Arc<dyn Fn() + Send + Sync>,
}

impl NotificationAction {
    pub fn new<F>(label: impl Into<String>, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            callback: Arc::new(callback),
        }
    }

    pub fn run(&self) {
        (self.callback)()
    }
}

impl fmt::Debug for NotificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub duration: Option<Duration>,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Notifications with actions wait for the user whatever their duration
    pub fn auto_dismiss_after(&self) -> Option<Duration> {
        if self.actions.is_empty() {
            self.duration.filter(|d| !d.is_zero())
        } else {
            None
        }
    }
}

struct Inner {
    items: Mutex<Vec<Notification>>,
    timers: Mutex<HashMap<String, AbortHandle>>,
    default_duration: Option<Duration>,
    subscribers: Subscribers<Vec<Notification>>,
}

/// Shared list of notifications. Cloning gives another handle to the same list.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Some(Duration::from_millis(5000)))
    }
}

impl NotificationCenter {
    pub fn new(default_duration: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(Inner {
                items: Mutex::new(Vec::new()),
                timers: Mutex::new(HashMap::new()),
                default_duration,
                subscribers: Subscribers::new(),
            }),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self::new(settings.notification_duration())
    }

    pub fn list(&self) -> Vec<Notification> {
        self.inner.items.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<Notification> {
        self.inner.items.lock().iter().find(|n| n.id == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.items.lock().iter().any(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.inner.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.lock().is_empty()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Vec<Notification>) + Send + Sync + 'static,
    {
        self.inner.subscribers.subscribe(callback)
    }

    /// Add a notification; `duration: None` keeps it until dismissed.
    /// Returns the generated id.
    pub fn add(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> String {
        self.push(kind, message.into(), duration, Vec::new())
    }

    /// Add a notification with follow-up actions. It is never auto-dismissed.
    pub fn add_with_actions(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        actions: Vec<NotificationAction>,
    ) -> String {
        self.push(kind, message.into(), None, actions)
    }

    pub fn success(&self, message: impl Into<String>) -> String {
        self.add(NotificationKind::Success, message, self.inner.default_duration)
    }

    pub fn error(&self, message: impl Into<String>) -> String {
        self.add(NotificationKind::Error, message, self.inner.default_duration)
    }

    pub fn info(&self, message: impl Into<String>) -> String {
        self.add(NotificationKind::Info, message, self.inner.default_duration)
    }

    pub fn warning(&self, message: impl Into<String>) -> String {
        self.add(NotificationKind::Warning, message, self.inner.default_duration)
    }

    fn push(
        &self,
        kind: NotificationKind,
        message: String,
        duration: Option<Duration>,
        actions: Vec<NotificationAction>,
    ) -> String {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            kind,
            message,
            duration,
            actions,
        };
        let id = notification.id.clone();
        let expires = notification.auto_dismiss_after();

        self.inner.items.lock().push(notification);
        if let Some(after) = expires {
            self.schedule_removal(&id, after);
        }
        self.notify();
        id
    }

    fn schedule_removal(&self, id: &str, after: Duration) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No Tokio runtime, notification {} will not auto-dismiss", id);
                return;
            }
        };

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let timer_id = id.to_string();

        // Held across the spawn: on a multi-thread runtime the task may expire
        // before we return, and `expire` must find its handle
        let mut timers = self.inner.timers.lock();
        let task = handle.spawn(async move {
            tokio::time::sleep(after).await;
            if let Some(inner) = weak.upgrade() {
                NotificationCenter { inner }.expire(&timer_id);
            }
        });
        timers.insert(id.to_string(), task.abort_handle());
    }

    /// Timer path: the timer task is finishing, so it is dropped, not aborted
    fn expire(&self, id: &str) {
        self.inner.timers.lock().remove(id);
        if self.remove_item(id) {
            debug!("Notification {} expired", id);
            self.notify();
        }
    }

    /// Dismiss a notification. Removing an unknown id is a no-op.
    pub fn remove(&self, id: &str) -> bool {
        if let Some(timer) = self.inner.timers.lock().remove(id) {
            timer.abort();
        }
        let removed = self.remove_item(id);
        if removed {
            self.notify();
        }
        removed
    }

    pub fn clear(&self) {
        for (_, timer) in self.inner.timers.lock().drain() {
            timer.abort();
        }
        let had_items = {
            let mut items = self.inner.items.lock();
            let had_items = !items.is_empty();
            items.clear();
            had_items
        };
        if had_items {
            self.notify();
        }
    }

    /// Run the action at `index` and dismiss its notification
    pub fn invoke_action(&self, id: &str, index: usize) -> bool {
        let action = self
            .get(id)
            .and_then(|n| n.actions.get(index).cloned());
        match action {
            Some(action) => {
                // Lock released before the callback, it may add notifications
                action.run();
                self.remove(id);
                true
            }
            None => false,
        }
    }

    fn remove_item(&self, id: &str) -> bool {
        let mut items = self.inner.items.lock();
        let before = items.len();
        items.retain(|n| n.id != id);
        items.len() != before
    }

    fn notify(&self) {
        let items = self.list();
        self.inner.subscribers.notify(&items);
    }
}
