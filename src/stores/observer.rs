// Explicit change subscriptions for the client stores
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

pub type SubscriptionId = u64;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Subscriber<T> {
    id: SubscriptionId,
    callback: Callback<T>,
    running: Arc<AtomicBool>,
}

/// Resets a subscriber's running flag even if its callback panics
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// List of change callbacks for one store.
///
/// A callback that mutates the store it observes is not called again for the
/// notification its own mutation raises.
pub struct Subscribers<T> {
    next_id: AtomicU64,
    entries: Mutex<Vec<Subscriber<T>>>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Subscribers<T> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().push(Subscriber {
            id,
            callback: Arc::new(callback),
            running: Arc::new(AtomicBool::new(false)),
        });
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|s| s.id != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn notify(&self, value: &T) {
        // Snapshot first: callbacks may subscribe/unsubscribe while we iterate
        let snapshot: Vec<(Callback<T>, Arc<AtomicBool>)> = self
            .entries
            .lock()
            .iter()
            .map(|s| (s.callback.clone(), s.running.clone()))
            .collect();

        for (callback, running) in snapshot {
            if running.swap(true, Ordering::SeqCst) {
                continue;
            }
            let _guard = RunningGuard(running);
            callback(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_notify_and_unsubscribe() {
        let subscribers = Subscribers::<u32>::new();
        let total = Arc::new(AtomicUsize::new(0));

        let total_clone = total.clone();
        let id = subscribers.subscribe(move |v| {
            total_clone.fetch_add(*v as usize, Ordering::SeqCst);
        });

        subscribers.notify(&3);
        subscribers.notify(&4);
        assert_eq!(total.load(Ordering::SeqCst), 7);

        assert!(subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(id));
        subscribers.notify(&10);
        assert_eq!(total.load(Ordering::SeqCst), 7);
        assert!(subscribers.is_empty());
    }

    #[test]
    fn test_reentrant_notify_skips_running_handler() {
        let subscribers = Arc::new(Subscribers::<u32>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let subs = subscribers.clone();
        let calls_clone = calls.clone();
        subscribers.subscribe(move |v| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            // A handler that triggers another notification must not loop
            subs.notify(&(v + 1));
        });

        subscribers.notify(&0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        subscribers.notify(&0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_other_handlers_see_nested_notification() {
        let subscribers = Arc::new(Subscribers::<u32>::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let subs = subscribers.clone();
        subscribers.subscribe(move |v| {
            if *v == 0 {
                subs.notify(&1);
            }
        });
        let seen_clone = seen.clone();
        subscribers.subscribe(move |v| seen_clone.lock().push(*v));

        subscribers.notify(&0);
        assert_eq!(*seen.lock(), vec![1, 0]);
    }
}
