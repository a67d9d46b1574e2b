// Queue state machine fed by polled backend status
use super::observer::{SubscriptionId, Subscribers};
use crate::models::{QueueState, QueueStatus};
use log::{info, warn};
use parking_lot::Mutex;

/// Locally cached view of the queue, as last applied
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueSnapshot {
    pub state: QueueState,
    pub current_job_id: Option<i64>,
    pub pending_count: u32,
    pub running_count: u32,
    pub completed_count: u32,
    /// True for exactly one observation after the queue drains on its own
    pub just_completed: bool,
    /// The backend reported a status that breaks the queue invariants
    pub anomaly: bool,
}

impl QueueSnapshot {
    pub fn outstanding(&self) -> u32 {
        self.pending_count.saturating_add(self.running_count)
    }
}

#[derive(Default)]
struct Tracker {
    snapshot: QueueSnapshot,
    previous_state: QueueState,
    had_pending_jobs: bool,
    observations: u64,
}

#[derive(Default)]
pub struct QueueStore {
    tracker: Mutex<Tracker>,
    subscribers: Subscribers<QueueSnapshot>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        self.tracker.lock().snapshot.clone()
    }

    pub fn state(&self) -> QueueState {
        self.tracker.lock().snapshot.state
    }

    pub fn just_completed(&self) -> bool {
        self.tracker.lock().snapshot.just_completed
    }

    /// Number of statuses applied so far
    pub fn observations(&self) -> u64 {
        self.tracker.lock().observations
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&QueueSnapshot) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Apply one successfully fetched status and notify subscribers.
    pub fn apply(&self, status: QueueStatus) -> QueueSnapshot {
        let snapshot = {
            let mut tracker = self.tracker.lock();

            let queue_empty = !status.has_outstanding_jobs();
            let just_completed = tracker.previous_state.is_active()
                && tracker.had_pending_jobs
                && status.state == QueueState::Idle
                && queue_empty;

            let (state, anomaly) = normalize(&status);

            tracker.snapshot = QueueSnapshot {
                state,
                current_job_id: if anomaly { None } else { status.current_job_id },
                pending_count: status.pending_count,
                running_count: status.running_count,
                completed_count: status.completed_count,
                just_completed,
                anomaly,
            };

            // Transitions are tracked on what the backend reported, not the display fallback
            tracker.previous_state = status.state;
            tracker.had_pending_jobs = status.has_outstanding_jobs();
            tracker.observations += 1;

            if just_completed {
                info!(
                    "Queue drained: {} jobs completed",
                    status.completed_count
                );
            }

            tracker.snapshot.clone()
        };

        self.subscribers.notify(&snapshot);
        snapshot
    }
}

/// Safe reading of a status that may violate the queue invariants
fn normalize(status: &QueueStatus) -> (QueueState, bool) {
    match status.state {
        QueueState::Running if status.current_job_id.is_none() => {
            warn!(
                "Queue reported running without a current job (pending={}, running={}), treating as idle",
                status.pending_count, status.running_count
            );
            (QueueState::Idle, true)
        }
        QueueState::Idle if status.running_count > 0 => {
            warn!(
                "Queue reported idle with {} running jobs",
                status.running_count
            );
            (QueueState::Idle, true)
        }
        state => (state, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn status(state: QueueState, current: Option<i64>, pending: u32, running: u32) -> QueueStatus {
        QueueStatus {
            state,
            current_job_id: current,
            pending_count: pending,
            running_count: running,
            completed_count: 0,
        }
    }

    #[test]
    fn test_idle_at_startup_is_not_completion() {
        let store = QueueStore::new();
        let snap = store.apply(status(QueueState::Idle, None, 0, 0));
        assert!(!snap.just_completed);
        assert_eq!(snap.state, QueueState::Idle);
        assert_eq!(store.observations(), 1);
    }

    #[test]
    fn test_completion_signal_lasts_one_observation() {
        let store = QueueStore::new();
        store.apply(status(QueueState::Running, Some(1), 2, 1));
        store.apply(status(QueueState::Running, Some(2), 1, 1));

        let done = store.apply(status(QueueState::Idle, None, 0, 0));
        assert!(done.just_completed);
        assert!(store.just_completed());

        let after = store.apply(status(QueueState::Idle, None, 0, 0));
        assert!(!after.just_completed);
    }

    #[test]
    fn test_paused_queue_draining_completes() {
        let store = QueueStore::new();
        store.apply(status(QueueState::Paused, Some(9), 0, 1));
        assert!(store.apply(status(QueueState::Idle, None, 0, 0)).just_completed);
    }

    #[test]
    fn test_active_queue_without_jobs_does_not_complete() {
        let store = QueueStore::new();
        store.apply(status(QueueState::Paused, None, 0, 0));
        assert!(!store.apply(status(QueueState::Idle, None, 0, 0)).just_completed);
    }

    #[test]
    fn test_idle_with_pending_does_not_complete() {
        let store = QueueStore::new();
        store.apply(status(QueueState::Running, Some(1), 1, 1));
        // Stopped by the operator with work left
        assert!(!store.apply(status(QueueState::Idle, None, 1, 0)).just_completed);
    }

    #[test]
    fn test_running_without_current_job_reads_as_idle() {
        let store = QueueStore::new();
        let snap = store.apply(status(QueueState::Running, None, 2, 0));
        assert_eq!(snap.state, QueueState::Idle);
        assert!(snap.anomaly);

        // The backend-reported state still counts for completion detection
        let done = store.apply(status(QueueState::Idle, None, 0, 0));
        assert!(done.just_completed);
        assert!(!done.anomaly);
    }

    #[test]
    fn test_subscribers_see_every_apply() {
        let store = QueueStore::new();
        let completions = Arc::new(AtomicUsize::new(0));
        let completions_clone = completions.clone();
        store.subscribe(move |snap| {
            if snap.just_completed {
                completions_clone.fetch_add(1, Ordering::SeqCst);
            }
        });

        store.apply(status(QueueState::Running, Some(1), 0, 1));
        store.apply(status(QueueState::Idle, None, 0, 0));
        store.apply(status(QueueState::Idle, None, 0, 0));
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_outstanding_saturates() {
        let store = QueueStore::new();
        let snap = store.apply(status(QueueState::Running, Some(1), u32::MAX, 1));
        assert_eq!(snap.outstanding(), u32::MAX);
    }
}
