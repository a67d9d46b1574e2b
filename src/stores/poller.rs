// Queue status polling and queue control commands
use super::observer::SubscriptionId;
use super::queue::{QueueSnapshot, QueueStore};
use crate::error::BackendError;
use crate::gateway::{Backend, BackendResult};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Result of one poll attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Status fetched and applied to the store
    Applied(QueueSnapshot),
    /// Another poll was still outstanding, nothing was requested
    Skipped,
    /// The backend call failed, the previous snapshot is kept
    Failed(BackendError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollStats {
    pub applied: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Releases the in-flight flag when the poll resolves or is cancelled,
/// and wakes resyncs waiting for it
struct InFlight<'a> {
    flag: &'a AtomicBool,
    idle: &'a Notify,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        self.idle.notify_waiters();
    }
}

/// Pulls queue status from the backend into a [`QueueStore`].
///
/// At most one `get_queue_status` request is outstanding at any time.
pub struct QueuePoller {
    backend: Arc<dyn Backend>,
    store: Arc<QueueStore>,
    interval: Duration,
    in_flight: AtomicBool,
    idle: Notify,
    schedule: Mutex<Option<CancellationToken>>,
    applied: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

impl QueuePoller {
    pub fn new(backend: Arc<dyn Backend>, store: Arc<QueueStore>, interval: Duration) -> Self {
        Self {
            backend,
            store,
            interval,
            in_flight: AtomicBool::new(false),
            idle: Notify::new(),
            schedule: Mutex::new(None),
            applied: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// A poll request is outstanding
    pub fn is_polling(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// The periodic schedule is active
    pub fn is_running(&self) -> bool {
        self.schedule.lock().is_some()
    }

    pub fn stats(&self) -> PollStats {
        PollStats {
            applied: self.applied.load(Ordering::SeqCst),
            skipped: self.skipped.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }

    fn try_begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InFlight {
                flag: &self.in_flight,
                idle: &self.idle,
            })
    }

    /// Fetch and apply the queue status once, unless a poll is already outstanding.
    pub async fn poll_now(&self) -> PollOutcome {
        let Some(guard) = self.try_begin() else {
            self.skipped.fetch_add(1, Ordering::SeqCst);
            debug!("Queue poll skipped, previous poll still outstanding");
            return PollOutcome::Skipped;
        };
        self.fetch(guard).await
    }

    /// Poll with a request issued after this call. An outstanding poll may
    /// predate a mutation, so this waits for it to finish and then polls
    /// again instead of skipping.
    pub async fn poll_fresh(&self) -> PollOutcome {
        loop {
            // Registered before the flag check so the release cannot be missed
            let released = self.idle.notified();
            if let Some(guard) = self.try_begin() {
                return self.fetch(guard).await;
            }
            debug!("Waiting for the outstanding queue poll before resyncing");
            released.await;
        }
    }

    async fn fetch(&self, _guard: InFlight<'_>) -> PollOutcome {
        match self.backend.get_queue_status().await {
            Ok(status) => {
                self.applied.fetch_add(1, Ordering::SeqCst);
                PollOutcome::Applied(self.store.apply(status))
            }
            Err(e) => {
                // Transient: keep the last good snapshot, never surface to the user
                self.failed.fetch_add(1, Ordering::SeqCst);
                debug!("Queue poll failed: {}", e);
                PollOutcome::Failed(e)
            }
        }
    }

    /// Start the periodic schedule. Returns false if it was already running
    /// or if no Tokio runtime is available.
    pub fn start(self: &Arc<Self>) -> bool {
        let mut schedule = self.schedule.lock();
        if schedule.is_some() {
            debug!("Queue polling is already running");
            return false;
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("Cannot start queue polling outside of a Tokio runtime");
                return false;
            }
        };

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let weak = Arc::downgrade(self);
        let period = self.interval;

        handle.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let Some(poller) = weak.upgrade() else {
                    break;
                };

                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = poller.poll_now() => {}
                }
            }

            debug!("Queue polling stopped");
        });

        *schedule = Some(token);
        info!("Queue polling started (every {:?})", period);
        true
    }

    /// Cancel the schedule. Safe to call repeatedly or before `start`.
    pub fn stop(&self) -> bool {
        match self.schedule.lock().take() {
            Some(token) => {
                token.cancel();
                debug!("Stopping queue polling...");
                true
            }
            None => false,
        }
    }
}

impl Drop for QueuePoller {
    fn drop(&mut self) {
        if let Some(token) = self.schedule.get_mut().take() {
            token.cancel();
        }
    }
}

/// Queue commands plus the poller that keeps the local view in sync.
///
/// Polling is started lazily, by [`QueueController::init_polling`] or the
/// first [`QueueController::observe`], never by construction.
pub struct QueueController {
    backend: Arc<dyn Backend>,
    store: Arc<QueueStore>,
    poller: Arc<QueuePoller>,
}

impl QueueController {
    pub fn new(backend: Arc<dyn Backend>, interval: Duration) -> Self {
        let store = Arc::new(QueueStore::new());
        let poller = Arc::new(QueuePoller::new(backend.clone(), store.clone(), interval));
        Self {
            backend,
            store,
            poller,
        }
    }

    pub fn store(&self) -> &Arc<QueueStore> {
        &self.store
    }

    pub fn poller(&self) -> &Arc<QueuePoller> {
        &self.poller
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        self.store.snapshot()
    }

    pub fn init_polling(&self) -> bool {
        self.poller.start()
    }

    pub fn stop_polling(&self) -> bool {
        self.poller.stop()
    }

    /// Subscribe to queue changes, starting the poller if needed
    pub fn observe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&QueueSnapshot) + Send + Sync + 'static,
    {
        let id = self.store.subscribe(callback);
        self.init_polling();
        id
    }

    pub async fn refresh(&self) -> PollOutcome {
        self.poller.poll_now().await
    }

    pub async fn start_queue(&self) -> BackendResult<()> {
        self.backend.start_queue_processing().await?;
        info!("Queue processing start requested");
        self.resync().await;
        Ok(())
    }

    /// Current job finishes, no new job is dispatched
    pub async fn pause_queue(&self) -> BackendResult<()> {
        self.backend.pause_queue_processing().await?;
        info!("Queue processing pause requested");
        self.resync().await;
        Ok(())
    }

    pub async fn resume_queue(&self) -> BackendResult<()> {
        self.backend.resume_queue_processing().await?;
        info!("Queue processing resume requested");
        self.resync().await;
        Ok(())
    }

    /// Stop after the current job, without killing it
    pub async fn stop_queue(&self) -> BackendResult<()> {
        self.backend.stop_queue_processing().await?;
        info!("Queue processing stop requested");
        self.resync().await;
        Ok(())
    }

    /// Poll right after a mutation instead of waiting for the next tick.
    /// Never returns `Skipped`: an outstanding poll is awaited first.
    pub async fn resync(&self) -> PollOutcome {
        self.poller.poll_fresh().await
    }
}
