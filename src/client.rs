// Client facade wiring the stores, notifications and shortcuts together
use crate::error::{ReadinessError, Result};
use crate::gateway::{Backend, BackendResult};
use crate::models::{AppConfig, ClientSettings, Job, SshKeyStatus, SyncStatus};
use crate::notifications::{NotificationAction, NotificationCenter, NotificationKind};
use crate::shortcuts::ShortcutRegistry;
use crate::stores::{
    JobMonitor, QueueController, QueueSnapshot, ReadinessGate, SshStore, SubscriptionId, SyncStore,
};
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// What the user asked for from a readiness notification.
/// The UI drains these from [`BenchClient::take_follow_ups`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    RetryReadiness,
    OpenSettings,
    UnlockKey { key_path: String },
    GenerateKey { expected_path: String },
}

pub struct BenchClient {
    backend: Arc<dyn Backend>,
    settings: ClientSettings,
    queue: QueueController,
    jobs: JobMonitor,
    ssh: Arc<SshStore>,
    sync: SyncStore,
    gate: ReadinessGate,
    notifications: NotificationCenter,
    shortcuts: ShortcutRegistry,
    follow_up_tx: UnboundedSender<FollowUp>,
    follow_up_rx: Mutex<Option<UnboundedReceiver<FollowUp>>>,
    completion: Mutex<Option<SubscriptionId>>,
}

impl BenchClient {
    pub fn new(backend: Arc<dyn Backend>, settings: ClientSettings) -> Self {
        let ssh = Arc::new(SshStore::new(backend.clone()));
        let (follow_up_tx, follow_up_rx) = mpsc::unbounded_channel();

        Self {
            queue: QueueController::new(backend.clone(), settings.poll_interval()),
            jobs: JobMonitor::new(backend.clone()),
            sync: SyncStore::new(backend.clone()),
            gate: ReadinessGate::new(ssh.clone()),
            notifications: NotificationCenter::from_settings(&settings),
            shortcuts: ShortcutRegistry::new(),
            ssh,
            backend,
            settings,
            follow_up_tx,
            follow_up_rx: Mutex::new(Some(follow_up_rx)),
            completion: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn queue(&self) -> &QueueController {
        &self.queue
    }

    pub fn jobs(&self) -> &JobMonitor {
        &self.jobs
    }

    pub fn ssh(&self) -> &Arc<SshStore> {
        &self.ssh
    }

    pub fn sync(&self) -> &SyncStore {
        &self.sync
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn shortcuts(&self) -> &ShortcutRegistry {
        &self.shortcuts
    }

    /// Receiver for notification follow-ups. Only the first call gets it.
    pub fn take_follow_ups(&self) -> Option<UnboundedReceiver<FollowUp>> {
        self.follow_up_rx.lock().take()
    }

    /// Attach shortcuts, watch for queue completion and start polling.
    /// Calling it again is harmless.
    pub fn init(&self) {
        self.shortcuts.attach();

        {
            let mut completion = self.completion.lock();
            if completion.is_none() {
                let notifications = self.notifications.clone();
                let id = self.queue.store().subscribe(move |snapshot: &QueueSnapshot| {
                    if snapshot.just_completed {
                        notifications.success("Queue completed");
                    }
                });
                *completion = Some(id);
            }
        }

        self.queue.init_polling();
        info!("Client initialized");
    }

    pub fn shutdown(&self) {
        self.queue.stop_polling();
        self.shortcuts.detach();
        if let Some(id) = self.completion.lock().take() {
            self.queue.store().unsubscribe(id);
        }
        self.notifications.clear();
        info!("Client shut down");
    }

    pub async fn load_config(&self) -> BackendResult<Option<AppConfig>> {
        if !self.backend.check_config_exists().await? {
            debug!("No backend config yet");
            return Ok(None);
        }
        self.backend.load_config().await.map(Some)
    }

    /// Start dispatching queued jobs once SSH is usable
    pub async fn start_queue(&self) -> Result<()> {
        self.check_readiness().await?;
        self.report(self.queue.start_queue().await)?;
        let snapshot = self.queue.snapshot();
        self.notifications.info(format!(
            "Queue started - processing {} jobs",
            snapshot.outstanding()
        ));
        Ok(())
    }

    pub async fn pause_queue(&self) -> BackendResult<()> {
        self.report(self.queue.pause_queue().await)?;
        let snapshot = self.queue.snapshot();
        self.notifications.info(format!(
            "Queue paused - {} jobs remaining",
            snapshot.outstanding()
        ));
        Ok(())
    }

    pub async fn resume_queue(&self) -> Result<()> {
        self.check_readiness().await?;
        self.report(self.queue.resume_queue().await)?;
        let snapshot = self.queue.snapshot();
        self.notifications.info(format!(
            "Queue resumed - processing {} jobs",
            snapshot.outstanding()
        ));
        Ok(())
    }

    pub async fn stop_queue(&self) -> BackendResult<()> {
        self.report(self.queue.stop_queue().await)?;
        self.notifications.info("Queue stopped - current job will finish");
        Ok(())
    }

    /// Check the SSH key. A blocking condition is raised as a persistent
    /// notification whose actions send a [`FollowUp`].
    pub async fn check_readiness(&self) -> std::result::Result<(), ReadinessError> {
        match self.gate.ensure_ready().await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.notify_readiness(&e);
                Err(e)
            }
        }
    }

    pub async fn unlock_key(&self, passphrase: &str) -> std::result::Result<SshKeyStatus, ReadinessError> {
        match self.ssh.unlock(passphrase).await {
            Ok(status) => {
                self.notifications.success("SSH key added to agent");
                Ok(status)
            }
            Err(e) => {
                self.notifications.error(e.to_string());
                Err(e)
            }
        }
    }

    /// Queue benchmarks once SSH is usable, then resync the queue view
    pub async fn queue_benchmarks(&self, benchmark_ids: &[i64], force_duplicate: bool) -> Result<Vec<Job>> {
        self.check_readiness().await?;

        let jobs = self.report(
            self.backend
                .queue_benchmarks(benchmark_ids, force_duplicate)
                .await,
        )?;
        info!("Queued {} jobs", jobs.len());
        self.queue.resync().await;

        let noun = if jobs.len() == 1 { "benchmark" } else { "benchmarks" };
        self.notifications
            .success(format!("Queued {} {}", jobs.len(), noun));
        Ok(jobs)
    }

    /// Dispatch the next pending job by hand, once SSH is usable
    pub async fn start_next_job(&self) -> Result<Option<Job>> {
        self.check_readiness().await?;
        let job = self.report(self.jobs.start_next_job().await)?;
        self.queue.resync().await;
        if let Some(job) = &job {
            self.notifications
                .info(format!("Started {}", job.benchmark_name));
        }
        Ok(job)
    }

    /// Push local code to the worker once SSH is usable. A failed sync, or a
    /// re-check that ends in `SyncStatus::Error`, stays on screen with
    /// retry actions.
    pub async fn sync_code(&self) -> Result<SyncStatus> {
        self.check_readiness().await?;
        match self.sync.sync().await {
            Ok(SyncStatus::Error { message }) => {
                self.notify_sync_error(&message);
                Ok(SyncStatus::Error { message })
            }
            Ok(status) => {
                self.notifications.success("Code synced");
                Ok(status)
            }
            Err(e) => {
                self.notify_sync_error(&e.user_message());
                Err(e.into())
            }
        }
    }

    /// Compare local code with the worker's copy
    pub async fn check_sync(&self) -> SyncStatus {
        let status = self.sync.check().await;
        if let SyncStatus::Error { message } = &status {
            self.notify_sync_error(message);
        }
        status
    }

    pub async fn cancel_all_pending(&self) -> BackendResult<u32> {
        let count = self.report(self.jobs.cancel_all_pending().await)?;
        self.queue.resync().await;
        self.notifications
            .info(format!("Cancelled {} pending jobs", count));
        Ok(count)
    }

    fn report<T>(&self, result: BackendResult<T>) -> BackendResult<T> {
        if let Err(e) = &result {
            self.notifications.error(e.user_message());
        }
        result
    }

    fn follow_up(&self, label: &str, follow_up: FollowUp) -> NotificationAction {
        let tx = self.follow_up_tx.clone();
        NotificationAction::new(label, move || {
            if tx.send(follow_up.clone()).is_err() {
                debug!("Follow-up {:?} dropped, nobody is listening", follow_up);
            }
        })
    }

    fn notify_sync_error(&self, message: &str) {
        let actions = vec![
            self.follow_up("Retry", FollowUp::RetryReadiness),
            self.follow_up("Settings", FollowUp::OpenSettings),
        ];
        self.notifications.add_with_actions(
            NotificationKind::Error,
            format!("Code sync failed: {}", message),
            actions,
        );
    }

    fn notify_readiness(&self, error: &ReadinessError) {
        let (kind, actions) = match error {
            ReadinessError::PassphraseRequired { key_path } => (
                NotificationKind::Warning,
                vec![self.follow_up(
                    "Unlock key",
                    FollowUp::UnlockKey {
                        key_path: key_path.clone(),
                    },
                )],
            ),
            ReadinessError::KeyGenerationRequired { expected_path } => (
                NotificationKind::Warning,
                vec![
                    self.follow_up(
                        "Generate key",
                        FollowUp::GenerateKey {
                            expected_path: expected_path.clone(),
                        },
                    ),
                    self.follow_up("Settings", FollowUp::OpenSettings),
                ],
            ),
            ReadinessError::AgentUnavailable => (
                NotificationKind::Error,
                vec![
                    self.follow_up("Retry", FollowUp::RetryReadiness),
                    self.follow_up("Settings", FollowUp::OpenSettings),
                ],
            ),
            ReadinessError::NotLocked | ReadinessError::Backend(_) => (
                NotificationKind::Error,
                vec![self.follow_up("Retry", FollowUp::RetryReadiness)],
            ),
        };

        self.notifications
            .add_with_actions(kind, error.to_string(), actions);
    }
}

