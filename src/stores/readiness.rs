// SSH key and code sync readiness
use super::observer::{SubscriptionId, Subscribers};
use crate::error::{BackendError, ReadinessError};
use crate::gateway::{Backend, BackendResult};
use crate::models::{SshKeyStatus, SyncStatus};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cached SSH key status. Only explicit backend calls change it.
pub struct SshStore {
    backend: Arc<dyn Backend>,
    status: Mutex<Option<SshKeyStatus>>,
    subscribers: Subscribers<SshKeyStatus>,
}

impl SshStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            status: Mutex::new(None),
            subscribers: Subscribers::new(),
        }
    }

    /// Last known status, `None` before the first check
    pub fn status(&self) -> Option<SshKeyStatus> {
        self.status.lock().clone()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SshKeyStatus) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    fn set(&self, status: SshKeyStatus) {
        *self.status.lock() = Some(status.clone());
        self.subscribers.notify(&status);
    }

    pub async fn check(&self) -> BackendResult<SshKeyStatus> {
        let status = self.backend.check_ssh_key_status().await?;
        debug!("SSH key status: {:?}", status);
        self.set(status.clone());
        Ok(status)
    }

    /// Load a locked key into the agent, then re-check.
    /// Only valid while the key needs its passphrase.
    pub async fn unlock(&self, passphrase: &str) -> Result<SshKeyStatus, ReadinessError> {
        match self.status() {
            Some(SshKeyStatus::NeedsPassphrase { .. }) => {}
            _ => return Err(ReadinessError::NotLocked),
        }

        let added = self.backend.add_ssh_key(passphrase).await;
        // Re-check even on failure so the cached status matches the agent
        let status = self.check().await?;
        added?;
        info!("SSH key added to agent");
        Ok(status)
    }

    /// Open the backend's SSH session, returns the connected identity
    pub async fn connect(&self) -> BackendResult<String> {
        let identity = self.backend.init_ssh().await?;
        info!("SSH connected as {}", identity);
        Ok(identity)
    }

    pub async fn disconnect(&self) -> BackendResult<()> {
        self.backend.close_ssh().await
    }

    pub async fn test_connection(&self) -> BackendResult<bool> {
        self.backend.test_ssh().await
    }
}

/// Cached code sync status. The backend drives every transition.
pub struct SyncStore {
    backend: Arc<dyn Backend>,
    status: Mutex<Option<SyncStatus>>,
    subscribers: Subscribers<SyncStatus>,
}

impl SyncStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            status: Mutex::new(None),
            subscribers: Subscribers::new(),
        }
    }

    pub fn status(&self) -> Option<SyncStatus> {
        self.status.lock().clone()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SyncStatus) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    fn set(&self, status: SyncStatus) {
        *self.status.lock() = Some(status.clone());
        self.subscribers.notify(&status);
    }

    /// Compare local code with the remote copy. A failed check is shown as
    /// `SyncStatus::Error` rather than returned.
    pub async fn check(&self) -> SyncStatus {
        self.set(SyncStatus::Checking);
        let status = match self.backend.check_sync_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!("Sync check failed: {}", e);
                SyncStatus::Error {
                    message: e.user_message(),
                }
            }
        };
        self.set(status.clone());
        status
    }

    /// Push local code to the worker, then re-check whatever the outcome
    pub async fn sync(&self) -> Result<SyncStatus, BackendError> {
        self.set(SyncStatus::Syncing);
        let result = self.backend.sync_code().await;
        let status = self.check().await;
        result?;
        info!("Code synced");
        Ok(status)
    }

    /// Sync only the files a benchmark imports. Returns the file count.
    pub async fn sync_benchmark_deps(&self, benchmark_path: &str) -> Result<usize, BackendError> {
        self.set(SyncStatus::Syncing);
        let result = self.backend.sync_benchmark_deps(benchmark_path).await;
        self.check().await;
        let count = result?;
        info!("Synced {} files for {}", count, benchmark_path);
        Ok(count)
    }
}

/// Precondition for syncing code or dispatching jobs
pub struct ReadinessGate {
    ssh: Arc<SshStore>,
}

impl ReadinessGate {
    pub fn new(ssh: Arc<SshStore>) -> Self {
        Self { ssh }
    }

    /// Re-check the SSH key and map it to a readiness decision
    pub async fn ensure_ready(&self) -> Result<(), ReadinessError> {
        let status = self.ssh.check().await?;
        readiness_of(&status)
    }
}

pub fn readiness_of(status: &SshKeyStatus) -> Result<(), ReadinessError> {
    match status {
        SshKeyStatus::InAgent => Ok(()),
        SshKeyStatus::NeedsPassphrase { key_path } => Err(ReadinessError::PassphraseRequired {
            key_path: key_path.clone(),
        }),
        SshKeyStatus::NoKey { expected_path } => Err(ReadinessError::KeyGenerationRequired {
            expected_path: expected_path.clone(),
        }),
        SshKeyStatus::NoAgent => Err(ReadinessError::AgentUnavailable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_mapping() {
        assert!(readiness_of(&SshKeyStatus::InAgent).is_ok());
        assert_eq!(
            readiness_of(&SshKeyStatus::NeedsPassphrase {
                key_path: "~/.ssh/id_rsa".to_string()
            }),
            Err(ReadinessError::PassphraseRequired {
                key_path: "~/.ssh/id_rsa".to_string()
            })
        );
        assert_eq!(
            readiness_of(&SshKeyStatus::NoKey {
                expected_path: "~/.ssh/id_ed25519".to_string()
            }),
            Err(ReadinessError::KeyGenerationRequired {
                expected_path: "~/.ssh/id_ed25519".to_string()
            })
        );
        assert_eq!(
            readiness_of(&SshKeyStatus::NoAgent),
            Err(ReadinessError::AgentUnavailable)
        );
    }
}
