// SSH and code sync status models
use serde::{Deserialize, Serialize};

/// Readiness of the SSH key used to reach the worker host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum SshKeyStatus {
    /// Key is loaded in the agent, ready to use
    InAgent,
    /// Key exists but must be unlocked with its passphrase
    NeedsPassphrase { key_path: String },
    /// No key on disk, one must be generated
    NoKey { expected_path: String },
    /// No ssh-agent reachable
    NoAgent,
}

impl SshKeyStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, SshKeyStatus::InAgent)
    }
}

/// Local code vs. remote copy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum SyncStatus {
    Checking,
    UpToDate,
    Modified { count: usize, files: Vec<String> },
    Syncing,
    Error { message: String },
}

impl SyncStatus {
    /// Checking and Syncing wait on the backend
    pub fn is_busy(&self) -> bool {
        matches!(self, SyncStatus::Checking | SyncStatus::Syncing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssh_status_tagging() {
        let status: SshKeyStatus = serde_json::from_str(
            r#"{"type":"NeedsPassphrase","data":{"key_path":"/home/op/.ssh/id_ed25519"}}"#,
        )
        .unwrap();
        assert_eq!(
            status,
            SshKeyStatus::NeedsPassphrase {
                key_path: "/home/op/.ssh/id_ed25519".to_string()
            }
        );

        let agent: SshKeyStatus = serde_json::from_str(r#"{"type":"NoAgent"}"#).unwrap();
        assert_eq!(agent, SshKeyStatus::NoAgent);
        assert!(!agent.is_ready());
    }

    #[test]
    fn test_sync_status_tagging() {
        let status: SyncStatus = serde_json::from_str(
            r#"{"type":"Modified","data":{"count":2,"files":["a.py","lib/b.py"]}}"#,
        )
        .unwrap();
        match status {
            SyncStatus::Modified { count, files } => {
                assert_eq!(count, 2);
                assert_eq!(files, vec!["a.py", "lib/b.py"]);
            }
            other => panic!("unexpected status {:?}", other),
        }

        let json = serde_json::to_string(&SyncStatus::UpToDate).unwrap();
        assert_eq!(json, r#"{"type":"UpToDate"}"#);
    }
}
