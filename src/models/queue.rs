// Queue processing status models
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueueState {
    #[default]
    Idle,
    Running,
    Paused,
}

impl QueueState {
    /// Running or paused: the queue still owns work
    pub fn is_active(self) -> bool {
        matches!(self, QueueState::Running | QueueState::Paused)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueueState::Idle => "idle",
            QueueState::Running => "running",
            QueueState::Paused => "paused",
        }
    }
}

/// Queue status as reported by `get_queue_status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    pub state: QueueState,
    pub current_job_id: Option<i64>,
    pub pending_count: u32,
    pub running_count: u32,
    pub completed_count: u32,
}

impl QueueStatus {
    pub fn has_outstanding_jobs(&self) -> bool {
        self.pending_count > 0 || self.running_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_status_wire_format() {
        let payload = r#"{
            "state": "paused",
            "currentJobId": 12,
            "pendingCount": 3,
            "runningCount": 1,
            "completedCount": 8
        }"#;

        let status: QueueStatus = serde_json::from_str(payload).unwrap();
        assert_eq!(status.state, QueueState::Paused);
        assert_eq!(status.current_job_id, Some(12));
        assert!(status.has_outstanding_jobs());
    }

    #[test]
    fn test_active_states() {
        assert!(!QueueState::Idle.is_active());
        assert!(QueueState::Running.is_active());
        assert!(QueueState::Paused.is_active());
    }
}
