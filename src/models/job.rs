// Benchmark job data models
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Killed,
}

impl JobStatus {
    /// Completed, failed and killed jobs never change status again
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Killed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Killed => "killed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: i64,
    #[serde(default)]
    pub project_id: Option<i64>,
    pub benchmark_name: String,
    pub status: JobStatus,
    pub created_at: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub progress_current: u32,
    pub progress_total: u32,
    pub results_path: Option<String>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub log_content: String,
}

impl Job {
    pub fn new(id: i64, benchmark_name: String) -> Self {
        Self {
            id,
            project_id: None,
            benchmark_name,
            status: JobStatus::Pending,
            created_at: chrono::Utc::now().to_rfc3339(),
            started_at: None,
            finished_at: None,
            progress_current: 0,
            progress_total: 0,
            results_path: None,
            error_message: None,
            log_content: String::new(),
        }
    }

    /// Clamp progress so `progress_current <= progress_total` once a total is known.
    /// Returns true if the backend data had to be corrected.
    pub fn normalize_progress(&mut self) -> bool {
        if self.progress_total > 0 && self.progress_current > self.progress_total {
            self.progress_current = self.progress_total;
            return true;
        }
        false
    }

    /// Fraction of work done, 0.0 until the backend reports a total
    pub fn progress_fraction(&self) -> f32 {
        if self.progress_total == 0 {
            return 0.0;
        }
        (self.progress_current.min(self.progress_total) as f32) / self.progress_total as f32
    }
}

/// Snapshot of the job currently executing on the worker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobStatusResponse {
    pub job: Option<Job>,
    pub logs: String,
    pub progress: f32,
    pub progress_text: String,
    pub elapsed_seconds: u64,
    pub is_finished: bool,
    pub error: Option<String>,
}

impl Default for JobStatusResponse {
    fn default() -> Self {
        Self {
            job: None,
            logs: String::new(),
            progress: 0.0,
            progress_text: String::new(),
            elapsed_seconds: 0,
            is_finished: false,
            error: None,
        }
    }
}
