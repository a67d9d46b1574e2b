// Backend gateway - typed access to the execution backend
pub mod client;
pub mod transport;

pub use client::Gateway;
pub use transport::{HandlerTransport, Transport};

use crate::error::BackendError;
use crate::models::{
    AppConfig, Benchmark, DependencyAnalysis, Job, JobStatusResponse, Project, QueueStatus,
    SshKeyStatus, SyncStatus,
};
use async_trait::async_trait;

pub type BackendResult<T> = Result<T, BackendError>;

/// Every operation the client performs against the execution backend.
///
/// Calls are independent request/response exchanges: none of them is retried
/// here, and any of them may fail with a [`BackendError`].
#[async_trait]
pub trait Backend: Send + Sync {
    // Config
    async fn check_config_exists(&self) -> BackendResult<bool>;
    async fn load_config(&self) -> BackendResult<AppConfig>;
    async fn save_config(&self, config: &AppConfig) -> BackendResult<()>;

    // Queue control
    async fn get_queue_status(&self) -> BackendResult<QueueStatus>;
    async fn start_queue_processing(&self) -> BackendResult<()>;
    async fn pause_queue_processing(&self) -> BackendResult<()>;
    async fn resume_queue_processing(&self) -> BackendResult<()>;
    async fn stop_queue_processing(&self) -> BackendResult<()>;

    // Queue editing
    async fn get_all_queue_jobs(&self) -> BackendResult<Vec<Job>>;
    async fn remove_job_from_queue(&self, job_id: i64) -> BackendResult<()>;
    async fn move_job_to_front(&self, job_id: i64) -> BackendResult<()>;
    async fn move_job_to_end(&self, job_id: i64) -> BackendResult<()>;
    async fn reorder_queue_job(&self, job_id: i64, new_position: i32) -> BackendResult<()>;
    async fn cancel_all_pending_jobs(&self) -> BackendResult<u32>;

    // Jobs
    async fn queue_benchmarks(
        &self,
        benchmark_ids: &[i64],
        force_duplicate: bool,
    ) -> BackendResult<Vec<Job>>;
    async fn start_next_job(&self) -> BackendResult<Option<Job>>;
    async fn stop_job(&self) -> BackendResult<()>;
    async fn kill_job(&self) -> BackendResult<()>;
    async fn get_job_status(&self) -> BackendResult<JobStatusResponse>;
    async fn get_job_logs(&self, lines: u32) -> BackendResult<String>;

    // History
    async fn load_history(&self, limit: u32) -> BackendResult<Vec<Job>>;
    async fn delete_job(&self, job_id: i64) -> BackendResult<()>;

    // SSH
    async fn init_ssh(&self) -> BackendResult<String>;
    async fn close_ssh(&self) -> BackendResult<()>;
    async fn test_ssh(&self) -> BackendResult<bool>;
    async fn check_ssh_key_status(&self) -> BackendResult<SshKeyStatus>;
    async fn add_ssh_key(&self, passphrase: &str) -> BackendResult<()>;

    // Sync
    async fn check_sync_status(&self) -> BackendResult<SyncStatus>;
    async fn sync_code(&self) -> BackendResult<()>;
    async fn sync_benchmark_deps(&self, benchmark_path: &str) -> BackendResult<usize>;

    // Projects
    async fn list_projects(&self) -> BackendResult<Vec<Project>>;
    async fn create_project(&self, name: &str, python_version: &str) -> BackendResult<Project>;
    async fn delete_project(&self, project_id: i64) -> BackendResult<()>;
    async fn set_active_project(&self, project_id: i64) -> BackendResult<Project>;
    async fn get_active_project(&self) -> BackendResult<Option<Project>>;
    async fn list_python_versions(&self) -> BackendResult<Vec<String>>;
    async fn set_project_python_version(&self, version: &str) -> BackendResult<()>;

    // Benchmarks
    async fn add_benchmark_to_project(&self, file_path: &str) -> BackendResult<Benchmark>;
    async fn remove_benchmark_from_project(&self, benchmark_id: i64) -> BackendResult<()>;
    async fn list_project_benchmarks(&self) -> BackendResult<Vec<Benchmark>>;
    async fn get_benchmark_dependencies(
        &self,
        benchmark_path: &str,
    ) -> BackendResult<DependencyAnalysis>;

    // Project environment
    async fn list_project_dependencies(&self) -> BackendResult<Vec<String>>;
    async fn add_project_dependency(&self, package_name: &str) -> BackendResult<String>;
    async fn remove_project_dependency(&self, package_name: &str) -> BackendResult<String>;
    async fn update_project_dependencies(&self) -> BackendResult<String>;
    async fn sync_project_environment(&self) -> BackendResult<String>;
}
