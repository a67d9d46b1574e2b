// Typed backend client over a named-command transport
use super::{Backend, BackendResult, Transport};
use crate::error::BackendError;
use crate::models::{
    AppConfig, Benchmark, DependencyAnalysis, Job, JobStatusResponse, Project, QueueStatus,
    SshKeyStatus, SyncStatus,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// Implements [`Backend`] by invoking snake_case commands with camelCase
/// argument objects and decoding the JSON answer.
pub struct Gateway<T> {
    transport: T,
}

impl<T: Transport> Gateway<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call<R: DeserializeOwned>(&self, command: &str, args: Value) -> BackendResult<R> {
        let value = self.transport.invoke(command, args).await?;
        serde_json::from_value(value).map_err(|e| BackendError::Decode {
            command: command.to_string(),
            message: e.to_string(),
        })
    }

    /// Commands without a meaningful answer; whatever comes back is ignored
    async fn call_unit(&self, command: &str, args: Value) -> BackendResult<()> {
        self.transport.invoke(command, args).await.map(|_| ())
    }
}

#[async_trait]
impl<T: Transport> Backend for Gateway<T> {
    async fn check_config_exists(&self) -> BackendResult<bool> {
        self.call("check_config_exists", json!({})).await
    }

    async fn load_config(&self) -> BackendResult<AppConfig> {
        self.call("load_config", json!({})).await
    }

    async fn save_config(&self, config: &AppConfig) -> BackendResult<()> {
        let config = serde_json::to_value(config).map_err(|e| BackendError::Encode {
            command: "save_config".to_string(),
            message: e.to_string(),
        })?;
        self.call_unit("save_config", json!({ "config": config })).await
    }

    async fn get_queue_status(&self) -> BackendResult<QueueStatus> {
        self.call("get_queue_status", json!({})).await
    }

    async fn start_queue_processing(&self) -> BackendResult<()> {
        self.call_unit("start_queue_processing", json!({})).await
    }

    async fn pause_queue_processing(&self) -> BackendResult<()> {
        self.call_unit("pause_queue_processing", json!({})).await
    }

    async fn resume_queue_processing(&self) -> BackendResult<()> {
        self.call_unit("resume_queue_processing", json!({})).await
    }

    async fn stop_queue_processing(&self) -> BackendResult<()> {
        self.call_unit("stop_queue_processing", json!({})).await
    }

    async fn get_all_queue_jobs(&self) -> BackendResult<Vec<Job>> {
        self.call("get_all_queue_jobs", json!({})).await
    }

    async fn remove_job_from_queue(&self, job_id: i64) -> BackendResult<()> {
        self.call_unit("remove_job_from_queue", json!({ "jobId": job_id }))
            .await
    }

    async fn move_job_to_front(&self, job_id: i64) -> BackendResult<()> {
        self.call_unit("move_job_to_front", json!({ "jobId": job_id }))
            .await
    }

    async fn move_job_to_end(&self, job_id: i64) -> BackendResult<()> {
        self.call_unit("move_job_to_end", json!({ "jobId": job_id }))
            .await
    }

    async fn reorder_queue_job(&self, job_id: i64, new_position: i32) -> BackendResult<()> {
        self.call_unit(
            "reorder_queue_job",
            json!({ "jobId": job_id, "newPosition": new_position }),
        )
        .await
    }

    async fn cancel_all_pending_jobs(&self) -> BackendResult<u32> {
        self.call("cancel_all_pending_jobs", json!({})).await
    }

    async fn queue_benchmarks(
        &self,
        benchmark_ids: &[i64],
        force_duplicate: bool,
    ) -> BackendResult<Vec<Job>> {
        self.call(
            "queue_benchmarks",
            json!({ "benchmarkIds": benchmark_ids, "forceDuplicate": force_duplicate }),
        )
        .await
    }

    async fn start_next_job(&self) -> BackendResult<Option<Job>> {
        self.call("start_next_job", json!({})).await
    }

    async fn stop_job(&self) -> BackendResult<()> {
        self.call_unit("stop_job", json!({})).await
    }

    async fn kill_job(&self) -> BackendResult<()> {
        self.call_unit("kill_job", json!({})).await
    }

    async fn get_job_status(&self) -> BackendResult<JobStatusResponse> {
        self.call("get_job_status", json!({})).await
    }

    async fn get_job_logs(&self, lines: u32) -> BackendResult<String> {
        self.call("get_job_logs", json!({ "lines": lines })).await
    }

    async fn load_history(&self, limit: u32) -> BackendResult<Vec<Job>> {
        self.call("load_history", json!({ "limit": limit })).await
    }

    async fn delete_job(&self, job_id: i64) -> BackendResult<()> {
        self.call_unit("delete_job", json!({ "jobId": job_id })).await
    }

    async fn init_ssh(&self) -> BackendResult<String> {
        self.call("init_ssh", json!({})).await
    }

    async fn close_ssh(&self) -> BackendResult<()> {
        self.call_unit("close_ssh", json!({})).await
    }

    async fn test_ssh(&self) -> BackendResult<bool> {
        self.call("test_ssh", json!({})).await
    }

    async fn check_ssh_key_status(&self) -> BackendResult<SshKeyStatus> {
        self.call("check_ssh_key_status", json!({})).await
    }

    async fn add_ssh_key(&self, passphrase: &str) -> BackendResult<()> {
        self.call_unit("add_ssh_key", json!({ "passphrase": passphrase }))
            .await
    }

    async fn check_sync_status(&self) -> BackendResult<SyncStatus> {
        self.call("check_sync_status", json!({})).await
    }

    async fn sync_code(&self) -> BackendResult<()> {
        self.call_unit("sync_code", json!({})).await
    }

    async fn sync_benchmark_deps(&self, benchmark_path: &str) -> BackendResult<usize> {
        self.call(
            "sync_benchmark_deps",
            json!({ "benchmarkPath": benchmark_path }),
        )
        .await
    }

    async fn list_projects(&self) -> BackendResult<Vec<Project>> {
        self.call("list_projects", json!({})).await
    }

    async fn create_project(&self, name: &str, python_version: &str) -> BackendResult<Project> {
        self.call(
            "create_project",
            json!({ "name": name, "pythonVersion": python_version }),
        )
        .await
    }

    async fn delete_project(&self, project_id: i64) -> BackendResult<()> {
        self.call_unit("delete_project", json!({ "projectId": project_id }))
            .await
    }

    async fn set_active_project(&self, project_id: i64) -> BackendResult<Project> {
        self.call("set_active_project", json!({ "projectId": project_id }))
            .await
    }

    async fn get_active_project(&self) -> BackendResult<Option<Project>> {
        self.call("get_active_project", json!({})).await
    }

    async fn list_python_versions(&self) -> BackendResult<Vec<String>> {
        self.call("list_python_versions", json!({})).await
    }

    async fn set_project_python_version(&self, version: &str) -> BackendResult<()> {
        self.call_unit("set_project_python_version", json!({ "version": version }))
            .await
    }

    async fn add_benchmark_to_project(&self, file_path: &str) -> BackendResult<Benchmark> {
        self.call("add_benchmark_to_project", json!({ "filePath": file_path }))
            .await
    }

    async fn remove_benchmark_from_project(&self, benchmark_id: i64) -> BackendResult<()> {
        self.call_unit(
            "remove_benchmark_from_project",
            json!({ "benchmarkId": benchmark_id }),
        )
        .await
    }

    async fn list_project_benchmarks(&self) -> BackendResult<Vec<Benchmark>> {
        self.call("list_project_benchmarks", json!({})).await
    }

    async fn get_benchmark_dependencies(
        &self,
        benchmark_path: &str,
    ) -> BackendResult<DependencyAnalysis> {
        self.call(
            "get_benchmark_dependencies",
            json!({ "benchmarkPath": benchmark_path }),
        )
        .await
    }

    async fn list_project_dependencies(&self) -> BackendResult<Vec<String>> {
        self.call("list_project_dependencies", json!({})).await
    }

    async fn add_project_dependency(&self, package_name: &str) -> BackendResult<String> {
        self.call(
            "add_project_dependency",
            json!({ "packageName": package_name }),
        )
        .await
    }

    async fn remove_project_dependency(&self, package_name: &str) -> BackendResult<String> {
        self.call(
            "remove_project_dependency",
            json!({ "packageName": package_name }),
        )
        .await
    }

    async fn update_project_dependencies(&self) -> BackendResult<String> {
        self.call("update_project_dependencies", json!({})).await
    }

    async fn sync_project_environment(&self) -> BackendResult<String> {
        self.call("sync_project_environment", json!({})).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::HandlerTransport;
    use crate::models::QueueState;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_decodes_queue_status() {
        let transport = HandlerTransport::new().with_handler("get_queue_status", |_| async {
            Ok(json!({
                "state": "running",
                "currentJobId": 4,
                "pendingCount": 2,
                "runningCount": 1,
                "completedCount": 0
            }))
        });
        let gateway = Gateway::new(transport);

        let status = gateway.get_queue_status().await.unwrap();
        assert_eq!(status.state, QueueState::Running);
        assert_eq!(status.current_job_id, Some(4));
        assert_eq!(status.pending_count, 2);
    }

    #[tokio::test]
    async fn test_sends_camel_case_arguments() {
        let seen = Arc::new(Mutex::new(Value::Null));
        let seen_clone = seen.clone();
        let transport = HandlerTransport::new().with_handler("queue_benchmarks", move |args| {
            *seen_clone.lock() = args;
            async { Ok(json!([])) }
        });
        let gateway = Gateway::new(transport);

        let jobs = gateway.queue_benchmarks(&[3, 5], false).await.unwrap();
        assert!(jobs.is_empty());
        assert_eq!(
            *seen.lock(),
            json!({ "benchmarkIds": [3, 5], "forceDuplicate": false })
        );
    }

    #[tokio::test]
    async fn test_decode_error_names_command() {
        let transport = HandlerTransport::new()
            .with_handler("test_ssh", |_| async { Ok(json!("not a bool")) });
        let gateway = Gateway::new(transport);

        match gateway.test_ssh().await {
            Err(BackendError::Decode { command, .. }) => assert_eq!(command, "test_ssh"),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unit_commands_ignore_payload() {
        let transport =
            HandlerTransport::new().with_handler("sync_code", |_| async { Ok(json!("ok")) });
        let gateway = Gateway::new(transport);

        assert!(gateway.sync_code().await.is_ok());
    }

    #[tokio::test]
    async fn test_start_next_job_none() {
        let transport =
            HandlerTransport::new().with_handler("start_next_job", |_| async { Ok(Value::Null) });
        let gateway = Gateway::new(transport);

        assert_eq!(gateway.start_next_job().await.unwrap(), None);
    }
}
