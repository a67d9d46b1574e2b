// Current job, queue contents and job history views
use super::observer::{SubscriptionId, Subscribers};
use crate::gateway::{Backend, BackendResult};
use crate::models::{Job, JobStatus, JobStatusResponse};
use log::{debug, warn};
use parking_lot::Mutex;
use std::sync::Arc;

pub struct JobMonitor {
    backend: Arc<dyn Backend>,
    current: Mutex<JobStatusResponse>,
    history: Mutex<Vec<Job>>,
    subscribers: Subscribers<JobStatusResponse>,
}

impl JobMonitor {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            current: Mutex::new(JobStatusResponse::default()),
            history: Mutex::new(Vec::new()),
            subscribers: Subscribers::new(),
        }
    }

    pub fn current(&self) -> JobStatusResponse {
        self.current.lock().clone()
    }

    pub fn history(&self) -> Vec<Job> {
        self.history.lock().clone()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&JobStatusResponse) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    /// Fetch the running job's status. On error the previous view is kept.
    pub async fn refresh(&self) -> BackendResult<JobStatusResponse> {
        let mut response = self.backend.get_job_status().await?;

        let view = {
            let mut current = self.current.lock();
            if let Some(job) = response.job.as_mut() {
                keep_progress_consistent(current.job.as_ref(), job);
            }
            *current = response;
            current.clone()
        };

        self.subscribers.notify(&view);
        Ok(view)
    }

    pub async fn logs(&self, lines: u32) -> BackendResult<String> {
        self.backend.get_job_logs(lines).await
    }

    pub async fn load_history(&self, limit: u32) -> BackendResult<Vec<Job>> {
        let jobs = self.backend.load_history(limit).await?;
        debug!("Loaded {} jobs from history", jobs.len());
        *self.history.lock() = jobs.clone();
        Ok(jobs)
    }

    pub async fn delete_job(&self, job_id: i64) -> BackendResult<()> {
        self.backend.delete_job(job_id).await?;
        self.history.lock().retain(|j| j.id != job_id);
        debug!("Deleted job: {}", job_id);
        Ok(())
    }

    pub async fn queue_jobs(&self) -> BackendResult<Vec<Job>> {
        self.backend.get_all_queue_jobs().await
    }

    pub async fn remove_from_queue(&self, job_id: i64) -> BackendResult<()> {
        self.backend.remove_job_from_queue(job_id).await
    }

    pub async fn move_to_front(&self, job_id: i64) -> BackendResult<()> {
        self.backend.move_job_to_front(job_id).await
    }

    pub async fn move_to_end(&self, job_id: i64) -> BackendResult<()> {
        self.backend.move_job_to_end(job_id).await
    }

    pub async fn reorder(&self, job_id: i64, new_position: i32) -> BackendResult<()> {
        self.backend.reorder_queue_job(job_id, new_position).await
    }

    /// Returns how many pending jobs were cancelled
    pub async fn cancel_all_pending(&self) -> BackendResult<u32> {
        let count = self.backend.cancel_all_pending_jobs().await?;
        debug!("Cancelled {} pending jobs", count);
        Ok(count)
    }

    /// Callers check SSH readiness first, see `BenchClient::start_next_job`
    pub(crate) async fn start_next_job(&self) -> BackendResult<Option<Job>> {
        self.backend.start_next_job().await
    }

    /// Graceful stop of the running job
    pub async fn stop_job(&self) -> BackendResult<()> {
        self.backend.stop_job().await
    }

    pub async fn kill_job(&self) -> BackendResult<()> {
        self.backend.kill_job().await
    }
}

/// Progress never exceeds its total, and never goes backwards while the
/// same job keeps running.
fn keep_progress_consistent(previous: Option<&Job>, job: &mut Job) {
    if job.normalize_progress() {
        warn!(
            "Job {} reported progress beyond its total, clamped to {}",
            job.id, job.progress_total
        );
    }

    if let Some(prev) = previous {
        if prev.id == job.id
            && prev.status == JobStatus::Running
            && job.status == JobStatus::Running
            && job.progress_current < prev.progress_current
        {
            job.progress_current = prev.progress_current;
            job.normalize_progress();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(id: i64, current: u32, total: u32) -> Job {
        let mut job = Job::new(id, "bench.py".to_string());
        job.status = JobStatus::Running;
        job.progress_current = current;
        job.progress_total = total;
        job
    }

    #[test]
    fn test_progress_never_regresses_for_same_job() {
        let prev = running(1, 5, 10);
        let mut next = running(1, 3, 10);
        keep_progress_consistent(Some(&prev), &mut next);
        assert_eq!(next.progress_current, 5);
    }

    #[test]
    fn test_new_job_starts_fresh() {
        let prev = running(1, 9, 10);
        let mut next = running(2, 1, 10);
        keep_progress_consistent(Some(&prev), &mut next);
        assert_eq!(next.progress_current, 1);
    }

    #[test]
    fn test_overshoot_is_clamped() {
        let mut next = running(1, 14, 10);
        keep_progress_consistent(None, &mut next);
        assert_eq!(next.progress_current, 10);
    }
}
