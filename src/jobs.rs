//! In-memory status tracking for background folder runs
//!
//! Only the worker running a job writes its status. Readers get snapshots.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::ProcessingConfig;
use crate::processor::{ProgressReporter, process_folder};

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub state: JobState,
    pub progress: u8,
    pub message: String,
    pub output_files: Vec<PathBuf>,
    pub errors: Vec<String>,
}

impl JobStatus {
    fn queued() -> Self {
        Self {
            state: JobState::Queued,
            progress: 0,
            message: "queued".to_string(),
            output_files: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, JobState::Completed | JobState::Failed)
    }
}

type Jobs = Arc<Mutex<HashMap<JobId, JobStatus>>>;

/// Shared job table, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct JobStore {
    jobs: Jobs,
    next_id: Arc<AtomicU64>,
}

/// Writes a job's progress into the store
struct JobReporter {
    jobs: Jobs,
    id: JobId,
}

impl ProgressReporter for JobReporter {
    fn report(&self, progress: u8, message: &str) {
        update(&self.jobs, self.id, |status| {
            status.state = JobState::Running;
            status.progress = progress.min(100);
            status.message = message.to_string();
        });
    }
}

fn update(jobs: &Jobs, id: JobId, apply: impl FnOnce(&mut JobStatus)) {
    match jobs.lock() {
        Ok(mut jobs) => {
            if let Some(status) = jobs.get_mut(&id) {
                apply(status);
            }
        }
        Err(err) => error!(job = id, error = %err, "job table lock poisoned"),
    }
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a folder run on a blocking worker
    ///
    /// Must be called inside a tokio runtime.
    pub fn submit(
        &self,
        folder: PathBuf,
        mapping: PathBuf,
        config: ProcessingConfig,
    ) -> (JobId, JoinHandle<()>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.insert(id, JobStatus::queued());
        }

        let jobs = Arc::clone(&self.jobs);
        let handle = tokio::task::spawn_blocking(move || {
            let reporter = JobReporter {
                jobs: Arc::clone(&jobs),
                id,
            };
            reporter.report(0, "starting");

            let outcome = process_folder(&folder, &mapping, &config, &reporter);
            update(&jobs, id, |status| match outcome {
                Ok(result) => {
                    status.state = if result.success {
                        JobState::Completed
                    } else {
                        JobState::Failed
                    };
                    status.progress = 100;
                    status.message = result.message;
                    status.output_files = result.output_files;
                    status.errors = result.errors;
                }
                Err(err) => {
                    status.state = JobState::Failed;
                    status.message = err.to_string();
                    status.errors = vec![err.to_string()];
                }
            });
            info!(job = id, "job finished");
        });

        (id, handle)
    }

    /// Snapshot of a job's status
    pub fn status(&self, id: JobId) -> Option<JobStatus> {
        self.jobs.lock().ok()?.get(&id).cloned()
    }

    pub fn job_ids(&self) -> Vec<JobId> {
        let mut ids: Vec<JobId> = self
            .jobs
            .lock()
            .map(|jobs| jobs.keys().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_run_is_recorded() {
        let store = JobStore::new();
        let dir = tempfile::tempdir().unwrap();

        let (id, handle) = store.submit(
            dir.path().join("missing"),
            dir.path().join("mapping.csv"),
            ProcessingConfig::default(),
        );
        handle.await.unwrap();

        let status = store.status(id).unwrap();
        assert_eq!(status.state, JobState::Failed);
        assert!(status.is_finished());
        assert!(!status.errors.is_empty());
        assert_eq!(store.job_ids(), vec![id]);
    }

    #[test]
    fn unknown_job_has_no_status() {
        assert!(JobStore::new().status(42).is_none());
    }

    #[test]
    fn status_serializes_state_in_snake_case() {
        let json = serde_json::to_string(&JobStatus::queued()).unwrap();
        assert!(json.contains("\"state\":\"queued\""));
    }
}
