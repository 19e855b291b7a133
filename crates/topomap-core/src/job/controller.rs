// ── Job controller ──
//
// Lifecycle for long-running jobs: one worker task per run, a watch
// channel carrying (state, progress, error), and a cancellation token the
// worker checks at every phase boundary. Stop cancels and joins.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::CoreError;

// ── JobState / JobStatus ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobState {
    Stopped,
    Running,
    Finished,
    Failed,
    Aborted,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Aborted)
    }
}

/// Pollable job status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatus {
    pub run_id: Option<Uuid>,
    pub state: JobState,
    /// Percent complete, `0..=100`.
    pub progress: u8,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobStatus {
    fn idle() -> Self {
        Self {
            run_id: None,
            state: JobState::Stopped,
            progress: 0,
            error: None,
            started_at: None,
            finished_at: None,
        }
    }

    fn running(run_id: Uuid) -> Self {
        Self {
            run_id: Some(run_id),
            state: JobState::Running,
            progress: 0,
            error: None,
            started_at: Some(Utc::now()),
            finished_at: None,
        }
    }
}

// ── Job ─────────────────────────────────────────────────────────────

/// A unit of work driven by a [`JobController`].
pub trait Job: Send + 'static {
    type Output: Send + Sync + 'static;

    /// Short name used in logs and errors.
    const NAME: &'static str;

    fn run(self, handle: JobHandle) -> impl Future<Output = Result<Self::Output, CoreError>> + Send;
}

/// The worker's view of its own job: progress reporting and cancellation.
#[derive(Debug, Clone)]
pub struct JobHandle {
    status: Arc<watch::Sender<JobStatus>>,
    cancel: CancellationToken,
}

impl JobHandle {
    pub fn set_progress(&self, progress: u8) {
        self.status.send_modify(|s| {
            if s.state == JobState::Running {
                s.progress = progress.min(100);
            }
        });
    }

    pub fn progress(&self) -> u8 {
        self.status.borrow().progress
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// `Err(Cancelled)` once stop has been requested.
    pub fn checkpoint(&self) -> Result<(), CoreError> {
        if self.cancel.is_cancelled() {
            Err(CoreError::Cancelled)
        } else {
            Ok(())
        }
    }
}

// ── JobController ───────────────────────────────────────────────────

/// Starts, observes and stops runs of one job type.
///
/// Cheaply cloneable via `Arc`. At most one run is active at a time; the
/// output of the last finished run stays available until the next start.
pub struct JobController<J: Job> {
    inner: Arc<ControllerInner<J>>,
}

impl<J: Job> Clone for JobController<J> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ControllerInner<J: Job> {
    status: Arc<watch::Sender<JobStatus>>,
    worker: Mutex<Option<Worker>>,
    output: Mutex<Option<Arc<J::Output>>>,
}

struct Worker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl<J: Job> Default for JobController<J> {
    fn default() -> Self {
        Self::new()
    }
}

impl<J: Job> JobController<J> {
    pub fn new() -> Self {
        let (status, _) = watch::channel(JobStatus::idle());
        Self {
            inner: Arc::new(ControllerInner {
                status: Arc::new(status),
                worker: Mutex::new(None),
                output: Mutex::new(None),
            }),
        }
    }

    /// Spawn a worker for `job`.
    ///
    /// Rejected while a run is active. Fails with
    /// [`CoreError::SpawnFailed`] before any work happens when there is no
    /// runtime to spawn on.
    pub async fn start(&self, job: J) -> Result<JobStatus, CoreError> {
        let mut worker = self.inner.worker.lock().await;
        if self.inner.status.borrow().state == JobState::Running {
            return Err(CoreError::JobAlreadyRunning {
                job: J::NAME.to_owned(),
            });
        }

        // Reap the previous run's task, already past its terminal state.
        if let Some(previous) = worker.take() {
            if let Err(e) = previous.handle.await {
                debug!(job = J::NAME, error = %e, "previous worker ended abnormally");
            }
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| CoreError::SpawnFailed {
            reason: e.to_string(),
        })?;

        *self.inner.output.lock().await = None;
        let run_id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        self.inner.status.send_replace(JobStatus::running(run_id));

        let handle = JobHandle {
            status: Arc::clone(&self.inner.status),
            cancel: cancel.clone(),
        };
        let inner = Arc::clone(&self.inner);
        let task = runtime.spawn(async move {
            let outcome = AssertUnwindSafe(job.run(handle)).catch_unwind().await;
            inner.complete(run_id, outcome).await;
        });

        *worker = Some(Worker {
            cancel,
            handle: task,
        });
        info!(job = J::NAME, %run_id, "job started");
        Ok(self.status())
    }

    /// Request cancellation and wait for the worker to exit.
    pub async fn stop(&self) -> JobStatus {
        let worker = self.inner.worker.lock().await.take();
        if let Some(worker) = worker {
            worker.cancel.cancel();
            if let Err(e) = worker.handle.await {
                warn!(job = J::NAME, error = %e, "worker did not exit cleanly");
            }
        }
        self.status()
    }

    /// Current (state, progress, error).
    pub fn status(&self) -> JobStatus {
        self.inner.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<JobStatus> {
        self.inner.status.subscribe()
    }

    /// Wait until the current run leaves `Running`.
    pub async fn wait(&self) -> JobStatus {
        let mut rx = self.subscribe();
        match rx.wait_for(|s| s.state != JobState::Running).await {
            Ok(status) => status.clone(),
            Err(_) => self.status(),
        }
    }

    /// Output of the last finished run.
    pub async fn output(&self) -> Option<Arc<J::Output>> {
        self.inner.output.lock().await.clone()
    }
}

impl<J: Job> ControllerInner<J> {
    async fn complete(
        &self,
        run_id: Uuid,
        outcome: std::thread::Result<Result<J::Output, CoreError>>,
    ) {
        let (state, error) = match outcome {
            Ok(Ok(output)) => {
                *self.output.lock().await = Some(Arc::new(output));
                (JobState::Finished, None)
            }
            Ok(Err(e)) if e.is_cancelled() => (JobState::Aborted, Some(e.to_string())),
            Ok(Err(e)) => (JobState::Failed, Some(e.to_string())),
            Err(_) => (
                JobState::Failed,
                Some(CoreError::Internal("worker panicked".into()).to_string()),
            ),
        };

        match state {
            JobState::Finished => info!(job = J::NAME, %run_id, "job finished"),
            JobState::Aborted => info!(job = J::NAME, %run_id, "job aborted"),
            _ => warn!(job = J::NAME, %run_id, error = ?error, "job failed"),
        }

        self.status.send_modify(|s| {
            s.state = state;
            if state == JobState::Finished {
                s.progress = 100;
            }
            s.error = error;
            s.finished_at = Some(Utc::now());
        });
    }
}
