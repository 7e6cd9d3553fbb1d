//! Background job execution with a pollable status.
//!
//! ```text
//! ┌─────────────┐   status()  ┌──────────────────────┐   ┌──────────────┐
//! │  Caller     │ ──────────▶ │ Arc<Mutex<JobStatus>>│ ◀─│ Job thread   │
//! │  (UI/CLI)   │             └──────────────────────┘   │ lipidconv-job│
//! │             │ ◀──────── completion channel ───────── │              │
//! └─────────────┘                                        └──────────────┘
//! ```
//!
//! The status is written only by the job thread and read by polling. Callers
//! that prefer to block use [`JobHandle::wait`] or
//! [`JobHandle::wait_timeout`].

use std::any::Any;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use log::{debug, warn};
use uuid::Uuid;

use super::error::JobPanicked;

/// Name of every job thread.
pub const JOB_THREAD_NAME: &str = "lipidconv-job";

/// Lifecycle of a job: `Created -> Running -> {Succeeded, Failed}`.
///
/// Terminal states are final and can be read any number of times.
#[derive(Debug)]
pub enum JobStatus<E> {
    /// Job constructed, thread not yet started
    Created,
    /// Job thread is executing
    Running,
    /// Job completed
    Succeeded,
    /// Job aborted with an error
    Failed(Arc<E>),
}

impl<E> Clone for JobStatus<E> {
    fn clone(&self) -> Self {
        match self {
            JobStatus::Created => JobStatus::Created,
            JobStatus::Running => JobStatus::Running,
            JobStatus::Succeeded => JobStatus::Succeeded,
            JobStatus::Failed(e) => JobStatus::Failed(Arc::clone(e)),
        }
    }
}

impl<E> JobStatus<E> {
    /// True for `Succeeded` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed(_))
    }

    /// The error of a failed job.
    pub fn error(&self) -> Option<&Arc<E>> {
        match self {
            JobStatus::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Short state name.
    pub fn name(&self) -> &'static str {
        match self {
            JobStatus::Created => "created",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed(_) => "failed",
        }
    }
}

impl<E> fmt::Display for JobStatus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type SharedStatus<E> = Arc<Mutex<JobStatus<E>>>;

fn set_status<E>(status: &SharedStatus<E>, value: JobStatus<E>) {
    *status.lock().unwrap_or_else(PoisonError::into_inner) = value;
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Handle to a job running on its own thread.
///
/// # Drop Safety
///
/// Dropping a handle whose job is still running detaches the job thread; the
/// job runs to completion on its own and its result is discarded.
pub struct JobHandle<T, E> {
    id: Uuid,
    label: String,
    started_at: DateTime<Utc>,
    status: SharedStatus<E>,
    done: Receiver<()>,
    handle: Option<JoinHandle<Result<T, Arc<E>>>>,
}

impl<T, E> JobHandle<T, E>
where
    T: Send + 'static,
    E: From<JobPanicked> + Send + Sync + 'static,
{
    /// Run `work` on a new thread named [`JOB_THREAD_NAME`].
    ///
    /// A panic inside `work` is caught and reported as a failed job.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn<F>(label: impl Into<String>, work: F) -> io::Result<Self>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        let id = Uuid::new_v4();
        let label = label.into();
        let status: SharedStatus<E> = Arc::new(Mutex::new(JobStatus::Created));
        let status_clone = Arc::clone(&status);
        let (done_tx, done) = bounded::<()>(1);
        let thread_label = label.clone();

        let handle = thread::Builder::new()
            .name(JOB_THREAD_NAME.to_string())
            .spawn(move || {
                set_status(&status_clone, JobStatus::Running);
                debug!("Job {} ({}) running", id, thread_label);

                let result = panic::catch_unwind(AssertUnwindSafe(work))
                    .unwrap_or_else(|payload| Err(E::from(JobPanicked(panic_message(&*payload)))));

                let result = match result {
                    Ok(value) => {
                        set_status(&status_clone, JobStatus::Succeeded);
                        Ok(value)
                    }
                    Err(e) => {
                        let e = Arc::new(e);
                        set_status(&status_clone, JobStatus::Failed(Arc::clone(&e)));
                        Err(e)
                    }
                };
                debug!("Job {} ({}) finished", id, thread_label);

                // The receiver may already be gone if the handle was dropped
                let _ = done_tx.send(());
                result
            })?;

        Ok(Self {
            id,
            label,
            started_at: Utc::now(),
            status,
            done,
            handle: Some(handle),
        })
    }
}

impl<T, E> JobHandle<T, E> {
    /// Unique job identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Human-readable job label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// When the job was spawned.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Current status. Never blocks on the job.
    pub fn status(&self) -> JobStatus<E> {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the job reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.status().is_terminal()
    }

    /// Wait up to `timeout` for the job to finish and report whether it did.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.is_finished() {
            return true;
        }
        match self.done.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => false,
        }
    }
}

impl<T, E: fmt::Display> JobHandle<T, E> {
    /// Display text of the job's error, if it failed.
    pub fn error_description(&self) -> Option<String> {
        self.status().error().map(|e| e.to_string())
    }
}

impl<T, E: From<JobPanicked>> JobHandle<T, E> {
    /// Block until the job finishes and return its result.
    pub fn wait(mut self) -> Result<T, Arc<E>> {
        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => return Err(Arc::new(E::from(JobPanicked("job already joined".into())))),
        };
        match handle.join() {
            Ok(result) => result,
            Err(payload) => Err(Arc::new(E::from(JobPanicked(panic_message(&*payload))))),
        }
    }
}

impl<T, E> Drop for JobHandle<T, E> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                warn!(
                    "Job {} ({}) handle dropped while running; detaching it",
                    self.id, self.label
                );
            }
        }
    }
}

impl<T, E> fmt::Debug for JobHandle<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("started_at", &self.started_at)
            .field("status", &self.status.lock().map(|s| s.name()).unwrap_or("poisoned"))
            .finish()
    }
}
