//! Job descriptions, allocated job handles and pending submissions.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::core::resource::ResourceHandle;
use crate::core::{WorkloadError, WorkloadResult};

/// Job identifier handed out by the job record store.
pub type JobId = u64;

/// Status of a job in the scheduler lifecycle.
///
/// Transitions are one-way: `Queued → Running → Finished`,
/// `Queued → Failed` or `Running → Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting in the queue for its resources.
    Queued,
    /// Resources allocated.
    Running,
    /// Finished by its owner.
    Finished,
    /// Cancelled, or failed before allocation completed.
    Failed,
}

impl JobStatus {
    /// Whether `self → next` is an allowed transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Running | Self::Failed)
                | (Self::Running, Self::Finished | Self::Failed)
        )
    }

    /// Whether the job can still be cancelled.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }
}

/// Immutable record of a submitted job.
///
/// A status change produces a new value through [`JobDescription::with_status`];
/// the latest value stored by the scheduler is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescription {
    /// Human-readable job name.
    pub job_name: String,
    /// Requested resource ids, in request order.
    pub resources: Vec<String>,
    /// Username of the submitter.
    pub owner: String,
    /// Lifecycle status.
    pub status: JobStatus,
}

impl JobDescription {
    /// Create a new queued description.
    pub fn new(job_name: impl Into<String>, resources: Vec<String>, owner: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            resources,
            owner: owner.into(),
            status: JobStatus::Queued,
        }
    }

    /// Copy of this description carrying `status`.
    ///
    /// `status` must be reachable from the current one, see
    /// [`JobStatus::can_transition_to`].
    #[must_use]
    pub fn with_status(&self, status: JobStatus) -> Self {
        debug_assert!(
            self.status.can_transition_to(status),
            "illegal job transition {:?} -> {:?}",
            self.status,
            status
        );
        Self {
            status,
            ..self.clone()
        }
    }
}

/// A job whose resources have been allocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedJob {
    id: JobId,
    description: JobDescription,
    resources: Vec<ResourceHandle>,
}

impl AllocatedJob {
    pub(crate) const fn new(
        id: JobId,
        description: JobDescription,
        resources: Vec<ResourceHandle>,
    ) -> Self {
        Self {
            id,
            description,
            resources,
        }
    }

    /// Job identifier.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Description snapshot taken when the job started running.
    #[must_use]
    pub const fn description(&self) -> &JobDescription {
        &self.description
    }

    /// Handles returned by the execution backend, in request order.
    #[must_use]
    pub fn resources(&self) -> &[ResourceHandle] {
        &self.resources
    }
}

/// Handle to a submitted job that resolves once the job is allocated.
///
/// Resolves to `Err(WorkloadError::Cancelled)` if the job is cancelled while
/// still queued, or to the backend error if allocating its resources failed.
#[derive(Debug)]
pub struct PendingJob {
    id: JobId,
    rx: oneshot::Receiver<WorkloadResult<AllocatedJob>>,
}

impl PendingJob {
    pub(crate) const fn new(id: JobId, rx: oneshot::Receiver<WorkloadResult<AllocatedJob>>) -> Self {
        Self { id, rx }
    }

    /// Id assigned at submission.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Non-blocking check; `None` while the job is still queued.
    ///
    /// Once this returns `Some`, the handle is spent and must not be awaited.
    pub fn try_allocated(&mut self) -> Option<WorkloadResult<AllocatedJob>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(dropped(self.id))),
        }
    }
}

fn dropped(id: JobId) -> WorkloadError {
    WorkloadError::InvalidState(format!("job {id} was dropped by the scheduler"))
}

impl Future for PendingJob {
    type Output = WorkloadResult<AllocatedJob>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let id = self.id;
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(dropped(id))),
            Poll::Pending => Poll::Pending,
        }
    }
}
