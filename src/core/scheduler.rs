//! Job scheduler: admission policy, FIFO queue and head-blocking drain.
//!
//! All queue and index mutations, and every drain pass, run while holding a
//! single async mutex over [`SchedulerState`]. The lock spans the
//! "all requested resources available?" check and the allocation of each of
//! them, so two drains can never hand the same resource to different jobs.
//!
//! Draining always looks at the queue head only. A head whose resources are
//! not all free blocks every later job, even ones whose resources are idle.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};

use crate::core::audit::{build_audit_event, AuditSink};
use crate::core::job::{AllocatedJob, JobDescription, JobId, JobStatus, PendingJob};
use crate::core::policy::{AccountType, PolicyLimits, User};
use crate::core::resource::{ResourceHandle, ResourceService};
use crate::core::{WorkloadError, WorkloadResult};
use crate::infra::job_store::JobRecordStore;

struct QueuedJob {
    id: JobId,
    description: JobDescription,
    tx: oneshot::Sender<WorkloadResult<AllocatedJob>>,
}

struct IndexEntry {
    description: JobDescription,
    allocated: Option<AllocatedJob>,
}

#[derive(Default)]
struct SchedulerState {
    /// Not-yet-allocated jobs in submission order.
    queue: VecDeque<QueuedJob>,
    /// Every job seen by this process, at any status.
    index: HashMap<JobId, IndexEntry>,
}

impl SchedulerState {
    fn set(&mut self, id: JobId, description: JobDescription, allocated: Option<AllocatedJob>) {
        self.index.insert(
            id,
            IndexEntry {
                description,
                allocated,
            },
        );
    }
}

/// Queues jobs, allocates their resources in FIFO order and releases them on
/// finish or cancel.
pub struct JobScheduler<R, J> {
    resources: Arc<R>,
    records: Arc<J>,
    policy: PolicyLimits,
    state: Mutex<SchedulerState>,
    audit: Option<Arc<parking_lot::Mutex<Box<dyn AuditSink>>>>,
}

impl<R, J> JobScheduler<R, J>
where
    R: ResourceService,
    J: JobRecordStore,
{
    /// Create a scheduler from its collaborators.
    pub fn new(resources: Arc<R>, records: Arc<J>, policy: PolicyLimits) -> Self {
        Self {
            resources,
            records,
            policy,
            state: Mutex::new(SchedulerState::default()),
            audit: None,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Arc::new(parking_lot::Mutex::new(audit)));
        self
    }

    /// Resource service used for admission and allocation.
    pub fn resources(&self) -> &R {
        &self.resources
    }

    /// Policy limits applied to submissions.
    pub const fn policy(&self) -> &PolicyLimits {
        &self.policy
    }

    /// Validate, enqueue and try to start a job.
    ///
    /// Policy and existence failures are returned here, before anything is
    /// enqueued. On success the returned [`PendingJob`] resolves once the
    /// job's resources have been allocated.
    pub async fn submit_job(
        &self,
        user: &User,
        job_name: impl Into<String>,
        resources: Vec<String>,
    ) -> WorkloadResult<PendingJob> {
        let account = user.effective_account_type();
        if let Err(err) = self.validate_request(account, &resources).await {
            tracing::warn!(
                "rejected submission from {} ({:?}): {}",
                user.username,
                account,
                err
            );
            return Err(err);
        }

        let mut state = self.state.lock().await;
        let id = self.records.next_id().await?;
        let description = JobDescription::new(job_name, resources, user.username.clone());
        let (tx, rx) = oneshot::channel();

        let was_empty = state.queue.is_empty();
        state.set(id, description.clone(), None);
        self.record_audit(id, &description.owner, "submit", None);
        state.queue.push_back(QueuedJob {
            id,
            description,
            tx,
        });
        tracing::info!("job {} queued for {}", id, user.username);

        if was_empty {
            self.drain(&mut state).await;
        }
        Ok(PendingJob::new(id, rx))
    }

    /// Mark a running job finished, persist it, release its resources and
    /// drain the queue.
    pub async fn finish_job(&self, job: &AllocatedJob) -> WorkloadResult<()> {
        let id = job.id();
        let mut state = self.state.lock().await;
        let entry = state
            .index
            .get(&id)
            .ok_or(WorkloadError::JobNotFound(id))?;
        if entry.description.status != JobStatus::Running {
            return Err(WorkloadError::InvalidState(format!(
                "job {id} is {:?}, only running jobs can finish",
                entry.description.status
            )));
        }
        let allocated = entry.allocated.clone().unwrap_or_else(|| job.clone());
        let finished = entry.description.with_status(JobStatus::Finished);

        // The index keeps the job RUNNING until both steps succeed, so a
        // failed finish can be retried.
        self.records.add_job(id, &finished).await?;
        self.release_all(allocated.resources()).await?;
        state.set(id, finished.clone(), None);
        self.record_audit(id, &finished.owner, "finish", None);
        tracing::info!("job {} finished", id);

        self.drain(&mut state).await;
        Ok(())
    }

    /// Cancel a queued or running job owned by `requesting_user`.
    pub async fn cancel_job(&self, job_id: JobId, requesting_user: &str) -> WorkloadResult<()> {
        let mut state = self.state.lock().await;
        let entry = state
            .index
            .get(&job_id)
            .ok_or(WorkloadError::JobNotFound(job_id))?;
        let status = entry.description.status;
        if !status.is_active() {
            return Err(WorkloadError::InvalidState(format!(
                "job {job_id} is {status:?} and cannot be cancelled"
            )));
        }
        if entry.description.owner != requesting_user {
            return Err(WorkloadError::InvalidState(format!(
                "job {job_id} is not owned by {requesting_user}"
            )));
        }
        let allocated = entry.allocated.clone();
        let failed = entry.description.with_status(JobStatus::Failed);

        if status == JobStatus::Running {
            // Still RUNNING in the index if the release fails.
            if let Some(job) = allocated {
                self.release_all(job.resources()).await?;
            }
        } else if let Some(pos) = state.queue.iter().position(|q| q.id == job_id) {
            if let Some(queued) = state.queue.remove(pos) {
                let _ = queued.tx.send(Err(WorkloadError::Cancelled(job_id)));
            }
        }
        state.set(job_id, failed.clone(), None);
        self.record_audit(job_id, requesting_user, "cancel", Some(format!("{status:?}")));
        tracing::info!("job {} cancelled by {} while {:?}", job_id, requesting_user, status);

        self.drain(&mut state).await;
        self.records.add_job(job_id, &failed).await
    }

    /// Latest description of `job_id`, from memory or the record store.
    pub async fn job_information(&self, job_id: JobId) -> WorkloadResult<JobDescription> {
        {
            let state = self.state.lock().await;
            if let Some(entry) = state.index.get(&job_id) {
                return Ok(entry.description.clone());
            }
        }
        self.records
            .get_job(job_id)
            .await?
            .ok_or(WorkloadError::JobNotFound(job_id))
    }

    /// Ids of the queued jobs, head first.
    pub async fn queued_jobs(&self) -> Vec<JobId> {
        self.state.lock().await.queue.iter().map(|q| q.id).collect()
    }

    /// Number of queued jobs.
    pub async fn queue_len(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    /// Count, existence and class checks for `account`.
    async fn validate_request(&self, account: AccountType, resources: &[String]) -> WorkloadResult<()> {
        let limits = self.policy.limits_for(account);
        limits.check_count(resources.len())?;
        for (i, id) in resources.iter().enumerate() {
            if resources[..i].contains(id) {
                return Err(WorkloadError::PolicyViolation(format!(
                    "resource {id} requested more than once"
                )));
            }
        }
        for id in resources {
            if !self.resources.id_exists(id).await? {
                return Err(WorkloadError::ResourceNotFound(id.clone()));
            }
        }
        let mut kinds = Vec::with_capacity(resources.len());
        for id in resources {
            kinds.push(self.resources.verify_resource(id).await?);
        }
        limits.check_kinds(&kinds)
    }

    /// Start queue heads while all of their resources are free.
    ///
    /// A backend error while checking or allocating the head fails that job
    /// and the drain moves on to the next head.
    async fn drain(&self, state: &mut SchedulerState) -> usize {
        let mut pulled = 0;
        while let Some(head) = state.queue.front() {
            let id = head.id;
            let requested = head.description.resources.clone();

            let outcome = match self.all_available(&requested).await {
                Ok(false) => {
                    tracing::debug!("job {} blocked at queue head", id);
                    break;
                }
                Ok(true) => self.allocate_all(&requested).await,
                Err(err) => Err(err),
            };

            let Some(queued) = state.queue.pop_front() else {
                break;
            };
            match outcome {
                Ok(handles) => {
                    let running = queued.description.with_status(JobStatus::Running);
                    let job = AllocatedJob::new(id, running.clone(), handles);
                    state.set(id, running, Some(job.clone()));
                    self.record_audit(id, &job.description().owner, "start", None);
                    tracing::info!("job {} started on {:?}", id, requested);
                    if queued.tx.send(Ok(job)).is_err() {
                        tracing::debug!("submitter of job {} is no longer waiting", id);
                    }
                    pulled += 1;
                }
                Err(err) => {
                    tracing::error!("job {} failed during allocation: {}", id, err);
                    let failed = queued.description.with_status(JobStatus::Failed);
                    state.set(id, failed.clone(), None);
                    self.record_audit(id, &failed.owner, "fail", Some(err.to_string()));
                    if let Err(persist) = self.records.add_job(id, &failed).await {
                        tracing::error!("failed to persist job {}: {}", id, persist);
                    }
                    let _ = queued.tx.send(Err(err));
                }
            }
        }
        pulled
    }

    /// Checks every resource; a single busy one makes the result false.
    async fn all_available(&self, resources: &[String]) -> WorkloadResult<bool> {
        let mut all = true;
        for id in resources {
            all &= self.resources.is_available(id).await?;
        }
        Ok(all)
    }

    /// Allocate in request order. On failure the resources already taken are
    /// handed back before the error is returned.
    async fn allocate_all(&self, resources: &[String]) -> WorkloadResult<Vec<ResourceHandle>> {
        let mut handles = Vec::with_capacity(resources.len());
        for id in resources {
            match self.resources.allocate_resource(id).await {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    if let Err(release) = self.release_all(&handles).await {
                        tracing::error!("failed to roll back partial allocation: {}", release);
                    }
                    return Err(err);
                }
            }
        }
        Ok(handles)
    }

    async fn release_all(&self, handles: &[ResourceHandle]) -> WorkloadResult<()> {
        for handle in handles {
            self.resources.release_resource(handle).await?;
        }
        Ok(())
    }

    fn record_audit(&self, id: JobId, owner: &str, action: &str, payload: Option<String>) {
        if let Some(audit_sink) = &self.audit {
            let mut sink = audit_sink.lock();
            sink.record(build_audit_event(
                uuid::Uuid::new_v4().to_string(),
                id.to_string(),
                owner,
                action,
                payload,
            ));
        }
    }
}
