//! Persistent job records and the job id counter.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::core::job::{JobDescription, JobId};
use crate::core::{WorkloadError, WorkloadResult};
use crate::infra::storage::Storage;

const COUNTER_KEY: &str = "job#counter";

fn job_key(id: JobId) -> String {
    format!("job#{id}")
}

/// Durable store of job descriptions keyed by an auto-incrementing id.
#[async_trait]
pub trait JobRecordStore: Send + Sync + 'static {
    /// Hand out the next id. Ids are strictly increasing and never reused.
    async fn next_id(&self) -> WorkloadResult<JobId>;
    /// Persist (or overwrite) the description of `id`.
    async fn add_job(&self, id: JobId, description: &JobDescription) -> WorkloadResult<()>;
    /// Persisted description of `id`, if any.
    async fn get_job(&self, id: JobId) -> WorkloadResult<Option<JobDescription>>;
}

/// [`JobRecordStore`] over a key-value [`Storage`].
pub struct StorageJobRecordStore<S> {
    storage: S,
    counter_lock: Mutex<()>,
}

impl<S: Storage> StorageJobRecordStore<S> {
    /// Create a record store over `storage`.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            counter_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl<S: Storage + 'static> JobRecordStore for StorageJobRecordStore<S> {
    async fn next_id(&self) -> WorkloadResult<JobId> {
        let _guard = self.counter_lock.lock().await;
        let id = match self.storage.read_string(COUNTER_KEY).await? {
            Some(raw) => raw
                .parse::<JobId>()
                .map_err(|e| WorkloadError::Serialization(format!("job counter `{raw}`: {e}")))?,
            None => 0,
        };
        self.storage
            .write_string(COUNTER_KEY, &(id + 1).to_string())
            .await?;
        Ok(id)
    }

    async fn add_job(&self, id: JobId, description: &JobDescription) -> WorkloadResult<()> {
        self.storage
            .write(&job_key(id), serde_json::to_vec(description)?)
            .await
    }

    async fn get_job(&self, id: JobId) -> WorkloadResult<Option<JobDescription>> {
        match self.storage.read(&job_key(id)).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}
