//! Resource registry persisted over a [`Storage`].
//!
//! Layout:
//! - `serial#count` → number of attached resources
//! - `serial#<n>` → id of the n-th attached resource
//! - `resource#<id>` → JSON [`ResourceInfo`]

use tokio::sync::Mutex;

use crate::core::resource::ResourceInfo;
use crate::core::{WorkloadError, WorkloadResult};
use crate::infra::storage::Storage;

const COUNT_KEY: &str = "serial#count";

fn serial_key(serial: u64) -> String {
    format!("serial#{serial}")
}

fn info_key(id: &str) -> String {
    format!("resource#{id}")
}

/// Durable mapping from resource id to availability, serial number and name.
pub struct ResourceRegistry<S> {
    storage: S,
    /// Serializes attach so serial numbers are handed out once.
    attach_lock: Mutex<()>,
}

impl<S: Storage> ResourceRegistry<S> {
    /// Create a registry over `storage`.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            attach_lock: Mutex::new(()),
        }
    }

    /// Registry record for `id`, `None` if never attached.
    pub async fn info(&self, id: &str) -> WorkloadResult<Option<ResourceInfo>> {
        match self.storage.read(&info_key(id)).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Whether `id` has been attached.
    pub async fn exists(&self, id: &str) -> WorkloadResult<bool> {
        Ok(self.info(id).await?.is_some())
    }

    /// Number of attached resources.
    pub async fn count(&self) -> WorkloadResult<u64> {
        match self.storage.read_string(COUNT_KEY).await? {
            Some(raw) => raw
                .parse()
                .map_err(|e| WorkloadError::Serialization(format!("resource count `{raw}`: {e}"))),
            None => Ok(0),
        }
    }

    /// Attach `id` as available and assign it the next serial number.
    pub async fn attach(&self, id: &str, name: &str) -> WorkloadResult<()> {
        let _guard = self.attach_lock.lock().await;
        if self.exists(id).await? {
            return Err(WorkloadError::AlreadyExists(id.to_string()));
        }
        let serial = self.count().await?;
        self.storage.write_string(&serial_key(serial), id).await?;
        self.storage
            .write_string(COUNT_KEY, &(serial + 1).to_string())
            .await?;
        let info = ResourceInfo {
            available: true,
            serial,
            name: name.to_string(),
        };
        self.storage
            .write(&info_key(id), serde_json::to_vec(&info)?)
            .await?;
        tracing::info!("attached resource {} as serial {}", id, serial);
        Ok(())
    }

    /// Name of `id`, `None` if never attached.
    pub async fn name(&self, id: &str) -> WorkloadResult<Option<String>> {
        Ok(self.info(id).await?.map(|info| info.name))
    }

    /// Ids sorted by serial number, truncated to `min(n, count)`.
    pub async fn list_first_n(&self, n: usize) -> WorkloadResult<Vec<String>> {
        let total = usize::try_from(self.count().await?).unwrap_or(usize::MAX);
        let take = n.min(total);
        let mut ids = Vec::with_capacity(take);
        for serial in 0..take as u64 {
            let id = self
                .storage
                .read_string(&serial_key(serial))
                .await?
                .ok_or_else(|| WorkloadError::Backend(format!("serial {serial} has no resource")))?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Flag `id` as free.
    pub async fn mark_available(&self, id: &str) -> WorkloadResult<()> {
        self.set_available(id, true).await
    }

    /// Flag `id` as allocated.
    pub async fn mark_unavailable(&self, id: &str) -> WorkloadResult<()> {
        self.set_available(id, false).await
    }

    /// Whether `id` is attached and free.
    pub async fn is_available(&self, id: &str) -> WorkloadResult<bool> {
        Ok(self.info(id).await?.is_some_and(|info| info.available))
    }

    async fn set_available(&self, id: &str, available: bool) -> WorkloadResult<()> {
        let mut info = self
            .info(id)
            .await?
            .ok_or_else(|| WorkloadError::ResourceNotFound(id.to_string()))?;
        info.available = available;
        self.storage
            .write(&info_key(id), serde_json::to_vec(&info)?)
            .await
    }
}
