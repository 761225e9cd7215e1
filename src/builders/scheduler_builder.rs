//! Builds storage, registry, resource manager and scheduler from configuration.

use std::sync::Arc;

use anyhow::Context;

use crate::config::{SchedulerConfig, StorageBackendConfig};
use crate::core::{AppResult, ExecutionBackend, JobScheduler, PolicyLimits, ResourceManager};
use crate::infra::{FileStorage, InMemoryStorage, Storage, StorageJobRecordStore};

/// Type-erased storage shared by the built components.
pub type SharedStorage = Arc<dyn Storage>;

/// Scheduler assembled by [`build_scheduler`].
pub type DefaultScheduler<B> =
    JobScheduler<ResourceManager<SharedStorage, B>, StorageJobRecordStore<SharedStorage>>;

/// Open the storage for one namespace (`resources` or `jobs`).
pub fn build_storage(cfg: &StorageBackendConfig, namespace: &str) -> AppResult<SharedStorage> {
    Ok(match cfg {
        StorageBackendConfig::InMemory => Arc::new(InMemoryStorage::new()),
        StorageBackendConfig::File { path } => Arc::new(
            FileStorage::open(path, namespace)
                .with_context(|| format!("opening {namespace} storage in {}", path.display()))?,
        ),
    })
}

/// Validate `cfg` and assemble a scheduler over `backend`.
pub fn build_scheduler<B>(cfg: &SchedulerConfig, backend: B) -> AppResult<DefaultScheduler<B>>
where
    B: ExecutionBackend,
{
    cfg.validate()
        .map_err(|e| anyhow::anyhow!("config invalid: {e}"))?;
    let resources = build_storage(&cfg.storage, "resources")?;
    let jobs = build_storage(&cfg.storage, "jobs")?;
    tracing::info!("scheduler storage: {:?}", cfg.storage);
    Ok(assemble(resources, jobs, backend, cfg.policy))
}

/// Scheduler over fresh in-memory storage.
pub fn build_in_memory_scheduler<B>(policy: &PolicyLimits, backend: B) -> DefaultScheduler<B>
where
    B: ExecutionBackend,
{
    assemble(
        Arc::new(InMemoryStorage::new()),
        Arc::new(InMemoryStorage::new()),
        backend,
        *policy,
    )
}

fn assemble<B>(
    resources: SharedStorage,
    jobs: SharedStorage,
    backend: B,
    policy: PolicyLimits,
) -> DefaultScheduler<B>
where
    B: ExecutionBackend,
{
    JobScheduler::new(
        Arc::new(ResourceManager::new(resources, backend)),
        Arc::new(StorageJobRecordStore::new(jobs)),
        policy,
    )
}
