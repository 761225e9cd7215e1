//! Resource manager: registry bookkeeping composed with the execution backend.

use async_trait::async_trait;

use crate::core::resource::{ExecutionBackend, ResourceHandle, ResourceKind, ResourceService};
use crate::core::WorkloadResult;
use crate::infra::registry::ResourceRegistry;
use crate::infra::storage::Storage;

/// Composes a [`ResourceRegistry`] with an [`ExecutionBackend`].
pub struct ResourceManager<S, B> {
    registry: ResourceRegistry<S>,
    backend: B,
}

impl<S, B> ResourceManager<S, B>
where
    S: Storage,
    B: ExecutionBackend,
{
    /// Create a manager over `storage` and `backend`.
    pub fn new(storage: S, backend: B) -> Self {
        Self {
            registry: ResourceRegistry::new(storage),
            backend,
        }
    }

    /// Underlying registry.
    pub const fn registry(&self) -> &ResourceRegistry<S> {
        &self.registry
    }

    /// Underlying execution backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }
}

#[async_trait]
impl<S, B> ResourceService for ResourceManager<S, B>
where
    S: Storage + 'static,
    B: ExecutionBackend,
{
    async fn id_exists(&self, id: &str) -> WorkloadResult<bool> {
        self.registry.exists(id).await
    }

    async fn attach_hardware_resource(&self, id: &str, name: &str) -> WorkloadResult<()> {
        self.registry.attach(id, name).await
    }

    async fn resource_name(&self, id: &str) -> WorkloadResult<Option<String>> {
        self.registry.name(id).await
    }

    async fn attached_resources(&self, n: usize) -> WorkloadResult<Vec<String>> {
        self.registry.list_first_n(n).await
    }

    async fn verify_resource(&self, id: &str) -> WorkloadResult<ResourceKind> {
        self.backend.verify_resource(id).await
    }

    /// Reserves the registry flag first, then asks the backend for the unit.
    /// A backend failure rolls the flag back before the error is returned.
    async fn allocate_resource(&self, id: &str) -> WorkloadResult<ResourceHandle> {
        self.registry.mark_unavailable(id).await?;
        match self.backend.allocate_resource(id).await {
            Ok(handle) => {
                tracing::debug!("allocated resource {}", id);
                Ok(handle)
            }
            Err(err) => {
                tracing::error!("backend failed to allocate {}: {}", id, err);
                if let Err(rollback) = self.registry.mark_available(id).await {
                    tracing::error!("failed to restore availability of {}: {}", id, rollback);
                }
                Err(err)
            }
        }
    }

    async fn release_resource(&self, handle: &ResourceHandle) -> WorkloadResult<()> {
        self.backend.release_resource(handle).await?;
        self.registry.mark_available(&handle.id).await?;
        tracing::debug!("released resource {}", handle.id);
        Ok(())
    }

    async fn is_available(&self, id: &str) -> WorkloadResult<bool> {
        self.registry.is_available(id).await
    }
}
