//! Resource types and the collaborator traits around them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::WorkloadResult;

/// Capability class reported by the execution backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// General purpose CPU unit.
    Cpu,
    /// GPU accelerator.
    Gpu,
}

/// Concrete handle to an allocated hardware unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHandle {
    /// Resource id the handle was allocated for.
    pub id: String,
    /// Capability class of the unit.
    pub kind: ResourceKind,
}

/// Registry record for an attached resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    /// Whether the resource can currently be allocated.
    pub available: bool,
    /// Attachment order, starting at 0.
    pub serial: u64,
    /// Human-readable name.
    pub name: String,
}

/// Low-level allocate/release/verify against physical or simulated devices.
#[async_trait]
pub trait ExecutionBackend: Send + Sync + 'static {
    /// Allocate the unit with `id`; fails if it is not currently free.
    async fn allocate_resource(&self, id: &str) -> WorkloadResult<ResourceHandle>;
    /// Return a previously allocated unit.
    async fn release_resource(&self, handle: &ResourceHandle) -> WorkloadResult<()>;
    /// Classify the unit with `id` without allocating it.
    async fn verify_resource(&self, id: &str) -> WorkloadResult<ResourceKind>;
}

/// Resource operations consumed by the job scheduler.
#[async_trait]
pub trait ResourceService: Send + Sync + 'static {
    /// Whether a resource with `id` has been attached.
    async fn id_exists(&self, id: &str) -> WorkloadResult<bool>;
    /// Attach a new resource; fails with `AlreadyExists` for a known id.
    async fn attach_hardware_resource(&self, id: &str, name: &str) -> WorkloadResult<()>;
    /// Name of the resource, `None` if it was never attached.
    async fn resource_name(&self, id: &str) -> WorkloadResult<Option<String>>;
    /// First `n` attached resource ids in attachment order.
    async fn attached_resources(&self, n: usize) -> WorkloadResult<Vec<String>>;
    /// Capability class of the resource.
    async fn verify_resource(&self, id: &str) -> WorkloadResult<ResourceKind>;
    /// Reserve and allocate the resource.
    async fn allocate_resource(&self, id: &str) -> WorkloadResult<ResourceHandle>;
    /// Release an allocated resource.
    async fn release_resource(&self, handle: &ResourceHandle) -> WorkloadResult<()>;
    /// Whether the resource is attached and not allocated.
    async fn is_available(&self, id: &str) -> WorkloadResult<bool>;
}
