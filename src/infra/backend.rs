//! In-process execution backend simulating a set of devices.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::resource::{ExecutionBackend, ResourceHandle, ResourceKind};
use crate::core::{WorkloadError, WorkloadResult};

#[derive(Debug, Clone, Copy)]
struct Device {
    kind: ResourceKind,
    busy: bool,
    faulty: bool,
}

/// Execution backend backed by an in-memory device table.
///
/// Allocating an unknown, busy or faulty device fails with a backend error.
/// Releasing a faulty device fails too and leaves it allocated.
#[derive(Default)]
pub struct SimulatedBackend {
    devices: Mutex<HashMap<String, Device>>,
}

impl SimulatedBackend {
    /// Backend with no devices.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`SimulatedBackend::add_device`].
    #[must_use]
    pub fn with_device(self, id: impl Into<String>, kind: ResourceKind) -> Self {
        self.add_device(id, kind);
        self
    }

    /// Register a free device.
    pub fn add_device(&self, id: impl Into<String>, kind: ResourceKind) {
        self.devices.lock().insert(
            id.into(),
            Device {
                kind,
                busy: false,
                faulty: false,
            },
        );
    }

    /// Make every allocation and release of `id` fail until cleared.
    pub fn set_faulty(&self, id: &str, faulty: bool) {
        if let Some(device) = self.devices.lock().get_mut(id) {
            device.faulty = faulty;
        }
    }

    /// Whether `id` is currently allocated.
    #[must_use]
    pub fn is_busy(&self, id: &str) -> bool {
        self.devices.lock().get(id).is_some_and(|d| d.busy)
    }
}

#[async_trait]
impl ExecutionBackend for SimulatedBackend {
    async fn allocate_resource(&self, id: &str) -> WorkloadResult<ResourceHandle> {
        let mut devices = self.devices.lock();
        let device = devices
            .get_mut(id)
            .ok_or_else(|| WorkloadError::Backend(format!("unknown device {id}")))?;
        if device.faulty {
            return Err(WorkloadError::Backend(format!("device {id} failed to allocate")));
        }
        if device.busy {
            return Err(WorkloadError::Backend(format!("device {id} already allocated")));
        }
        device.busy = true;
        Ok(ResourceHandle {
            id: id.to_string(),
            kind: device.kind,
        })
    }

    async fn release_resource(&self, handle: &ResourceHandle) -> WorkloadResult<()> {
        let mut devices = self.devices.lock();
        let device = devices
            .get_mut(&handle.id)
            .ok_or_else(|| WorkloadError::Backend(format!("unknown device {}", handle.id)))?;
        if device.faulty {
            return Err(WorkloadError::Backend(format!(
                "device {} failed to release",
                handle.id
            )));
        }
        device.busy = false;
        Ok(())
    }

    async fn verify_resource(&self, id: &str) -> WorkloadResult<ResourceKind> {
        self.devices
            .lock()
            .get(id)
            .map(|d| d.kind)
            .ok_or_else(|| WorkloadError::Backend(format!("unknown device {id}")))
    }
}
