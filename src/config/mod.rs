//! Configuration models for policy limits and storage backends.

pub mod scheduler;

pub use scheduler::{SchedulerConfig, StorageBackendConfig, CONFIG_ENV_VAR};
