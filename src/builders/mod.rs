//! Builders to wire a scheduler from configuration.

pub mod scheduler_builder;

pub use scheduler_builder::{
    build_in_memory_scheduler, build_scheduler, build_storage, DefaultScheduler, SharedStorage,
};
