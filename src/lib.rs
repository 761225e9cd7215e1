//! # TechWM Scheduler
//!
//! Job admission and hardware resource allocation core for a multi-tenant
//! workload manager.
//!
//! Users submit jobs that request named hardware resources (CPU or GPU units).
//! The scheduler validates every request against the submitter's account
//! policy, queues it in FIFO order and allocates resources to the queue head as
//! soon as all of them are free. Finishing or cancelling a job releases its
//! resources and drains the queue again.
//!
//! ## Components
//!
//! - **Resource Registry** (`infra::registry`): durable id → availability,
//!   serial number and name mapping on top of a key-value [`infra::Storage`].
//! - **Execution Backend** (`core::resource::ExecutionBackend`): performs the
//!   physical allocate/release/verify calls.
//! - **Resource Manager** (`core::resource_manager`): composes the two.
//! - **Job Scheduler** (`core::scheduler`): admission policy, FIFO queue,
//!   head-blocking drain, finish and cancel.
//! - **Job Record Store** (`infra::job_store`): id counter and persisted
//!   descriptions of completed jobs.
//!
//! ## Example
//!
//! ```rust,ignore
//! use techwm_scheduler::builders::build_in_memory_scheduler;
//! use techwm_scheduler::core::{AccountType, PermissionLevel, ResourceKind, User};
//! use techwm_scheduler::infra::SimulatedBackend;
//!
//! let backend = SimulatedBackend::new()
//!     .with_device("cpu-0", ResourceKind::Cpu)
//!     .with_device("gpu-0", ResourceKind::Gpu);
//! let scheduler = build_in_memory_scheduler(&Default::default(), backend);
//! scheduler.resources().attach_hardware_resource("cpu-0", "Xeon core 0").await?;
//!
//! let user = User::new("alice", PermissionLevel::User, AccountType::Default);
//! let pending = scheduler.submit_job(&user, "train", vec!["cpu-0".into()]).await?;
//! let job = pending.await?;
//! scheduler.finish_job(&job).await?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core domain types, policy checks and the job scheduler.
pub mod core;
/// Configuration models for policy limits and storage backends.
pub mod config;
/// Builders to wire a scheduler from configuration.
pub mod builders;
/// Infrastructure adapters: storage, registry, job records, execution backend.
pub mod infra;
/// Shared utilities.
pub mod util;
