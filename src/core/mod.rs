//! Core domain types, policy checks and the job scheduler.

pub mod audit;
pub mod error;
pub mod job;
pub mod policy;
pub mod resource;
pub mod resource_manager;
pub mod scheduler;

pub use audit::{build_audit_event, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use error::{AppResult, ErrorKind, WorkloadError, WorkloadResult};
pub use job::{AllocatedJob, JobDescription, JobId, JobStatus, PendingJob};
pub use policy::{AccountLimits, AccountType, PermissionLevel, PolicyLimits, User};
pub use resource::{ExecutionBackend, ResourceHandle, ResourceInfo, ResourceKind, ResourceService};
pub use resource_manager::ResourceManager;
pub use scheduler::JobScheduler;
