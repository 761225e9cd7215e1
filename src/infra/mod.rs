//! Infrastructure adapters for storage, the resource registry, job records and
//! the execution backend.

pub mod backend;
pub mod job_store;
pub mod registry;
pub mod storage;

pub use backend::SimulatedBackend;
pub use job_store::{JobRecordStore, StorageJobRecordStore};
pub use registry::ResourceRegistry;
pub use storage::{FileStorage, InMemoryStorage, Storage};
