//! Key-value storage backends.
//!
//! Every component keeps its logical fields under independent string keys
//! (`serial#count`, `resource#<id>`, `job#<id>`, ...). Values are opaque
//! bytes; an empty value is indistinguishable from an absent key.

pub mod file;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::WorkloadResult;

pub use file::FileStorage;
pub use memory::InMemoryStorage;

/// Asynchronous per-key CRUD over byte values.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `value` under `key` only if the key is absent. Returns `false` if it existed.
    async fn create(&self, key: &str, value: Vec<u8>) -> WorkloadResult<bool>;
    /// Fetch the value under `key`, `None` if absent.
    async fn read(&self, key: &str) -> WorkloadResult<Option<Vec<u8>>>;
    /// Replace the value under an existing `key`. Returns `false` if absent.
    async fn update(&self, key: &str, value: Vec<u8>) -> WorkloadResult<bool>;
    /// Remove `key`. Returns `false` if absent.
    async fn delete(&self, key: &str) -> WorkloadResult<bool>;

    /// Upsert: create the key, or update it if it already exists.
    async fn write(&self, key: &str, value: Vec<u8>) -> WorkloadResult<()> {
        if !self.create(key, value.clone()).await? && !self.update(key, value).await? {
            return Err(crate::core::WorkloadError::Backend(format!(
                "key `{key}` vanished during write"
            )));
        }
        Ok(())
    }

    /// Read a UTF-8 string value.
    async fn read_string(&self, key: &str) -> WorkloadResult<Option<String>> {
        match self.read(key).await? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| crate::core::WorkloadError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    /// Upsert a UTF-8 string value.
    async fn write_string(&self, key: &str, value: &str) -> WorkloadResult<()> {
        self.write(key, value.as_bytes().to_vec()).await
    }
}

#[async_trait]
impl<T> Storage for Arc<T>
where
    T: Storage + ?Sized,
{
    async fn create(&self, key: &str, value: Vec<u8>) -> WorkloadResult<bool> {
        (**self).create(key, value).await
    }

    async fn read(&self, key: &str) -> WorkloadResult<Option<Vec<u8>>> {
        (**self).read(key).await
    }

    async fn update(&self, key: &str, value: Vec<u8>) -> WorkloadResult<bool> {
        (**self).update(key, value).await
    }

    async fn delete(&self, key: &str) -> WorkloadResult<bool> {
        (**self).delete(key).await
    }
}
