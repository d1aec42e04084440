//! Secure key-value storage used to persist the session.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::{StorageError, StorageOperation};

/// Key holding the bearer token
pub const TOKEN_KEY: &str = "secure_user_token";
/// Key holding the JSON-serialized user profile
pub const USER_KEY: &str = "secure_user_data";

pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value store with at-rest protection provided by the platform.
///
/// Deleting a key that does not exist must succeed.
#[async_trait]
pub trait SecurePersistence: Send + Sync {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    async fn delete_item(&self, key: &str) -> StorageResult<()>;
}

#[async_trait]
impl<T: SecurePersistence + ?Sized> SecurePersistence for Arc<T> {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_item(key, value).await
    }

    async fn delete_item(&self, key: &str) -> StorageResult<()> {
        (**self).delete_item(key).await
    }
}

/// In-process store. Clones share the same entries, so a second gate built
/// from a clone sees what the first one persisted.
///
/// Individual operations can be made to fail, which is how the session
/// recovery paths are exercised.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    entries: HashMap<String, String>,
    failing_reads: BTreeSet<String>,
    failing_writes: BTreeSet<String>,
    failing_deletes: BTreeSet<String>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, bypassing failure injection.
    pub fn insert(&self, key: &str, value: &str) {
        self.lock().entries.insert(key.to_string(), value.to_string());
    }

    /// Current raw value, bypassing failure injection.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    pub fn fail_reads(&self, key: &str, fail: bool) {
        toggle(&mut self.lock().failing_reads, key, fail);
    }

    pub fn fail_writes(&self, key: &str, fail: bool) {
        toggle(&mut self.lock().failing_writes, key, fail);
    }

    pub fn fail_deletes(&self, key: &str, fail: bool) {
        toggle(&mut self.lock().failing_deletes, key, fail);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn toggle(keys: &mut BTreeSet<String>, key: &str, fail: bool) {
    if fail {
        keys.insert(key.to_string());
    } else {
        keys.remove(key);
    }
}

#[async_trait]
impl SecurePersistence for MemoryPersistence {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let inner = self.lock();
        if inner.failing_reads.contains(key) {
            return Err(StorageError::new(
                StorageOperation::Read,
                key,
                "injected read failure",
            ));
        }
        Ok(inner.entries.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut inner = self.lock();
        if inner.failing_writes.contains(key) {
            return Err(StorageError::new(
                StorageOperation::Write,
                key,
                "injected write failure",
            ));
        }
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_item(&self, key: &str) -> StorageResult<()> {
        let mut inner = self.lock();
        if inner.failing_deletes.contains(key) {
            return Err(StorageError::new(
                StorageOperation::Delete,
                key,
                "injected delete failure",
            ));
        }
        inner.entries.remove(key);
        Ok(())
    }
}
