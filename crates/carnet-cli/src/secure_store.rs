//! Session persistence backed by the OS keychain.

use async_trait::async_trait;
use carnet_core::error::StorageOperation;
use carnet_core::session::{SecurePersistence, StorageResult};
use carnet_core::StorageError;
use keyring::Entry;

const KEYRING_SERVICE_NAME: &str = "carnet-cli";

/// Stores each session key as its own keychain entry, scoped by profile.
#[derive(Debug, Clone)]
pub struct KeyringPersistence {
    profile: String,
}

impl KeyringPersistence {
    pub fn new(profile_name: &str) -> Self {
        Self {
            profile: profile_name.to_string(),
        }
    }

    fn username(&self, key: &str) -> String {
        format!("{key}:{}", self.profile)
    }

    fn entry(&self, operation: StorageOperation, key: &str) -> StorageResult<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username(key))
            .map_err(|error| StorageError::new(operation, key, error.to_string()))
    }
}

#[async_trait]
impl SecurePersistence for KeyringPersistence {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let entry = self.entry(StorageOperation::Read, key)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(StorageError::new(
                StorageOperation::Read,
                key,
                error.to_string(),
            )),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entry(StorageOperation::Write, key)?
            .set_password(value)
            .map_err(|error| StorageError::new(StorageOperation::Write, key, error.to_string()))
    }

    async fn delete_item(&self, key: &str) -> StorageResult<()> {
        let entry = self.entry(StorageOperation::Delete, key)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(StorageError::new(
                StorageOperation::Delete,
                key,
                error.to_string(),
            )),
        }
    }
}
