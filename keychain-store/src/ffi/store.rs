//! Scoped store exported to Swift and Kotlin.

use std::sync::Arc;

use super::backend::{ForeignBackend, ForeignStorageBackend};
use super::error::SecureStoreError;
use crate::accessibility::Accessibility;
use crate::backend::{MemoryBackend, SecureStorageBackend};
use crate::store::{KeychainStore, SweepReport};

/// Outcome of [`SecureStore::delete_all`].
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct SweepSummary {
    /// Number of items removed.
    pub deleted: u64,
    /// Keys that could not be removed.
    pub failed_keys: Vec<String>,
}

impl From<SweepReport> for SweepSummary {
    fn from(report: SweepReport) -> Self {
        Self {
            deleted: u64::try_from(report.deleted).unwrap_or(u64::MAX),
            failed_keys: report.failed.into_iter().map(|(key, _)| key).collect(),
        }
    }
}

/// Secure key/value store scoped to one account and optional access group.
#[derive(uniffi::Object)]
pub struct SecureStore {
    inner: KeychainStore<Arc<dyn SecureStorageBackend>>,
}

impl SecureStore {
    fn build(
        backend: Arc<dyn SecureStorageBackend>,
        account: String,
        access_group: Option<String>,
    ) -> Result<Arc<Self>, SecureStoreError> {
        let inner = KeychainStore::new(backend, account, access_group)?;
        Ok(Arc::new(Self { inner }))
    }
}

#[uniffi::export]
impl SecureStore {
    /// Creates a store over a backend implemented by the host application.
    ///
    /// # Errors
    ///
    /// Returns an error if the account or an explicit access group is empty.
    #[uniffi::constructor]
    pub fn new(
        backend: Arc<dyn ForeignStorageBackend>,
        account: String,
        access_group: Option<String>,
    ) -> Result<Arc<Self>, SecureStoreError> {
        Self::build(Arc::new(ForeignBackend::new(backend)), account, access_group)
    }

    /// Creates a store over a process-local in-memory backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the account or an explicit access group is empty.
    #[uniffi::constructor]
    pub fn in_memory(
        account: String,
        access_group: Option<String>,
    ) -> Result<Arc<Self>, SecureStoreError> {
        Self::build(Arc::new(MemoryBackend::new()), account, access_group)
    }

    /// Account the store is scoped to.
    #[must_use]
    pub fn account(&self) -> String {
        self.inner.account().to_string()
    }

    /// Access group the store is scoped to, if any.
    #[must_use]
    pub fn access_group(&self) -> Option<String> {
        self.inner.access_group().map(str::to_string)
    }

    /// Reads raw bytes. Returns `None` when the item is absent.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    pub fn get(&self, key: String) -> Result<Option<Vec<u8>>, SecureStoreError> {
        Ok(self.inner.get(&key)?)
    }

    /// Stores raw bytes, creating or replacing the item.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    pub fn set(&self, key: String, data: Vec<u8>) -> Result<(), SecureStoreError> {
        Ok(self.inner.set(&key, &data)?)
    }

    /// Stores raw bytes, applying `accessibility` if the item is new.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    pub fn set_with_accessibility(
        &self,
        key: String,
        data: Vec<u8>,
        accessibility: Accessibility,
    ) -> Result<(), SecureStoreError> {
        Ok(self.inner.set_with_accessibility(&key, &data, accessibility)?)
    }

    /// Replaces the bytes of an existing item.
    ///
    /// # Errors
    ///
    /// Returns [`SecureStoreError::ItemNotFound`] if the item does not exist.
    pub fn update(&self, key: String, data: Vec<u8>) -> Result<(), SecureStoreError> {
        Ok(self.inner.update(&key, &data)?)
    }

    /// Deletes one item.
    ///
    /// # Errors
    ///
    /// Returns [`SecureStoreError::ItemNotFound`] if the item does not exist.
    pub fn delete(&self, key: String) -> Result<(), SecureStoreError> {
        Ok(self.inner.delete(&key)?)
    }

    /// Returns whether an item exists under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    pub fn has_key(&self, key: String) -> Result<bool, SecureStoreError> {
        Ok(self.inner.has_key(&key)?)
    }

    /// Lists the keys stored for this account and access group.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    pub fn all_keys(&self) -> Result<Vec<String>, SecureStoreError> {
        Ok(self.inner.all_keys()?)
    }

    /// Deletes every item for this account and access group.
    ///
    /// # Errors
    ///
    /// Returns an error if the keys cannot be listed.
    pub fn delete_all(&self) -> Result<SweepSummary, SecureStoreError> {
        Ok(self.inner.delete_all()?.into())
    }

    /// Reads text. Returns `None` when absent or not valid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    pub fn get_string(&self, key: String) -> Result<Option<String>, SecureStoreError> {
        Ok(self.inner.strings().get_string(&key)?)
    }

    /// Stores text, creating or replacing the item.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    pub fn set_string(&self, key: String, value: String) -> Result<(), SecureStoreError> {
        Ok(self.inner.strings().set_string(&key, &value)?)
    }

    /// Replaces the text of an existing item.
    ///
    /// # Errors
    ///
    /// Returns [`SecureStoreError::ItemNotFound`] if the item does not exist.
    pub fn update_string(&self, key: String, value: String) -> Result<(), SecureStoreError> {
        Ok(self.inner.strings().update_string(&key, &value)?)
    }
}

#[cfg(all(feature = "platform-apple", target_vendor = "apple"))]
#[uniffi::export]
impl SecureStore {
    /// Creates a store over the Apple Keychain.
    ///
    /// # Errors
    ///
    /// Returns an error if the account or an explicit access group is empty.
    #[uniffi::constructor]
    pub fn keychain(
        account: String,
        access_group: Option<String>,
    ) -> Result<Arc<Self>, SecureStoreError> {
        Self::build(
            Arc::new(crate::backend::KeychainBackend::new()),
            account,
            access_group,
        )
    }
}
