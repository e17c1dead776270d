//! Backend implemented by the host application.
//!
//! Apps that prefer to drive Keychain Services (or Android Keystore-backed
//! storage) from Swift or Kotlin implement [`ForeignStorageBackend`];
//! [`ForeignBackend`] adapts it to [`SecureStorageBackend`].

use std::sync::Arc;

use super::error::SecureStoreError;
use crate::accessibility::Accessibility;
use crate::backend::{status, Outcome, SecureStorageBackend};
use crate::identity::{ItemDescriptor, StoreIdentity};

/// Item address passed to foreign backends.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ItemQuery {
    /// Account the item belongs to.
    pub account: String,
    /// Access group, if the store is restricted to one.
    pub access_group: Option<String>,
    /// Logical key of the item.
    pub key: String,
}

impl From<&ItemDescriptor> for ItemQuery {
    fn from(item: &ItemDescriptor) -> Self {
        Self {
            account: item.account().to_string(),
            access_group: item.access_group().map(str::to_string),
            key: item.key().to_string(),
        }
    }
}

/// Result reported by a foreign backend.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum ForeignOutcome {
    /// `fetch` found the item.
    Found {
        /// Stored payload.
        data: Vec<u8>,
    },
    /// `enumerate` found matching items.
    Keys {
        /// Logical keys of the matching items.
        keys: Vec<String>,
    },
    /// `add`, `update` or `delete` succeeded.
    Success,
    /// No item matched.
    NotFound,
    /// `add` found an existing item.
    Duplicate,
    /// Any other platform status.
    Failure {
        /// Raw status code.
        code: i32,
    },
}

/// Secure storage backend implemented in Swift or Kotlin.
#[uniffi::export(with_foreign)]
pub trait ForeignStorageBackend: Send + Sync {
    /// Fetches one item. Expected: `Found`, `NotFound` or `Failure`.
    ///
    /// # Errors
    ///
    /// Returns an error if the callback itself fails.
    fn fetch(&self, query: ItemQuery) -> Result<ForeignOutcome, SecureStoreError>;

    /// Adds one item. Expected: `Success`, `Duplicate` or `Failure`.
    ///
    /// # Errors
    ///
    /// Returns an error if the callback itself fails.
    fn add(
        &self,
        query: ItemQuery,
        data: Vec<u8>,
        accessibility: Accessibility,
    ) -> Result<ForeignOutcome, SecureStoreError>;

    /// Replaces the payload of one item. Expected: `Success`, `NotFound` or `Failure`.
    ///
    /// # Errors
    ///
    /// Returns an error if the callback itself fails.
    fn update(&self, query: ItemQuery, data: Vec<u8>) -> Result<ForeignOutcome, SecureStoreError>;

    /// Deletes one item. Expected: `Success`, `NotFound` or `Failure`.
    ///
    /// # Errors
    ///
    /// Returns an error if the callback itself fails.
    fn delete(&self, query: ItemQuery) -> Result<ForeignOutcome, SecureStoreError>;

    /// Lists keys for an identity. Expected: `Keys`, `NotFound` or `Failure`.
    ///
    /// # Errors
    ///
    /// Returns an error if the callback itself fails.
    fn enumerate(
        &self,
        account: String,
        access_group: Option<String>,
    ) -> Result<ForeignOutcome, SecureStoreError>;
}

/// Adapts a [`ForeignStorageBackend`] to [`SecureStorageBackend`].
///
/// Replies that don't fit the operation are reported as `status::PARAM`
/// failures; callback errors as `status::INTERNAL_COMPONENT`.
pub struct ForeignBackend {
    inner: Arc<dyn ForeignStorageBackend>,
}

impl ForeignBackend {
    /// Wraps a foreign backend.
    #[must_use]
    pub fn new(inner: Arc<dyn ForeignStorageBackend>) -> Self {
        Self { inner }
    }
}

impl std::fmt::Debug for ForeignBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForeignBackend").finish_non_exhaustive()
    }
}

fn resolve(
    operation: &str,
    reply: Result<ForeignOutcome, SecureStoreError>,
) -> Outcome<ForeignOutcome> {
    match reply {
        Ok(ForeignOutcome::NotFound) => Outcome::NotFound,
        Ok(ForeignOutcome::Duplicate) => Outcome::Duplicate,
        Ok(ForeignOutcome::Failure { code }) => Outcome::Failure(code),
        Ok(other) => Outcome::Success(other),
        Err(err) => {
            log::warn!("foreign backend {operation} failed: {err}");
            Outcome::Failure(status::INTERNAL_COMPONENT)
        }
    }
}

fn protocol_violation<T>(operation: &str, reply: &ForeignOutcome) -> Outcome<T> {
    log::warn!("foreign backend {operation} returned {reply:?}");
    Outcome::Failure(status::PARAM)
}

fn expect_success(operation: &str, reply: Result<ForeignOutcome, SecureStoreError>) -> Outcome {
    match resolve(operation, reply) {
        Outcome::Success(ForeignOutcome::Success) => Outcome::Success(()),
        Outcome::Success(other) => protocol_violation(operation, &other),
        Outcome::NotFound => Outcome::NotFound,
        Outcome::Duplicate => Outcome::Duplicate,
        Outcome::Failure(code) => Outcome::Failure(code),
    }
}

impl SecureStorageBackend for ForeignBackend {
    fn fetch(&self, item: &ItemDescriptor) -> Outcome<Vec<u8>> {
        match resolve("fetch", self.inner.fetch(item.into())) {
            Outcome::Success(ForeignOutcome::Found { data }) => Outcome::Success(data),
            Outcome::Success(other) => protocol_violation("fetch", &other),
            Outcome::NotFound => Outcome::NotFound,
            Outcome::Duplicate => Outcome::Duplicate,
            Outcome::Failure(code) => Outcome::Failure(code),
        }
    }

    fn add(&self, item: &ItemDescriptor, data: &[u8], accessibility: Accessibility) -> Outcome {
        expect_success("add", self.inner.add(item.into(), data.to_vec(), accessibility))
    }

    fn update(&self, item: &ItemDescriptor, data: &[u8]) -> Outcome {
        expect_success("update", self.inner.update(item.into(), data.to_vec()))
    }

    fn delete(&self, item: &ItemDescriptor) -> Outcome {
        expect_success("delete", self.inner.delete(item.into()))
    }

    fn enumerate(&self, identity: &StoreIdentity) -> Outcome<Vec<String>> {
        let reply = self.inner.enumerate(
            identity.account().to_string(),
            identity.access_group().map(str::to_string),
        );
        match resolve("enumerate", reply) {
            Outcome::Success(ForeignOutcome::Keys { keys }) => Outcome::Success(keys),
            Outcome::Success(other) => protocol_violation("enumerate", &other),
            Outcome::NotFound => Outcome::NotFound,
            Outcome::Duplicate => Outcome::Duplicate,
            Outcome::Failure(code) => Outcome::Failure(code),
        }
    }
}
