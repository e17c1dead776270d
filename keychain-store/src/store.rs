//! The account-scoped store.

use crate::accessibility::Accessibility;
use crate::backend::{status, Outcome, SecureStorageBackend};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::identity::{ItemDescriptor, StoreIdentity};

/// Result of a [`KeychainStore::delete_all`] sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Number of items removed.
    pub deleted: usize,
    /// Keys whose deletion failed, with the error the backend reported.
    pub failed: Vec<(String, StoreError)>,
}

impl SweepReport {
    /// Returns `true` if every enumerated key was removed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Byte store scoped to one `(account, access group)` identity.
///
/// The store holds no mutable state: every call is an independent round trip
/// to the backend, and several stores (even for the same identity) can be used
/// concurrently. Typed access goes through the views returned by
/// [`KeychainStore::bytes`], [`KeychainStore::strings`] and
/// [`KeychainStore::values`].
///
/// # Example
///
/// ```
/// use keychain_store::{backend::MemoryBackend, KeychainStore};
///
/// let store = KeychainStore::new(MemoryBackend::new(), "alice", None)?;
/// store.set("pin", b"0000")?;
/// assert_eq!(store.get("pin")?, Some(b"0000".to_vec()));
/// # Ok::<(), keychain_store::StoreError>(())
/// ```
#[derive(Debug)]
pub struct KeychainStore<B> {
    backend: B,
    identity: StoreIdentity,
    default_accessibility: Accessibility,
}

impl<B: SecureStorageBackend> KeychainStore<B> {
    /// Creates a store for `account`, optionally restricted to `access_group`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidIdentity`] if `account` is empty or if an
    /// explicit `access_group` is empty.
    pub fn new<A: Into<String>>(
        backend: B,
        account: A,
        access_group: Option<String>,
    ) -> StoreResult<Self> {
        let identity = StoreIdentity::new(account, access_group)?;
        Ok(Self::with_identity(backend, identity))
    }

    /// Creates a store for an already validated identity.
    #[must_use]
    pub fn with_identity(backend: B, identity: StoreIdentity) -> Self {
        Self {
            backend,
            identity,
            default_accessibility: Accessibility::default(),
        }
    }

    /// Creates a store from configuration.
    ///
    /// The configured accessibility becomes the policy used by [`Self::set`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidIdentity`] if the configured identity is invalid.
    pub fn from_config(backend: B, config: &StoreConfig) -> StoreResult<Self> {
        let identity = config.identity()?;
        Ok(Self {
            backend,
            identity,
            default_accessibility: config.accessibility,
        })
    }

    /// Returns the identity this store is scoped to.
    #[must_use]
    pub const fn identity(&self) -> &StoreIdentity {
        &self.identity
    }

    /// Returns the account name.
    #[must_use]
    pub fn account(&self) -> &str {
        self.identity.account()
    }

    /// Returns the access group, if any.
    #[must_use]
    pub fn access_group(&self) -> Option<&str> {
        self.identity.access_group()
    }

    /// Returns the policy applied by [`Self::set`].
    #[must_use]
    pub const fn default_accessibility(&self) -> Accessibility {
        self.default_accessibility
    }

    /// Returns the backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    fn descriptor(&self, key: &str) -> ItemDescriptor {
        self.identity.descriptor(key)
    }

    /// Reads the bytes stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BackendFailure`] for any backend status other than
    /// success or not-found. A missing item is `Ok(None)`.
    pub fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let item = self.descriptor(key);
        match self.backend.fetch(&item) {
            Outcome::Success(data) => Ok(Some(data)),
            Outcome::NotFound => Ok(None),
            outcome => Err(unexpected("fetch", &item, &outcome)),
        }
    }

    /// Returns whether an item exists under `key`.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::get`].
    pub fn has_key(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Stores `data` under `key` with the store's default accessibility,
    /// inserting or replacing.
    ///
    /// # Errors
    ///
    /// See [`Self::set_with_accessibility`].
    pub fn set(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        self.set_with_accessibility(key, data, self.default_accessibility)
    }

    /// Stores `data` under `key`, inserting or replacing.
    ///
    /// The item is added first. If the backend reports a duplicate, the call
    /// falls back to [`Self::update`]. `accessibility` only takes effect when
    /// the item is inserted; the fallback keeps the policy the existing item
    /// was created with.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BackendFailure`] for any backend failure other than
    /// the duplicate condition, and the errors of [`Self::update`] on the
    /// fallback path.
    pub fn set_with_accessibility(
        &self,
        key: &str,
        data: &[u8],
        accessibility: Accessibility,
    ) -> StoreResult<()> {
        let item = self.descriptor(key);
        match self.backend.add(&item, data, accessibility) {
            Outcome::Success(()) => Ok(()),
            Outcome::Duplicate => {
                log::debug!("{item} already exists, updating in place");
                self.update_item(&item, data)
            }
            outcome => Err(unexpected("add", &item, &outcome)),
        }
    }

    /// Replaces the bytes of an existing item. Never creates an item.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ItemNotFound`] if no item exists under `key`, or
    /// [`StoreError::BackendFailure`] for any other backend failure.
    pub fn update(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        self.update_item(&self.descriptor(key), data)
    }

    fn update_item(&self, item: &ItemDescriptor, data: &[u8]) -> StoreResult<()> {
        match self.backend.update(item, data) {
            Outcome::Success(()) => Ok(()),
            outcome => Err(unexpected("update", item, &outcome)),
        }
    }

    /// Lists the keys stored under this store's identity.
    ///
    /// Order is whatever the backend reports and need not match insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BackendFailure`] if enumeration fails. An identity
    /// with no items yields an empty list.
    pub fn all_keys(&self) -> StoreResult<Vec<String>> {
        match self.backend.enumerate(&self.identity) {
            Outcome::Success(keys) => Ok(keys),
            Outcome::NotFound => Ok(Vec::new()),
            outcome => {
                log::debug!("enumerate {}: status {}", self.identity, outcome.status());
                Err(StoreError::from_status(outcome.status()))
            }
        }
    }

    /// Deletes the item stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ItemNotFound`] if no item exists under `key`, or
    /// [`StoreError::BackendFailure`] for any other backend failure.
    pub fn delete(&self, key: &str) -> StoreResult<()> {
        let item = self.descriptor(key);
        match self.backend.delete(&item) {
            Outcome::Success(()) => Ok(()),
            outcome => Err(unexpected("delete", &item, &outcome)),
        }
    }

    /// Deletes every item stored under this store's identity.
    ///
    /// Keys are enumerated once and deleted one by one. A failed deletion is
    /// logged, recorded in the returned [`SweepReport`], and does not stop the
    /// sweep. The sweep is not atomic: items added after enumeration survive.
    ///
    /// # Errors
    ///
    /// Fails only if enumeration fails.
    pub fn delete_all(&self) -> StoreResult<SweepReport> {
        let mut report = SweepReport::default();
        for key in self.all_keys()? {
            match self.delete(&key) {
                Ok(()) => report.deleted += 1,
                Err(err) => {
                    log::warn!("failed to delete {}: {err}", self.descriptor(&key));
                    report.failed.push((key, err));
                }
            }
        }
        Ok(report)
    }
}

/// Maps any outcome the caller does not handle to an error.
fn unexpected<T>(operation: &str, item: &ItemDescriptor, outcome: &Outcome<T>) -> StoreError {
    let code = match outcome {
        // Callers match `Success` before reaching here.
        Outcome::Success(_) => status::PARAM,
        other => other.status(),
    };
    log::debug!("{operation} {item}: status {code}");
    StoreError::from_status(code)
}
