//! Declarative store configuration.
//!
//! Applications describe the store they want (account, access group, default
//! accessibility) in their own configuration and build a
//! [`KeychainStore`](crate::KeychainStore) from it explicitly. There is no
//! process-wide default account.

use serde::{Deserialize, Serialize};

use crate::accessibility::Accessibility;
use crate::error::StoreResult;
use crate::identity::StoreIdentity;

/// Configuration for one scoped store.
///
/// ```
/// use keychain_store::{Accessibility, StoreConfig};
///
/// let config: StoreConfig = serde_json::from_str(
///     r#"{ "account": "alice", "accessibility": "after-first-unlock" }"#,
/// )?;
/// assert_eq!(config.accessibility, Accessibility::AfterFirstUnlock);
/// assert!(config.access_group.is_none());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Account every item is scoped to.
    pub account: String,
    /// Optional access group shared with related applications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_group: Option<String>,
    /// Policy applied by [`KeychainStore::set`](crate::KeychainStore::set).
    #[serde(default)]
    pub accessibility: Accessibility,
}

impl StoreConfig {
    /// Creates a configuration with the default accessibility.
    #[must_use]
    pub fn new<A: Into<String>>(account: A, access_group: Option<String>) -> Self {
        Self {
            account: account.into(),
            access_group,
            accessibility: Accessibility::default(),
        }
    }

    /// Validates the configured identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidIdentity`](crate::StoreError::InvalidIdentity)
    /// if the account or an explicit access group is empty.
    pub fn identity(&self) -> StoreResult<StoreIdentity> {
        StoreIdentity::new(self.account.clone(), self.access_group.clone())
    }
}
