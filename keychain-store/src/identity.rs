//! Store identity and item descriptors.
//!
//! Every stored entry is addressed by the triple `(account, access group, key)`.
//! The first two parts form the [`StoreIdentity`] owned by a store; the key is
//! supplied per operation and combined with the identity into an
//! [`ItemDescriptor`].

use std::fmt;

use crate::error::{StoreError, StoreResult};

/// The `(account, access group)` pair that scopes a store.
///
/// The account is guaranteed non-empty. The access group, when present, is
/// guaranteed non-empty as well.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreIdentity {
    account: String,
    access_group: Option<String>,
}

impl StoreIdentity {
    /// Validates and builds an identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidIdentity`] if `account` is empty or if
    /// `access_group` is `Some("")`.
    pub fn new<A: Into<String>>(account: A, access_group: Option<String>) -> StoreResult<Self> {
        let account = account.into();
        if account.is_empty() {
            return Err(StoreError::invalid_identity("account must not be empty"));
        }
        if access_group.as_deref().is_some_and(str::is_empty) {
            return Err(StoreError::invalid_identity(
                "access group must not be empty when supplied",
            ));
        }
        Ok(Self {
            account,
            access_group,
        })
    }

    /// Returns the account name.
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Returns the access group, if one was supplied.
    #[must_use]
    pub fn access_group(&self) -> Option<&str> {
        self.access_group.as_deref()
    }

    /// Builds the descriptor addressing `key` under this identity.
    #[must_use]
    pub fn descriptor<K: Into<String>>(&self, key: K) -> ItemDescriptor {
        ItemDescriptor {
            identity: self.clone(),
            key: key.into(),
        }
    }
}

impl fmt::Display for StoreIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.access_group {
            Some(group) => write!(f, "{}@{group}", self.account),
            None => f.write_str(&self.account),
        }
    }
}

/// Logical address of one stored entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemDescriptor {
    identity: StoreIdentity,
    key: String,
}

impl ItemDescriptor {
    /// Returns the identity part of the descriptor.
    #[must_use]
    pub const fn identity(&self) -> &StoreIdentity {
        &self.identity
    }

    /// Returns the account of the descriptor.
    #[must_use]
    pub fn account(&self) -> &str {
        self.identity.account()
    }

    /// Returns the access group of the descriptor, if any.
    #[must_use]
    pub fn access_group(&self) -> Option<&str> {
        self.identity.access_group()
    }

    /// Returns the logical key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ItemDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.identity, self.key)
    }
}
