//! Error types for the scoped store and its typed views.

use thiserror::Error;

use crate::backend::status;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by [`KeychainStore`](crate::KeychainStore) and its views.
///
/// Absence during a read is not an error (reads return `None`). Absence during
/// a write that requires an existing item is reported as
/// [`StoreError::ItemNotFound`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The account is empty, or an explicitly supplied access group is empty.
    #[error("invalid store identity: {reason}")]
    InvalidIdentity {
        /// Which part of the identity was rejected.
        reason: String,
    },

    /// The item addressed by an update or delete does not exist.
    #[error("item not found")]
    ItemNotFound,

    /// A value could not be encoded into bytes (text or structured codec).
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Stored bytes could not be decoded into the requested value type.
    #[error("decode failure: {0}")]
    DecodeFailure(String),

    /// The backend reported a status this layer does not recover from.
    #[error("backend failure (status {code})")]
    BackendFailure {
        /// Raw status code reported by the backend.
        code: i32,
    },
}

impl StoreError {
    /// Creates an invalid identity error.
    #[must_use]
    pub fn invalid_identity<S: Into<String>>(reason: S) -> Self {
        Self::InvalidIdentity {
            reason: reason.into(),
        }
    }

    /// Creates a backend failure error for a raw status code.
    ///
    /// The not-found status is normalized to [`StoreError::ItemNotFound`] so
    /// callers never have to match on the platform code themselves.
    #[must_use]
    pub const fn from_status(code: i32) -> Self {
        if code == status::ITEM_NOT_FOUND {
            Self::ItemNotFound
        } else {
            Self::BackendFailure { code }
        }
    }

    /// Returns the backend status code carried by this error, if any.
    #[must_use]
    pub const fn status_code(&self) -> Option<i32> {
        match self {
            Self::ItemNotFound => Some(status::ITEM_NOT_FOUND),
            Self::BackendFailure { code } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::invalid_identity("account must not be empty");
        assert!(format!("{err}").contains("account must not be empty"));
        let err = StoreError::BackendFailure { code: -34018 };
        assert!(format!("{err}").contains("-34018"));
        assert_eq!(format!("{}", StoreError::ItemNotFound), "item not found");
    }

    #[test]
    fn test_from_status_normalizes_not_found() {
        assert_eq!(
            StoreError::from_status(status::ITEM_NOT_FOUND),
            StoreError::ItemNotFound
        );
        assert_eq!(
            StoreError::from_status(-25308),
            StoreError::BackendFailure { code: -25308 }
        );
        assert_eq!(StoreError::ItemNotFound.status_code(), Some(-25300));
        assert_eq!(StoreError::DecodeFailure("x".into()).status_code(), None);
    }
}
