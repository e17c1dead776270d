//! FFI error type.
//!
//! The enum is not a flat error: it crosses the boundary in both directions,
//! since host backends throw it back from [`ForeignStorageBackend`] callbacks.
//!
//! [`ForeignStorageBackend`]: super::ForeignStorageBackend

use crate::error::StoreError;

/// Error type for store operations exported to Swift and Kotlin.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Error, thiserror::Error)]
pub enum SecureStoreError {
    /// Empty account or empty explicit access group.
    #[error("invalid identity: {reason}")]
    InvalidIdentity {
        /// Which part of the identity was rejected.
        reason: String,
    },

    /// The item addressed by an update or delete does not exist.
    #[error("item not found")]
    ItemNotFound,

    /// A value could not be encoded.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Stored bytes could not be decoded.
    #[error("decode failure: {0}")]
    DecodeFailure(String),

    /// The backend reported an unrecognized status.
    #[error("backend failure (status {code})")]
    BackendFailure {
        /// Raw status code.
        code: i32,
    },

    /// A host backend callback failed.
    #[error("unexpected uniffi callback error: {0}")]
    UnexpectedCallback(String),
}

impl From<StoreError> for SecureStoreError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::InvalidIdentity { reason } => Self::InvalidIdentity { reason },
            StoreError::ItemNotFound => Self::ItemNotFound,
            StoreError::InvalidEncoding(message) => Self::InvalidEncoding(message),
            StoreError::DecodeFailure(message) => Self::DecodeFailure(message),
            StoreError::BackendFailure { code } => Self::BackendFailure { code },
        }
    }
}

impl From<uniffi::UnexpectedUniFFICallbackError> for SecureStoreError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedCallback(error.reason)
    }
}
