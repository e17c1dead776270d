//! Backend abstraction over the platform secure storage service.
//!
//! The scoped store never talks to the platform directly. It builds
//! [`ItemDescriptor`]s and hands them to a [`SecureStorageBackend`], which
//! performs exactly one platform call per method and reports a normalized
//! [`Outcome`].
//!
//! # Implementations
//!
//! - [`MemoryBackend`]: in-process map, for tests and embedding
//! - [`FileBackend`]: JSON document on disk, for development hosts without a
//!   keychain (not secure)
//! - `KeychainBackend`: Apple Keychain Services (`platform-apple` feature)
//! - `ForeignBackend`: bridges a backend implemented by the host app through
//!   the FFI surface (`ffi` feature)

use std::sync::Arc;

use crate::accessibility::Accessibility;
use crate::identity::{ItemDescriptor, StoreIdentity};

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

/// Apple Keychain Services backend.
#[cfg(all(feature = "platform-apple", target_vendor = "apple"))]
pub mod apple;

#[cfg(all(feature = "platform-apple", target_vendor = "apple"))]
pub use apple::KeychainBackend;

/// Status codes interpreted by this crate.
///
/// Values follow the `OSStatus` convention of Keychain Services so that codes
/// reported by the Apple backend pass through unchanged.
pub mod status {
    /// The operation completed.
    pub const SUCCESS: i32 = 0;
    /// One or more parameters were invalid (`errSecParam`).
    pub const PARAM: i32 = -50;
    /// An internal component failed (`errSecInternalComponent`).
    pub const INTERNAL_COMPONENT: i32 = -2070;
    /// The item already exists (`errSecDuplicateItem`).
    pub const DUPLICATE_ITEM: i32 = -25299;
    /// The item could not be found (`errSecItemNotFound`).
    pub const ITEM_NOT_FOUND: i32 = -25300;
    /// The data could not be decoded (`errSecDecode`).
    pub const DECODE: i32 = -26275;
}

/// Normalized result of one backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T = ()> {
    /// The call succeeded. For `fetch` this carries the stored bytes, for
    /// `enumerate` the matching keys.
    Success(T),
    /// No item matched the descriptor.
    NotFound,
    /// An item with the same descriptor already exists.
    Duplicate,
    /// Any other status reported by the platform.
    Failure(i32),
}

impl<T> Outcome<T> {
    /// Builds an outcome from a raw status code, using `value` on success.
    pub fn from_status(code: i32, value: impl FnOnce() -> T) -> Self {
        match code {
            status::SUCCESS => Self::Success(value()),
            status::ITEM_NOT_FOUND => Self::NotFound,
            status::DUPLICATE_ITEM => Self::Duplicate,
            other => Self::Failure(other),
        }
    }

    /// Returns the status code this outcome corresponds to.
    #[must_use]
    pub const fn status(&self) -> i32 {
        match self {
            Self::Success(_) => status::SUCCESS,
            Self::NotFound => status::ITEM_NOT_FOUND,
            Self::Duplicate => status::DUPLICATE_ITEM,
            Self::Failure(code) => *code,
        }
    }

    /// Returns `true` if the outcome is [`Outcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Capability interface of the platform secure storage service.
///
/// Implementations perform one synchronous call per method and must not retry.
/// Uniqueness of items is scoped to the `(account, access group, key)` triple
/// of the descriptor.
pub trait SecureStorageBackend: Send + Sync {
    /// Fetches the payload of a single item.
    ///
    /// Returns `Success(bytes)`, `NotFound` or `Failure`.
    fn fetch(&self, item: &ItemDescriptor) -> Outcome<Vec<u8>>;

    /// Adds a new item with the given payload and accessibility.
    ///
    /// Returns `Success`, `Duplicate` if the item exists, or `Failure`.
    fn add(&self, item: &ItemDescriptor, data: &[u8], accessibility: Accessibility) -> Outcome;

    /// Replaces the payload of an existing item. Never creates an item.
    ///
    /// Returns `Success`, `NotFound` or `Failure`.
    fn update(&self, item: &ItemDescriptor, data: &[u8]) -> Outcome;

    /// Deletes a single item.
    ///
    /// Returns `Success`, `NotFound` or `Failure`.
    fn delete(&self, item: &ItemDescriptor) -> Outcome;

    /// Lists the keys of every item stored under `identity`.
    ///
    /// Key order is whatever the backend reports. Returns `Success(keys)`,
    /// `NotFound` when nothing matches, or `Failure`.
    fn enumerate(&self, identity: &StoreIdentity) -> Outcome<Vec<String>>;
}

impl<B: SecureStorageBackend + ?Sized> SecureStorageBackend for Arc<B> {
    fn fetch(&self, item: &ItemDescriptor) -> Outcome<Vec<u8>> {
        (**self).fetch(item)
    }

    fn add(&self, item: &ItemDescriptor, data: &[u8], accessibility: Accessibility) -> Outcome {
        (**self).add(item, data, accessibility)
    }

    fn update(&self, item: &ItemDescriptor, data: &[u8]) -> Outcome {
        (**self).update(item, data)
    }

    fn delete(&self, item: &ItemDescriptor) -> Outcome {
        (**self).delete(item)
    }

    fn enumerate(&self, identity: &StoreIdentity) -> Outcome<Vec<String>> {
        (**self).enumerate(identity)
    }
}

impl<B: SecureStorageBackend + ?Sized> SecureStorageBackend for Box<B> {
    fn fetch(&self, item: &ItemDescriptor) -> Outcome<Vec<u8>> {
        (**self).fetch(item)
    }

    fn add(&self, item: &ItemDescriptor, data: &[u8], accessibility: Accessibility) -> Outcome {
        (**self).add(item, data, accessibility)
    }

    fn update(&self, item: &ItemDescriptor, data: &[u8]) -> Outcome {
        (**self).update(item, data)
    }

    fn delete(&self, item: &ItemDescriptor) -> Outcome {
        (**self).delete(item)
    }

    fn enumerate(&self, identity: &StoreIdentity) -> Outcome<Vec<String>> {
        (**self).enumerate(identity)
    }
}

impl<B: SecureStorageBackend + ?Sized> SecureStorageBackend for &B {
    fn fetch(&self, item: &ItemDescriptor) -> Outcome<Vec<u8>> {
        (**self).fetch(item)
    }

    fn add(&self, item: &ItemDescriptor, data: &[u8], accessibility: Accessibility) -> Outcome {
        (**self).add(item, data, accessibility)
    }

    fn update(&self, item: &ItemDescriptor, data: &[u8]) -> Outcome {
        (**self).update(item, data)
    }

    fn delete(&self, item: &ItemDescriptor) -> Outcome {
        (**self).delete(item)
    }

    fn enumerate(&self, identity: &StoreIdentity) -> Outcome<Vec<String>> {
        (**self).enumerate(identity)
    }
}
