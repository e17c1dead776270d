#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
//! Scoped secure key/value storage over the platform keychain.
//!
//! A [`KeychainStore`] is bound to one account and, optionally, one access
//! group. Every item it reads or writes is addressed by that scope plus a
//! logical key, so stores with different scopes never see each other's items.
//!
//! ```
//! use keychain_store::{backend::MemoryBackend, KeychainStore};
//!
//! let store = KeychainStore::new(MemoryBackend::new(), "alice", None)?;
//! store.strings().set_string("pin", "1234")?;
//! assert_eq!(store.strings().get_string("pin")?, Some("1234".to_string()));
//! assert_eq!(store.all_keys()?, vec!["pin".to_string()]);
//! # Ok::<(), keychain_store::StoreError>(())
//! ```

mod accessibility;
pub use accessibility::*;

pub mod backend;
pub use backend::{Outcome, SecureStorageBackend};

mod codec;
pub use codec::*;

mod config;
pub use config::*;

mod error;
pub use error::*;

mod identity;
pub use identity::*;

mod store;
pub use store::*;

mod view;
pub use view::*;

#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
pub mod logger;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!("keychain_store");
