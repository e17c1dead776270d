//! Foreign function interface for Swift and Kotlin.

mod backend;
mod error;
mod store;

pub use backend::{ForeignBackend, ForeignOutcome, ForeignStorageBackend, ItemQuery};
pub use error::SecureStoreError;
pub use store::{SecureStore, SweepSummary};
