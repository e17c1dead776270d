//! Common test utilities shared across integration tests.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use keychain_store::backend::{status, MemoryBackend};
use keychain_store::{
    Accessibility, ItemDescriptor, KeychainStore, Outcome, SecureStorageBackend, StoreIdentity,
};

/// Wraps [`MemoryBackend`] and injects failures on demand.
#[derive(Debug, Default)]
pub struct FaultyBackend {
    inner: MemoryBackend,
    failing_deletes: Mutex<BTreeSet<String>>,
    fail_enumerate: AtomicBool,
    fetch_status: Mutex<Option<i32>>,
    duplicate_on_update: AtomicBool,
    calls: AtomicUsize,
}

#[allow(dead_code, reason = "used in tests")]
impl FaultyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn inner(&self) -> &MemoryBackend {
        &self.inner
    }

    /// Deleting `key` reports an interaction-not-allowed style failure.
    pub fn fail_delete_of(&self, key: &str) {
        self.failing_deletes
            .lock()
            .expect("lock")
            .insert(key.to_string());
    }

    pub fn fail_enumerate(&self) {
        self.fail_enumerate.store(true, Ordering::SeqCst);
    }

    pub fn fail_fetch_with(&self, code: i32) {
        *self.fetch_status.lock().expect("lock") = Some(code);
    }

    pub fn duplicate_on_update(&self) {
        self.duplicate_on_update.store(true, Ordering::SeqCst);
    }

    /// Number of backend calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Status returned for injected delete failures.
pub const INTERACTION_NOT_ALLOWED: i32 = -25308;

impl SecureStorageBackend for FaultyBackend {
    fn fetch(&self, item: &ItemDescriptor) -> Outcome<Vec<u8>> {
        self.record_call();
        if let Some(code) = *self.fetch_status.lock().expect("lock") {
            return Outcome::Failure(code);
        }
        self.inner.fetch(item)
    }

    fn add(&self, item: &ItemDescriptor, data: &[u8], accessibility: Accessibility) -> Outcome {
        self.record_call();
        self.inner.add(item, data, accessibility)
    }

    fn update(&self, item: &ItemDescriptor, data: &[u8]) -> Outcome {
        self.record_call();
        if self.duplicate_on_update.load(Ordering::SeqCst) {
            return Outcome::Duplicate;
        }
        self.inner.update(item, data)
    }

    fn delete(&self, item: &ItemDescriptor) -> Outcome {
        self.record_call();
        if self.failing_deletes.lock().expect("lock").contains(item.key()) {
            return Outcome::Failure(INTERACTION_NOT_ALLOWED);
        }
        self.inner.delete(item)
    }

    fn enumerate(&self, identity: &StoreIdentity) -> Outcome<Vec<String>> {
        self.record_call();
        if self.fail_enumerate.load(Ordering::SeqCst) {
            return Outcome::Failure(status::INTERNAL_COMPONENT);
        }
        self.inner.enumerate(identity)
    }
}

#[allow(dead_code, reason = "used in tests")]
pub fn store_for<B: SecureStorageBackend>(
    backend: B,
    account: &str,
    access_group: Option<&str>,
) -> KeychainStore<B> {
    KeychainStore::new(backend, account, access_group.map(str::to_string)).expect("store")
}

#[allow(dead_code, reason = "used in tests")]
pub fn sorted(mut keys: Vec<String>) -> Vec<String> {
    keys.sort();
    keys
}
