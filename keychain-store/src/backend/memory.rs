//! In-memory backend.
//!
//! This backend is NOT secure. It exists so the store and its views can be
//! exercised without a platform keychain, and so hosts can embed an ephemeral
//! store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{status, Outcome, SecureStorageBackend};
use crate::accessibility::Accessibility;
use crate::identity::{ItemDescriptor, StoreIdentity};

#[derive(Debug, Clone)]
struct Entry {
    data: Vec<u8>,
    accessibility: Accessibility,
}

/// Thread-safe in-memory backend keyed by [`ItemDescriptor`].
///
/// Lookups match the full descriptor, so an identity without an access group
/// never sees items written under a group. Enumeration reports keys in
/// lexicographic order.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: RwLock<BTreeMap<ItemDescriptor, Entry>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored items across all identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().map_or(0, |items| items.len())
    }

    /// Returns `true` if no items are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every item.
    pub fn clear(&self) {
        if let Ok(mut items) = self.items.write() {
            items.clear();
        }
    }

    /// Returns the accessibility recorded when the item was first added.
    #[must_use]
    pub fn accessibility_of(&self, item: &ItemDescriptor) -> Option<Accessibility> {
        self.items
            .read()
            .ok()?
            .get(item)
            .map(|entry| entry.accessibility)
    }
}

impl SecureStorageBackend for MemoryBackend {
    fn fetch(&self, item: &ItemDescriptor) -> Outcome<Vec<u8>> {
        let Ok(items) = self.items.read() else {
            return Outcome::Failure(status::INTERNAL_COMPONENT);
        };
        items
            .get(item)
            .map_or(Outcome::NotFound, |entry| Outcome::Success(entry.data.clone()))
    }

    fn add(&self, item: &ItemDescriptor, data: &[u8], accessibility: Accessibility) -> Outcome {
        let Ok(mut items) = self.items.write() else {
            return Outcome::Failure(status::INTERNAL_COMPONENT);
        };
        if items.contains_key(item) {
            return Outcome::Duplicate;
        }
        items.insert(
            item.clone(),
            Entry {
                data: data.to_vec(),
                accessibility,
            },
        );
        Outcome::Success(())
    }

    fn update(&self, item: &ItemDescriptor, data: &[u8]) -> Outcome {
        let Ok(mut items) = self.items.write() else {
            return Outcome::Failure(status::INTERNAL_COMPONENT);
        };
        match items.get_mut(item) {
            Some(entry) => {
                entry.data = data.to_vec();
                Outcome::Success(())
            }
            None => Outcome::NotFound,
        }
    }

    fn delete(&self, item: &ItemDescriptor) -> Outcome {
        let Ok(mut items) = self.items.write() else {
            return Outcome::Failure(status::INTERNAL_COMPONENT);
        };
        match items.remove(item) {
            Some(_) => Outcome::Success(()),
            None => Outcome::NotFound,
        }
    }

    fn enumerate(&self, identity: &StoreIdentity) -> Outcome<Vec<String>> {
        let Ok(items) = self.items.read() else {
            return Outcome::Failure(status::INTERNAL_COMPONENT);
        };
        let keys: Vec<String> = items
            .keys()
            .filter(|item| item.identity() == identity)
            .map(|item| item.key().to_string())
            .collect();
        if keys.is_empty() {
            Outcome::NotFound
        } else {
            Outcome::Success(keys)
        }
    }
}
