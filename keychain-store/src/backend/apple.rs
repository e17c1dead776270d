//! Keychain Services backend for Apple platforms.
//!
//! Items are stored as generic passwords:
//!
//! | Descriptor part | Keychain attribute |
//! |---|---|
//! | account | `kSecAttrAccount` |
//! | logical key | `kSecAttrService` |
//! | access group | `kSecAttrAccessGroup` |
//! | accessibility | `kSecAttrAccessControl` protection mode (add only) |
//!
//! When no access group is set, the Keychain applies the application's default
//! group on insert and matches across every group the application can read on
//! queries.
//!
//! # Thread Safety
//!
//! The backend holds no state. Keychain calls are synchronized by the system
//! and may block, e.g. while waiting for the device to unlock.

use core_foundation::data::CFData;
use security_framework::access_control::{ProtectionMode, SecAccessControl};
use security_framework::base::Error;
use security_framework::item::{
    update_item, ItemClass, ItemSearchOptions, ItemUpdateOptions, ItemUpdateValue, Limit,
    SearchResult,
};
use security_framework::passwords::{set_generic_password_options, PasswordOptions};

use super::{status, Outcome, SecureStorageBackend};
use crate::accessibility::Accessibility;
use crate::identity::{ItemDescriptor, StoreIdentity};

/// Raw value of `kSecAttrService` in attribute dictionaries.
const SERVICE_ATTRIBUTE: &str = "svce";

/// Keychain protection mode for a policy.
///
/// The `Always` classes are deprecated by Apple and have no protection mode;
/// they fall back to the after-first-unlock classes.
const fn protection_mode(accessibility: Accessibility) -> ProtectionMode {
    match accessibility {
        Accessibility::AfterFirstUnlock | Accessibility::Always => {
            ProtectionMode::AccessibleAfterFirstUnlock
        }
        Accessibility::AfterFirstUnlockThisDeviceOnly | Accessibility::AlwaysThisDeviceOnly => {
            ProtectionMode::AccessibleAfterFirstUnlockThisDeviceOnly
        }
        Accessibility::WhenPasscodeSetThisDeviceOnly => {
            ProtectionMode::AccessibleWhenPasscodeSetThisDeviceOnly
        }
        Accessibility::WhenUnlocked => ProtectionMode::AccessibleWhenUnlocked,
        Accessibility::WhenUnlockedThisDeviceOnly => {
            ProtectionMode::AccessibleWhenUnlockedThisDeviceOnly
        }
    }
}

fn identity_search(identity: &StoreIdentity) -> ItemSearchOptions {
    let mut search = ItemSearchOptions::new();
    search
        .class(ItemClass::generic_password())
        .account(identity.account());
    if let Some(group) = identity.access_group() {
        search.access_group(group);
    }
    search
}

fn item_search(item: &ItemDescriptor) -> ItemSearchOptions {
    let mut search = identity_search(item.identity());
    search.service(item.key());
    search
}

/// Normalizes a Security framework result, logging failures.
fn outcome<T>(
    operation: &str,
    target: &dyn std::fmt::Display,
    result: Result<T, Error>,
) -> Outcome<T> {
    match result {
        Ok(value) => Outcome::Success(value),
        Err(err) => {
            let code = err.code();
            log::debug!("keychain {operation} {target}: status {code} ({err})");
            match code {
                status::ITEM_NOT_FOUND => Outcome::NotFound,
                status::DUPLICATE_ITEM => Outcome::Duplicate,
                other => Outcome::Failure(other),
            }
        }
    }
}

/// [`SecureStorageBackend`] backed by Keychain Services generic passwords.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeychainBackend;

impl KeychainBackend {
    /// Creates the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SecureStorageBackend for KeychainBackend {
    fn fetch(&self, item: &ItemDescriptor) -> Outcome<Vec<u8>> {
        let mut search = item_search(item);
        search.load_data(true).limit(Limit::Max(1));
        match outcome("fetch", item, search.search()) {
            Outcome::Success(results) => results
                .into_iter()
                .find_map(|result| match result {
                    SearchResult::Data(data) => Some(data),
                    _ => None,
                })
                .map_or(Outcome::Failure(status::DECODE), Outcome::Success),
            Outcome::NotFound => Outcome::NotFound,
            Outcome::Duplicate => Outcome::Duplicate,
            Outcome::Failure(code) => Outcome::Failure(code),
        }
    }

    /// Adds a new item.
    ///
    /// `set_generic_password_options` replaces existing items, so the item is
    /// looked up first to report `Duplicate`.
    fn add(&self, item: &ItemDescriptor, data: &[u8], accessibility: Accessibility) -> Outcome {
        let mut existing = item_search(item);
        existing.load_attributes(true).limit(Limit::Max(1));
        match outcome("add", item, existing.search()) {
            Outcome::NotFound => {}
            Outcome::Success(_) | Outcome::Duplicate => return Outcome::Duplicate,
            Outcome::Failure(code) => return Outcome::Failure(code),
        }

        let mode = protection_mode(accessibility);
        let access_control = match SecAccessControl::create_with_protection(Some(mode), 0) {
            Ok(access_control) => access_control,
            Err(err) => return outcome("add", item, Err(err)),
        };
        let mut options = PasswordOptions::new_generic_password(item.key(), item.account());
        if let Some(group) = item.access_group() {
            options.set_access_group(group);
        }
        options.set_access_control(access_control);
        outcome("add", item, set_generic_password_options(data, options))
    }

    fn update(&self, item: &ItemDescriptor, data: &[u8]) -> Outcome {
        let mut update = ItemUpdateOptions::new();
        update.set_value(ItemUpdateValue::Data(CFData::from_buffer(data)));
        outcome("update", item, update_item(&item_search(item), &update))
    }

    fn delete(&self, item: &ItemDescriptor) -> Outcome {
        outcome("delete", item, item_search(item).delete())
    }

    fn enumerate(&self, identity: &StoreIdentity) -> Outcome<Vec<String>> {
        let mut search = identity_search(identity);
        search.load_attributes(true).limit(Limit::All);
        match outcome("enumerate", identity, search.search()) {
            Outcome::Success(results) => Outcome::Success(
                results
                    .iter()
                    .filter_map(SearchResult::simplify_dict)
                    .filter_map(|mut attributes| attributes.remove(SERVICE_ATTRIBUTE))
                    .collect(),
            ),
            Outcome::NotFound => Outcome::NotFound,
            Outcome::Duplicate => Outcome::Duplicate,
            Outcome::Failure(code) => Outcome::Failure(code),
        }
    }
}
