//! Typed views over a [`KeychainStore`].
//!
//! A view borrows one store and applies a [`Codec`] on the way in and out.
//! Upsert, scoping and error mapping stay in the store, so every view shares
//! the same identity and policy.

use serde::{de::DeserializeOwned, Serialize};

use crate::accessibility::Accessibility;
use crate::backend::SecureStorageBackend;
use crate::codec::{BytesCodec, CborCodec, Codec, JsonCodec, Utf8Codec};
use crate::error::StoreResult;
use crate::store::{KeychainStore, SweepReport};

/// Raw byte view.
pub type BytesView<'a, B> = TypedView<'a, B, BytesCodec>;
/// UTF-8 text view.
pub type TextView<'a, B> = TypedView<'a, B, Utf8Codec>;
/// Structured view using JSON.
pub type ValueView<'a, B, T> = TypedView<'a, B, JsonCodec<T>>;
/// Structured view using CBOR.
pub type CborView<'a, B, T> = TypedView<'a, B, CborCodec<T>>;

impl<B: SecureStorageBackend> KeychainStore<B> {
    /// Returns the raw byte view.
    #[must_use]
    pub const fn bytes(&self) -> BytesView<'_, B> {
        TypedView::new(self, BytesCodec)
    }

    /// Returns the text view.
    #[must_use]
    pub const fn strings(&self) -> TextView<'_, B> {
        TypedView::new(self, Utf8Codec)
    }

    /// Returns a structured view storing `T` as JSON.
    #[must_use]
    pub const fn values<T: Serialize + DeserializeOwned>(&self) -> ValueView<'_, B, T> {
        TypedView::new(self, JsonCodec::new())
    }

    /// Returns a view using an arbitrary codec.
    #[must_use]
    pub fn view_with<C: Codec>(&self, codec: C) -> TypedView<'_, B, C> {
        TypedView::new(self, codec)
    }
}

/// A store view that encodes and decodes values with codec `C`.
#[derive(Debug)]
pub struct TypedView<'a, B, C> {
    store: &'a KeychainStore<B>,
    codec: C,
}

impl<'a, B, C> TypedView<'a, B, C> {
    /// Wraps `store` with `codec`.
    #[must_use]
    pub const fn new(store: &'a KeychainStore<B>, codec: C) -> Self {
        Self { store, codec }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &'a KeychainStore<B> {
        self.store
    }

    /// Returns the codec.
    #[must_use]
    pub const fn codec(&self) -> &C {
        &self.codec
    }
}

impl<B: SecureStorageBackend, C: Codec> TypedView<'_, B, C> {
    /// Reads and decodes the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns the store's read errors, and the codec's decode error if the
    /// stored bytes are not a valid encoding.
    pub fn get_value(&self, key: &str) -> StoreResult<Option<C::Value>> {
        self.store
            .get(key)?
            .map(|bytes| self.codec.decode(bytes))
            .transpose()
    }

    /// Encodes and stores `value` with the store's default accessibility.
    ///
    /// # Errors
    ///
    /// Returns the codec's encode error or the store's write errors.
    pub fn set_value(&self, key: &str, value: &C::Value) -> StoreResult<()> {
        self.set_value_with_accessibility(key, value, self.store.default_accessibility())
    }

    /// Encodes and stores `value`, applying `accessibility` on first insertion.
    ///
    /// # Errors
    ///
    /// Returns the codec's encode error or the store's write errors.
    pub fn set_value_with_accessibility(
        &self,
        key: &str,
        value: &C::Value,
        accessibility: Accessibility,
    ) -> StoreResult<()> {
        let bytes = self.codec.encode(value)?;
        self.store.set_with_accessibility(key, &bytes, accessibility)
    }

    /// Encodes `value` and replaces an existing item.
    ///
    /// # Errors
    ///
    /// Returns the codec's encode error, or
    /// [`StoreError::ItemNotFound`](crate::StoreError::ItemNotFound) if the
    /// item does not exist.
    pub fn update_value(&self, key: &str, value: &C::Value) -> StoreResult<()> {
        let bytes = self.codec.encode(value)?;
        self.store.update(key, &bytes)
    }

    /// Returns whether an item exists under `key`.
    ///
    /// # Errors
    ///
    /// Returns the store's read errors.
    pub fn has_key(&self, key: &str) -> StoreResult<bool> {
        self.store.has_key(key)
    }

    /// Deletes the item stored under `key`.
    ///
    /// # Errors
    ///
    /// See [`KeychainStore::delete`].
    pub fn delete(&self, key: &str) -> StoreResult<()> {
        self.store.delete(key)
    }

    /// Lists the keys of the underlying store.
    ///
    /// # Errors
    ///
    /// See [`KeychainStore::all_keys`].
    pub fn all_keys(&self) -> StoreResult<Vec<String>> {
        self.store.all_keys()
    }

    /// Deletes every item of the underlying store.
    ///
    /// # Errors
    ///
    /// See [`KeychainStore::delete_all`].
    pub fn delete_all(&self) -> StoreResult<SweepReport> {
        self.store.delete_all()
    }
}

impl<B: SecureStorageBackend> TypedView<'_, B, BytesCodec> {
    /// Reads raw bytes. Same as [`KeychainStore::get`].
    ///
    /// # Errors
    ///
    /// See [`KeychainStore::get`].
    pub fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.store.get(key)
    }

    /// Stores raw bytes. Same as [`KeychainStore::set_with_accessibility`].
    ///
    /// # Errors
    ///
    /// See [`KeychainStore::set_with_accessibility`].
    pub fn set(&self, key: &str, data: &[u8], accessibility: Accessibility) -> StoreResult<()> {
        self.store.set_with_accessibility(key, data, accessibility)
    }

    /// Replaces raw bytes. Same as [`KeychainStore::update`].
    ///
    /// # Errors
    ///
    /// See [`KeychainStore::update`].
    pub fn update(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        self.store.update(key, data)
    }
}

impl<B: SecureStorageBackend> TypedView<'_, B, Utf8Codec> {
    /// Reads text stored under `key`.
    ///
    /// Returns `None` when the item is absent or its bytes are not valid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns the store's read errors.
    pub fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.store.get(key)?.and_then(|bytes| {
            self.codec
                .decode(bytes)
                .map_err(|err| log::debug!("{key} is not valid text: {err}"))
                .ok()
        }))
    }

    /// Stores text with the store's default accessibility.
    ///
    /// # Errors
    ///
    /// Returns the store's write errors.
    pub fn set_string(&self, key: &str, value: &str) -> StoreResult<()> {
        self.set_string_with_accessibility(key, value, self.store.default_accessibility())
    }

    /// Stores text, applying `accessibility` on first insertion.
    ///
    /// # Errors
    ///
    /// Returns the store's write errors.
    pub fn set_string_with_accessibility(
        &self,
        key: &str,
        value: &str,
        accessibility: Accessibility,
    ) -> StoreResult<()> {
        self.store
            .set_with_accessibility(key, &Utf8Codec::encode_str(value), accessibility)
    }

    /// Replaces the text of an existing item.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ItemNotFound`](crate::StoreError::ItemNotFound)
    /// if the item does not exist.
    pub fn update_string(&self, key: &str, value: &str) -> StoreResult<()> {
        self.store.update(key, &Utf8Codec::encode_str(value))
    }
}
