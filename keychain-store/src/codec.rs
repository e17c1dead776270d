//! Codecs converting typed values to and from the stored byte sequence.

use std::fmt;
use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{StoreError, StoreResult};

/// A serialize/deserialize pair for one value type.
///
/// Encoding failures are reported as [`StoreError::InvalidEncoding`], decoding
/// failures as [`StoreError::DecodeFailure`] (or `InvalidEncoding` for text).
pub trait Codec {
    /// The type this codec reads and writes.
    type Value;

    /// Converts a value into the bytes handed to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented.
    fn encode(&self, value: &Self::Value) -> StoreResult<Vec<u8>>;

    /// Converts bytes read from the store back into a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid encoding.
    fn decode(&self, bytes: Vec<u8>) -> StoreResult<Self::Value>;
}

/// Identity codec for raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl Codec for BytesCodec {
    type Value = Vec<u8>;

    fn encode(&self, value: &Vec<u8>) -> StoreResult<Vec<u8>> {
        Ok(value.clone())
    }

    fn decode(&self, bytes: Vec<u8>) -> StoreResult<Vec<u8>> {
        Ok(bytes)
    }
}

/// UTF-8 text codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Codec;

impl Utf8Codec {
    /// Encodes borrowed text. Rust strings are always valid UTF-8, so this
    /// cannot fail.
    #[must_use]
    pub fn encode_str(value: &str) -> Vec<u8> {
        value.as_bytes().to_vec()
    }
}

impl Codec for Utf8Codec {
    type Value = String;

    fn encode(&self, value: &String) -> StoreResult<Vec<u8>> {
        Ok(Self::encode_str(value))
    }

    fn decode(&self, bytes: Vec<u8>) -> StoreResult<String> {
        String::from_utf8(bytes).map_err(|err| StoreError::InvalidEncoding(err.to_string()))
    }
}

/// JSON codec for any serde type.
pub struct JsonCodec<T>(PhantomData<fn() -> T>);

impl<T> JsonCodec<T> {
    /// Creates the codec.
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for JsonCodec<T> {}

impl<T> fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonCodec")
    }
}

impl<T: Serialize + DeserializeOwned> Codec for JsonCodec<T> {
    type Value = T;

    fn encode(&self, value: &T) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|err| StoreError::InvalidEncoding(err.to_string()))
    }

    fn decode(&self, bytes: Vec<u8>) -> StoreResult<T> {
        serde_json::from_slice(&bytes).map_err(|err| StoreError::DecodeFailure(err.to_string()))
    }
}

/// CBOR codec for any serde type. More compact than JSON for binary fields.
pub struct CborCodec<T>(PhantomData<fn() -> T>);

impl<T> CborCodec<T> {
    /// Creates the codec.
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for CborCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CborCodec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CborCodec<T> {}

impl<T> fmt::Debug for CborCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CborCodec")
    }
}

impl<T: Serialize + DeserializeOwned> Codec for CborCodec<T> {
    type Value = T;

    fn encode(&self, value: &T) -> StoreResult<Vec<u8>> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(value, &mut bytes)
            .map_err(|err| StoreError::InvalidEncoding(err.to_string()))?;
        Ok(bytes)
    }

    fn decode(&self, bytes: Vec<u8>) -> StoreResult<T> {
        ciborium::de::from_reader(bytes.as_slice())
            .map_err(|err| StoreError::DecodeFailure(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Card {
        number: String,
        cardholder: String,
    }

    fn card() -> Card {
        Card {
            number: "4111111111111111".to_string(),
            cardholder: "Me".to_string(),
        }
    }

    #[test]
    fn test_utf8_rejects_invalid_bytes() {
        let result = Utf8Codec.decode(vec![0xff, 0xfe]);
        assert!(matches!(result, Err(StoreError::InvalidEncoding(_))));
        assert_eq!(Utf8Codec.decode("héllo".as_bytes().to_vec()).expect("decode"), "héllo");
    }

    #[test]
    fn test_json_matches_field_layout() {
        let bytes = JsonCodec::<Card>::new().encode(&card()).expect("encode");
        assert_eq!(
            String::from_utf8(bytes).expect("utf8"),
            r#"{"number":"4111111111111111","cardholder":"Me"}"#
        );
    }

    #[test]
    fn test_json_decode_failure() {
        let result = JsonCodec::<Card>::new().decode(b"{\"number\":".to_vec());
        assert!(matches!(result, Err(StoreError::DecodeFailure(_))));
    }

    #[test]
    fn test_cbor_round_trip_and_failure() {
        let codec = CborCodec::<Card>::new();
        let bytes = codec.encode(&card()).expect("encode");
        assert_eq!(codec.decode(bytes.clone()).expect("decode"), card());

        let truncated = bytes[..bytes.len() / 2].to_vec();
        assert!(matches!(
            codec.decode(truncated),
            Err(StoreError::DecodeFailure(_))
        ));
    }
}
