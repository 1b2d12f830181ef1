//! Registry records and their opaque payloads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{TypesError, TypesResult};
use crate::key::validate_key;

/// Opaque record contents.
///
/// The registry stores payloads byte-for-byte; it never looks inside.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Wrap raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Encode a serializable value as a JSON payload.
    pub fn encode_json<T: Serialize>(value: &T) -> TypesResult<Self> {
        serde_json::to_vec(value)
            .map(Self)
            .map_err(|e| TypesError::Payload(e.to_string()))
    }

    /// Decode a JSON payload into `T`.
    pub fn decode_json<T: DeserializeOwned>(&self) -> TypesResult<T> {
        serde_json::from_slice(&self.0).map_err(|e| TypesError::Payload(e.to_string()))
    }

    /// The raw payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the payload, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the payload holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self(text.into_bytes())
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl AsRef<[u8]> for Payload {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A keyed registry entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier (username, attendee ID, ...).
    pub key: String,
    /// Caller-defined contents.
    pub payload: Payload,
}

impl Record {
    /// Create a record after validating its key.
    pub fn new(key: impl Into<String>, payload: impl Into<Payload>) -> TypesResult<Self> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self {
            key,
            payload: payload.into(),
        })
    }

    /// Split the record into its key and payload.
    pub fn into_parts(self) -> (String, Payload) {
        (self.key, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Attendee {
        name: String,
        event: String,
        checked_in: bool,
    }

    #[test]
    fn record_rejects_invalid_key() {
        let result = Record::new("", "payload");
        assert!(matches!(result, Err(TypesError::InvalidKey { .. })));
    }

    #[test]
    fn record_into_parts() {
        let record = Record::new("alice", "hello").unwrap();
        let (key, payload) = record.into_parts();
        assert_eq!(key, "alice");
        assert_eq!(payload.as_bytes(), b"hello");
    }

    #[test]
    fn json_payload_roundtrip() {
        let attendee = Attendee {
            name: "Alice".into(),
            event: "launch-party".into(),
            checked_in: true,
        };
        let payload = Payload::encode_json(&attendee).unwrap();
        assert!(!payload.is_empty());
        let decoded: Attendee = payload.decode_json().unwrap();
        assert_eq!(decoded, attendee);
    }

    #[test]
    fn decoding_garbage_is_payload_error() {
        let payload = Payload::new(vec![0xff, 0x00, 0x13]);
        let result: TypesResult<Attendee> = payload.decode_json();
        assert!(matches!(result, Err(TypesError::Payload(_))));
    }

    #[test]
    fn payload_conversions() {
        assert_eq!(Payload::from("abc").len(), 3);
        assert_eq!(Payload::from(&b"xy"[..]).into_bytes(), b"xy".to_vec());
        assert!(Payload::default().is_empty());
    }
}
