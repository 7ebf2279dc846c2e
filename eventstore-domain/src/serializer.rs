//! Serialization bridge.
//!
//! Converts domain events to/from a payload blob plus a metadata blob. This
//! crate only states the interface; upcasting and concrete event schemas
//! are the caller's concern (out of scope, per the purpose & scope section).

use crate::error::Result;

/// Which physical representation a payload/metadata blob takes.
///
/// `Bytes` is the default and is what every table column in this engine
/// actually stores; `Object` lets a caller round-trip a `serde_json::Value`
/// without manually encoding it to bytes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadDataType {
    /// Opaque bytes: the caller has already serialized the payload.
    #[default]
    Bytes,
    /// An opaque JSON object, serialized to bytes by the engine at the
    /// storage boundary.
    Object,
}

/// A payload or metadata blob in either of its two representations.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadBlob {
    /// Already-serialized opaque bytes.
    Bytes(Vec<u8>),
    /// A structured value, not yet serialized.
    Object(serde_json::Value),
}

impl PayloadBlob {
    /// Convert to the byte representation actually written to a column.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            PayloadBlob::Bytes(b) => Ok(b),
            PayloadBlob::Object(v) => {
                serde_json::to_vec(&v).map_err(|e| crate::error::EventStoreError::storage(e))
            }
        }
    }
}

/// Converts domain events to/from the payload/metadata blobs the engine
/// persists. An external collaborator: the engine only calls through this
/// trait, never inspects the bytes it stores.
pub trait Serializer: Send + Sync {
    /// The representation this serializer produces.
    fn payload_data_type(&self) -> PayloadDataType;

    /// Serialize a structured payload into the blob the engine will store.
    fn serialize(&self, value: &serde_json::Value) -> Result<Vec<u8>>;

    /// Deserialize a stored blob back into a structured payload.
    fn deserialize(&self, bytes: &[u8]) -> Result<serde_json::Value>;
}

/// A `Serializer` that stores payloads as JSON-encoded bytes. Suitable for
/// the default `payload_data_type = bytes` configuration and for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn payload_data_type(&self) -> PayloadDataType {
        PayloadDataType::Bytes
    }

    fn serialize(&self, value: &serde_json::Value) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| crate::error::EventStoreError::storage(e))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<serde_json::Value> {
        serde_json::from_slice(bytes).map_err(|e| crate::error::EventStoreError::storage(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_serializer_round_trips() {
        let s = JsonSerializer;
        let value = json!({"symbol": "ETHUSDT", "qty": 3});
        let bytes = s.serialize(&value).unwrap();
        assert_eq!(s.deserialize(&bytes).unwrap(), value);
    }

    #[test]
    fn payload_blob_bytes_passthrough() {
        let blob = PayloadBlob::Bytes(vec![1, 2, 3]);
        assert_eq!(blob.into_bytes().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn payload_blob_object_serializes() {
        let blob = PayloadBlob::Object(json!({"a": 1}));
        let bytes = blob.into_bytes().unwrap();
        assert_eq!(bytes, serde_json::to_vec(&json!({"a": 1})).unwrap());
    }
}
