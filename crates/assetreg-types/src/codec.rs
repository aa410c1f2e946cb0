//! JSON encoding of asset records.
//!
//! The encoded bytes are the only representation of an asset kept in world
//! state, so encoding must be total and decoding must return exactly the
//! record that was encoded.

use crate::asset::AssetRecord;
use crate::error::TypeError;

/// Encode a record into the bytes stored under its key.
pub fn encode_record<A: AssetRecord>(record: &A) -> Result<Vec<u8>, TypeError> {
    serde_json::to_vec(record).map_err(|e| TypeError::Encode(e.to_string()))
}

/// Decode stored bytes back into a record.
pub fn decode_record<A: AssetRecord>(bytes: &[u8]) -> Result<A, TypeError> {
    serde_json::from_slice(bytes).map_err(|e| TypeError::Decode(e.to_string()))
}
