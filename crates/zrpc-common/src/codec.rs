//! Binary codec for schema-defined messages.
//!
//! Messages are described with `serde` derives and serialized with
//! `postcard`, which gives a compact, deterministic binary encoding.
//! Decoding tolerates trailing bytes, which matters for the caller side
//! where responses are read into a fixed-size buffer.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::protocol::error::Result;

/// Serializes a message to bytes.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>> {
    Ok(postcard::to_allocvec(message)?)
}

/// Parses a message from bytes.
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    Ok(postcard::from_bytes(data)?)
}
