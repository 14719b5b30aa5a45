//! Canonical lookup key for a [`FaceVector`].
//!
//! Each component is written as its IEEE-754 bit pattern (8 bytes,
//! little-endian) and the byte string is hex-encoded in lowercase. The
//! encoding is lossless, so `decode(encode(v)) == v` bit for bit, and it is
//! canonical: any string `decode` accepts re-encodes to itself.

use crate::domain::error::DomainError;
use crate::domain::values::face_vector::FaceVector;
use serde::Serialize;
use std::fmt;

const COMPONENT_BYTES: usize = std::mem::size_of::<f64>();

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SerializedKey(String);

impl SerializedKey {
    pub fn encode(vector: &FaceVector) -> Self {
        let bytes: Vec<u8> = vector
            .as_slice()
            .iter()
            .flat_map(|c| c.to_le_bytes())
            .collect();
        SerializedKey(hex::encode(bytes))
    }

    pub fn decode(&self) -> Result<FaceVector, DomainError> {
        decode_str(&self.0)
    }

    /// Parses a key read from outside (snapshot, CLI) and checks it is canonical.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        decode_str(raw)?;
        Ok(SerializedKey(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

fn decode_str(raw: &str) -> Result<FaceVector, DomainError> {
    if raw.is_empty() {
        return Err(DomainError::MalformedKey("empty key".into()));
    }
    if !raw.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(DomainError::MalformedKey(
            "key must be lowercase hexadecimal".into(),
        ));
    }
    let bytes = hex::decode(raw).map_err(|e| DomainError::MalformedKey(e.to_string()))?;
    if bytes.len() % COMPONENT_BYTES != 0 {
        return Err(DomainError::MalformedKey(format!(
            "key length {} is not a whole number of components",
            raw.len()
        )));
    }
    let components: Vec<f64> = bytes
        .chunks_exact(COMPONENT_BYTES)
        .map(|chunk| {
            let mut buf = [0u8; COMPONENT_BYTES];
            buf.copy_from_slice(chunk);
            f64::from_le_bytes(buf)
        })
        .collect();
    FaceVector::new(components).map_err(DomainError::MalformedKey)
}

impl fmt::Display for SerializedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
