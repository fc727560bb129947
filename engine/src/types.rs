//! Primitive types shared by every component of the engine.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, EngineResult};

type Blake2b256 = Blake2b<U32>;

/// Block height on the chain
pub type BlockNumber = u64;

/// Account address in its SS58 textual form
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap an address string
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Borrow the textual address
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for Address {
    fn from(address: String) -> Self {
        Self(address)
    }
}

/// BLAKE2b-256 hash of an encoded call, rendered as `0x`-prefixed hex
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallHash([u8; 32]);

impl CallHash {
    /// Wrap raw hash bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash encoded call bytes
    pub fn of(call: &[u8]) -> Self {
        let digest = Blake2b256::digest(call);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Raw hash bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CallHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for CallHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallHash({})", self)
    }
}

impl FromStr for CallHash {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let decoded =
            hex::decode(raw).map_err(|e| EngineError::InvalidCallHash(format!("{}: {}", s, e)))?;
        let bytes: [u8; 32] = decoded.try_into().map_err(|v: Vec<u8>| {
            EngineError::InvalidCallHash(format!("expected 32 bytes, got {}", v.len()))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for CallHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CallHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Encoded call bytes, carried as `0x`-prefixed hex on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallData(Vec<u8>);

impl CallData {
    /// Wrap encoded call bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Borrow the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Hash of the encoded call
    pub fn hash(&self) -> CallHash {
        CallHash::of(&self.0)
    }
}

impl Serialize for CallData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(&self.0)))
    }
}

impl<'de> Deserialize<'de> for CallData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let raw = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(raw).map(Self).map_err(serde::de::Error::custom)
    }
}

/// Check that call bytes supplied out-of-band hash to the expected value
pub fn verify_call(call: &[u8], expected: &CallHash) -> EngineResult<()> {
    let actual = CallHash::of(call);
    if actual != *expected {
        return Err(EngineError::CallHashMismatch {
            expected: *expected,
            actual,
        });
    }
    Ok(())
}
