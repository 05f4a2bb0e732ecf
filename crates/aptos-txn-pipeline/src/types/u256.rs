//! 256-bit unsigned integer argument value.

use crate::error::{PipelineError, PipelineResult};
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A Move `u256` value.
///
/// Stored as 32 little-endian bytes, which is also its canonical encoding:
/// fixed width, no length prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct U256([u8; 32]);

impl U256 {
    /// Zero.
    pub const ZERO: Self = Self([0u8; 32]);

    /// The largest representable value, 2^256 - 1.
    pub const MAX: Self = Self([0xff; 32]);

    /// Creates a value from its little-endian byte representation.
    pub const fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the little-endian byte representation.
    pub const fn to_le_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Widens a `u128`.
    pub fn from_u128(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..16].copy_from_slice(&value.to_le_bytes());
        Self(bytes)
    }

    /// Parses a base-10 string.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidArgument`] if the string is not a
    /// decimal number or does not fit in 256 bits.
    pub fn from_dec_str(s: &str) -> PipelineResult<Self> {
        let value = BigUint::parse_bytes(s.as_bytes(), 10).ok_or_else(|| {
            PipelineError::InvalidArgument(format!("`{s}` is not a decimal u256"))
        })?;
        let le = value.to_bytes_le();
        if le.len() > 32 {
            return Err(PipelineError::InvalidArgument(format!(
                "`{s}` does not fit in u256"
            )));
        }
        let mut bytes = [0u8; 32];
        bytes[..le.len()].copy_from_slice(&le);
        Ok(Self(bytes))
    }

    fn to_biguint(self) -> BigUint {
        BigUint::from_bytes_le(&self.0)
    }
}

impl From<u128> for U256 {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl From<u64> for U256 {
    fn from(value: u64) -> Self {
        Self::from_u128(u128::from(value))
    }
}

impl FromStr for U256 {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dec_str(s)
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_biguint())
    }
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U256({self})")
    }
}

impl Serialize for U256 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for U256 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_dec_str(&s).map_err(serde::de::Error::custom)
        } else {
            Ok(Self(<[u8; 32]>::deserialize(deserializer)?))
        }
    }
}
