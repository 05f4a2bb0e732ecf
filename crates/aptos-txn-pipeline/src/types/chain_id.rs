//! Chain identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the network a transaction is valid on, preventing a signed
/// transaction from being replayed on another chain.
///
/// Encoded in BCS as a single byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u8);

impl ChainId {
    /// Creates a chain id from its numeric value.
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    pub const fn id(&self) -> u8 {
        self.0
    }

    /// Aptos mainnet.
    pub const fn mainnet() -> Self {
        Self(1)
    }

    /// Aptos testnet.
    pub const fn testnet() -> Self {
        Self(2)
    }

    /// A local development network.
    pub const fn local() -> Self {
        Self(4)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for ChainId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}
