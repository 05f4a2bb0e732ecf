//! A local Ed25519 account: a private key bound to the address it signs for.

use crate::crypto::{Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature, TransactionSigner};
use crate::error::PipelineResult;
use crate::types::AccountAddress;
use std::fmt;

/// An Ed25519 account for signing transactions.
///
/// # Example
///
/// ```rust
/// use aptos_txn_pipeline::account::Ed25519Account;
/// use aptos_txn_pipeline::crypto::TransactionSigner;
///
/// let account = Ed25519Account::generate();
/// assert_eq!(account.address(), account.public_key().to_address());
/// ```
#[derive(Clone)]
pub struct Ed25519Account {
    private_key: Ed25519PrivateKey,
    public_key: Ed25519PublicKey,
    address: AccountAddress,
}

impl Ed25519Account {
    /// Generates a new random account.
    pub fn generate() -> Self {
        Self::from_private_key(Ed25519PrivateKey::generate())
    }

    /// Creates an account whose address is derived from the key.
    pub fn from_private_key(private_key: Ed25519PrivateKey) -> Self {
        let public_key = private_key.public_key();
        let address = public_key.to_address();
        Self {
            private_key,
            public_key,
            address,
        }
    }

    /// Creates an account from a private key hex string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid 32-byte hex key.
    pub fn from_private_key_hex(hex_str: &str) -> PipelineResult<Self> {
        Ok(Self::from_private_key(Ed25519PrivateKey::from_hex(hex_str)?))
    }

    /// Binds the key to an explicit address, for accounts whose
    /// authentication key has been rotated.
    pub fn with_address(mut self, address: AccountAddress) -> Self {
        self.address = address;
        self
    }

    /// Returns the account address.
    pub fn address(&self) -> AccountAddress {
        self.address
    }

    /// Returns the public key.
    pub fn public_key(&self) -> &Ed25519PublicKey {
        &self.public_key
    }

    /// Returns the private key. Handle with care.
    pub fn private_key(&self) -> &Ed25519PrivateKey {
        &self.private_key
    }
}

impl TransactionSigner for Ed25519Account {
    fn public_key(&self) -> Ed25519PublicKey {
        self.public_key
    }

    fn sign_message(&self, message: &[u8]) -> PipelineResult<Ed25519Signature> {
        Ok(self.private_key.sign(message))
    }

    fn address(&self) -> AccountAddress {
        self.address
    }
}

impl fmt::Debug for Ed25519Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Account")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}
