//! Ed25519 keys and signatures.

use crate::crypto::traits::TransactionSigner;
use crate::error::{PipelineError, PipelineResult};
use crate::types::AccountAddress;
use ed25519_dalek::Signer as DalekSigner;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// Ed25519 private key length in bytes.
pub const ED25519_PRIVATE_KEY_LENGTH: usize = 32;
/// Ed25519 public key length in bytes.
pub const ED25519_PUBLIC_KEY_LENGTH: usize = 32;
/// Ed25519 signature length in bytes.
pub const ED25519_SIGNATURE_LENGTH: usize = 64;

fn decode_hex(hex_str: &str) -> PipelineResult<Zeroizing<Vec<u8>>> {
    let digits = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    Ok(Zeroizing::new(hex::decode(digits)?))
}

/// An Ed25519 private key.
///
/// The key material is wiped from memory when the key is dropped, and the
/// `Debug` output is redacted.
///
/// # Example
///
/// ```rust
/// use aptos_txn_pipeline::crypto::Ed25519PrivateKey;
///
/// let private_key = Ed25519PrivateKey::generate();
/// let signature = private_key.sign(b"hello");
/// assert!(private_key.public_key().verify(b"hello", &signature).is_ok());
/// ```
#[derive(Clone)]
pub struct Ed25519PrivateKey {
    inner: ed25519_dalek::SigningKey,
}

impl Ed25519PrivateKey {
    /// Generates a new random private key from the OS random number generator.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            inner: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Creates a private key from its 32-byte seed.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidPrivateKey`] if `bytes` is not 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> PipelineResult<Self> {
        let seed: &[u8; ED25519_PRIVATE_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            PipelineError::InvalidPrivateKey(format!(
                "expected {ED25519_PRIVATE_KEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self {
            inner: ed25519_dalek::SigningKey::from_bytes(seed),
        })
    }

    /// Creates a private key from a hex string, with or without `0x`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not hex or does not decode to 32 bytes.
    pub fn from_hex(hex_str: &str) -> PipelineResult<Self> {
        let bytes = decode_hex(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Returns a copy of the seed that is wiped when dropped.
    pub fn to_bytes(&self) -> Zeroizing<[u8; ED25519_PRIVATE_KEY_LENGTH]> {
        Zeroizing::new(self.inner.to_bytes())
    }

    /// Returns the corresponding public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey {
            inner: self.inner.verifying_key(),
        }
    }

    /// Signs a message.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature {
            inner: self.inner.sign(message),
        }
    }
}

impl TransactionSigner for Ed25519PrivateKey {
    fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PrivateKey::public_key(self)
    }

    fn sign_message(&self, message: &[u8]) -> PipelineResult<Ed25519Signature> {
        Ok(self.sign(message))
    }
}

impl fmt::Debug for Ed25519PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519PrivateKey([REDACTED])")
    }
}

/// An Ed25519 public key.
///
/// Encoded canonically as a length-prefixed 32-byte string.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519PublicKey {
    inner: ed25519_dalek::VerifyingKey,
}

impl Ed25519PublicKey {
    /// Creates a public key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidPublicKey`] if `bytes` is not 32 bytes
    /// or is not a valid curve point.
    pub fn from_bytes(bytes: &[u8]) -> PipelineResult<Self> {
        let key: &[u8; ED25519_PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            PipelineError::InvalidPublicKey(format!(
                "expected {ED25519_PUBLIC_KEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        let inner = ed25519_dalek::VerifyingKey::from_bytes(key)
            .map_err(|e| PipelineError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Creates a public key from a hex string, with or without `0x`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not hex or not a valid key.
    pub fn from_hex(hex_str: &str) -> PipelineResult<Self> {
        let digits = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        Self::from_bytes(&hex::decode(digits)?)
    }

    /// Returns the public key as bytes.
    pub fn to_bytes(&self) -> [u8; ED25519_PUBLIC_KEY_LENGTH] {
        self.inner.to_bytes()
    }

    /// Returns the public key as a hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.inner.to_bytes()))
    }

    /// Verifies a signature against a message.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SignatureVerificationFailed`] if the signature
    /// does not match.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> PipelineResult<()> {
        self.inner
            .verify_strict(message, &signature.inner)
            .map_err(|_| PipelineError::SignatureVerificationFailed)
    }

    /// Derives the account address of a single-key Ed25519 account:
    /// `sha3_256(public_key ‖ 0x00)`.
    pub fn to_address(&self) -> AccountAddress {
        crate::crypto::derive_address(&self.to_bytes(), crate::crypto::ED25519_SCHEME)
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.inner.to_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = serde_bytes::ByteBuf::deserialize(deserializer)?;
            Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
        }
    }
}

/// An Ed25519 signature.
///
/// Encoded canonically as a length-prefixed 64-byte string.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature {
    inner: ed25519_dalek::Signature,
}

impl Ed25519Signature {
    /// Creates a signature from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidSignature`] if `bytes` is not 64 bytes.
    pub fn from_bytes(bytes: &[u8]) -> PipelineResult<Self> {
        if bytes.len() != ED25519_SIGNATURE_LENGTH {
            return Err(PipelineError::InvalidSignature(format!(
                "expected {ED25519_SIGNATURE_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }
        let inner = ed25519_dalek::Signature::from_slice(bytes)
            .map_err(|e| PipelineError::InvalidSignature(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Returns the signature as bytes.
    pub fn to_bytes(&self) -> [u8; ED25519_SIGNATURE_LENGTH] {
        self.inner.to_bytes()
    }

    /// Returns the signature as a hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.inner.to_bytes()))
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Signature({})", self.to_hex())
    }
}

impl fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.inner.to_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            let digits = s.strip_prefix("0x").unwrap_or(&s);
            let bytes = hex::decode(digits).map_err(serde::de::Error::custom)?;
            Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
        } else {
            let bytes = serde_bytes::ByteBuf::deserialize(deserializer)?;
            Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
        }
    }
}
