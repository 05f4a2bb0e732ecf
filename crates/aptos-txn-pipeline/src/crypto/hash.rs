//! SHA3-256 helpers and the domain-separation salts used for signing and
//! transaction hashing.

use crate::types::HashValue;

/// Salt whose hash prefixes every raw transaction before it is signed.
pub const RAW_TRANSACTION_SALT: &[u8] = b"APTOS::RawTransaction";

/// Salt whose hash prefixes a committed transaction when computing its hash.
pub const TRANSACTION_SALT: &[u8] = b"APTOS::Transaction";

/// Computes the SHA3-256 hash of the input.
///
/// # Example
///
/// ```rust
/// use aptos_txn_pipeline::crypto::sha3_256;
///
/// let hash = sha3_256(b"hello world");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    HashValue::sha3_256(data).to_bytes()
}

/// Returns the 32-byte prefix for a signing context: `sha3_256(salt)`.
pub fn domain_prefix(salt: &[u8]) -> [u8; 32] {
    sha3_256(salt)
}

/// Builds the exact bytes a signature covers: `sha3_256(salt) ‖ bcs_bytes`.
///
/// The message is not hashed a second time; Ed25519 signs it directly.
pub fn signing_message(salt: &[u8], bcs_bytes: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(32 + bcs_bytes.len());
    message.extend_from_slice(&domain_prefix(salt));
    message.extend_from_slice(bcs_bytes);
    message
}
