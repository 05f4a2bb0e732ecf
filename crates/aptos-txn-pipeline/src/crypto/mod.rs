//! Keys, signatures and hashing for transaction signing.
//!
//! # Example
//!
//! ```rust
//! use aptos_txn_pipeline::crypto::{Ed25519PrivateKey, TransactionSigner};
//!
//! let private_key = Ed25519PrivateKey::generate();
//! let signature = private_key.sign_message(b"hello world").unwrap();
//! assert!(private_key.public_key().verify(b"hello world", &signature).is_ok());
//! ```

mod ed25519;
mod hash;
mod traits;

pub use ed25519::{
    Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature, ED25519_PRIVATE_KEY_LENGTH,
    ED25519_PUBLIC_KEY_LENGTH, ED25519_SIGNATURE_LENGTH,
};
pub use hash::{domain_prefix, sha3_256, signing_message, RAW_TRANSACTION_SALT, TRANSACTION_SALT};
pub use traits::TransactionSigner;

/// The authentication key scheme byte for Ed25519 single-key accounts.
pub const ED25519_SCHEME: u8 = 0;

/// Derives an account address from a public key and scheme byte:
/// `sha3_256(public_key ‖ scheme)`.
pub fn derive_address(public_key: &[u8], scheme: u8) -> crate::types::AccountAddress {
    let hash = crate::types::HashValue::sha3_256_of([public_key, &[scheme][..]]);
    crate::types::AccountAddress::new(hash.to_bytes())
}
