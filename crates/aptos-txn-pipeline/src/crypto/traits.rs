//! The signing capability consumed by the transaction pipeline.

use crate::crypto::{Ed25519PublicKey, Ed25519Signature};
use crate::error::PipelineResult;
use crate::types::AccountAddress;

/// An opaque capability that can sign arbitrary bytes.
///
/// The pipeline never sees private key material: it hands the signer the
/// domain-prefixed transaction bytes and packages the returned signature
/// with [`TransactionSigner::public_key`]. Implementations backed by remote
/// key stores report their failures through [`crate::PipelineError::Signing`].
pub trait TransactionSigner: Send + Sync {
    /// Returns the public key that verifies this signer's signatures.
    fn public_key(&self) -> Ed25519PublicKey;

    /// Signs `message` as given.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unavailable or cannot produce a
    /// signature.
    fn sign_message(&self, message: &[u8]) -> PipelineResult<Ed25519Signature>;

    /// Returns the account this signer acts for. Defaults to the address
    /// derived from the public key, which is wrong for rotated accounts.
    fn address(&self) -> AccountAddress {
        self.public_key().to_address()
    }
}
