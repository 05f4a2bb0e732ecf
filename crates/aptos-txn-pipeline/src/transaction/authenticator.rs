//! Transaction authenticators.

use crate::crypto::{Ed25519PublicKey, Ed25519Signature};
use crate::error::PipelineResult;
use serde::{Deserialize, Serialize};

/// Proof that the sender authorized a transaction's exact bytes.
///
/// Only single-key Ed25519 is produced by this crate; it is variant 0 on the
/// wire, followed by the length-prefixed public key and signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionAuthenticator {
    /// Ed25519 single-key authentication (variant 0).
    Ed25519 {
        /// The signer's public key.
        public_key: Ed25519PublicKey,
        /// Signature over the domain-prefixed raw transaction.
        signature: Ed25519Signature,
    },
}

impl TransactionAuthenticator {
    /// Creates an Ed25519 authenticator.
    pub fn ed25519(public_key: Ed25519PublicKey, signature: Ed25519Signature) -> Self {
        Self::Ed25519 {
            public_key,
            signature,
        }
    }

    /// Returns the public key carried by the authenticator.
    pub fn public_key(&self) -> &Ed25519PublicKey {
        match self {
            Self::Ed25519 { public_key, .. } => public_key,
        }
    }

    /// Checks the signature against `message`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PipelineError::SignatureVerificationFailed`] on mismatch.
    pub fn verify(&self, message: &[u8]) -> PipelineResult<()> {
        match self {
            Self::Ed25519 {
                public_key,
                signature,
            } => public_key.verify(message, signature),
        }
    }
}
