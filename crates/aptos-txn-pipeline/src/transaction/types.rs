//! Raw and signed transactions.

use crate::crypto::{domain_prefix, signing_message, RAW_TRANSACTION_SALT, TRANSACTION_SALT};
use crate::error::PipelineResult;
use crate::transaction::authenticator::TransactionAuthenticator;
use crate::transaction::payload::TransactionPayload;
use crate::types::{AccountAddress, ChainId, HashValue};
use serde::{Deserialize, Serialize};

/// The unsigned transaction envelope.
///
/// Assembly is a pure value construction. The sequence number must match the
/// sender's on-chain counter and the expiration must be in the future when
/// the transaction reaches the network; both are checked there, not here.
///
/// Fields are encoded in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Sender's address.
    pub sender: AccountAddress,
    /// Sequence number of this transaction.
    pub sequence_number: u64,
    /// What the transaction does.
    pub payload: TransactionPayload,
    /// Maximum gas units the sender is willing to pay.
    pub max_gas_amount: u64,
    /// Price per gas unit in octas.
    pub gas_unit_price: u64,
    /// Expiration time in seconds since the Unix epoch.
    pub expiration_timestamp_secs: u64,
    /// Chain the transaction is valid on.
    pub chain_id: ChainId,
}

impl RawTransaction {
    /// Creates a new raw transaction.
    pub fn new(
        sender: AccountAddress,
        sequence_number: u64,
        payload: TransactionPayload,
        max_gas_amount: u64,
        gas_unit_price: u64,
        expiration_timestamp_secs: u64,
        chain_id: ChainId,
    ) -> Self {
        Self {
            sender,
            sequence_number,
            payload,
            max_gas_amount,
            gas_unit_price,
            expiration_timestamp_secs,
            chain_id,
        }
    }

    /// The bytes a signature over this transaction must cover:
    /// `sha3_256("APTOS::RawTransaction") ‖ bcs(self)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be encoded.
    pub fn signing_message(&self) -> PipelineResult<Vec<u8>> {
        Ok(signing_message(RAW_TRANSACTION_SALT, &self.to_bcs()?))
    }

    /// Canonically encodes this transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be encoded.
    pub fn to_bcs(&self) -> PipelineResult<Vec<u8>> {
        Ok(crate::bcs::to_bytes(self)?)
    }
}

/// A raw transaction together with its authenticator.
///
/// There is no way to modify the raw transaction of a signed one; build and
/// sign a new transaction instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    raw_txn: RawTransaction,
    authenticator: TransactionAuthenticator,
}

impl SignedTransaction {
    /// Pairs a raw transaction with an authenticator. No verification is
    /// done; see [`SignedTransaction::verify_signature`].
    pub fn new(raw_txn: RawTransaction, authenticator: TransactionAuthenticator) -> Self {
        Self {
            raw_txn,
            authenticator,
        }
    }

    /// Returns the raw transaction.
    pub fn raw_transaction(&self) -> &RawTransaction {
        &self.raw_txn
    }

    /// Returns the authenticator.
    pub fn authenticator(&self) -> &TransactionAuthenticator {
        &self.authenticator
    }

    /// Splits into the raw transaction and authenticator.
    pub fn into_parts(self) -> (RawTransaction, TransactionAuthenticator) {
        (self.raw_txn, self.authenticator)
    }

    /// Returns the sender address.
    pub fn sender(&self) -> AccountAddress {
        self.raw_txn.sender
    }

    /// Returns the sequence number.
    pub fn sequence_number(&self) -> u64 {
        self.raw_txn.sequence_number
    }

    /// Returns the expiration time in seconds since the Unix epoch.
    pub fn expiration_timestamp_secs(&self) -> u64 {
        self.raw_txn.expiration_timestamp_secs
    }

    /// Canonically encodes this transaction; these are the bytes submitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be encoded.
    pub fn to_bcs(&self) -> PipelineResult<Vec<u8>> {
        Ok(crate::bcs::to_bytes(self)?)
    }

    /// Computes the hash the network will index this transaction under:
    /// `sha3_256(sha3_256("APTOS::Transaction") ‖ 0x00 ‖ bcs(self))`, where
    /// `0x00` tags a user transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be encoded.
    pub fn hash(&self) -> PipelineResult<HashValue> {
        let prefix = domain_prefix(TRANSACTION_SALT);
        let body = self.to_bcs()?;
        Ok(HashValue::sha3_256_of([&prefix[..], &[0u8][..], &body[..]]))
    }

    /// Checks that the authenticator signs this exact raw transaction.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PipelineError::SignatureVerificationFailed`] if it does
    /// not, or an encoding error.
    pub fn verify_signature(&self) -> PipelineResult<()> {
        self.authenticator.verify(&self.raw_txn.signing_message()?)
    }
}

/// Execution details of a committed transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionInfo {
    /// The ledger version the transaction was committed at.
    pub version: u64,
    /// Whether execution succeeded.
    pub success: bool,
    /// The VM status, e.g. `Executed successfully` or a Move abort description.
    pub vm_status: String,
    /// Gas units consumed.
    pub gas_used: u64,
}
