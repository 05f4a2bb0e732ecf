//! Raw transaction assembly and signing.

use crate::crypto::TransactionSigner;
use crate::error::{PipelineError, PipelineResult};
use crate::transaction::authenticator::TransactionAuthenticator;
use crate::transaction::payload::TransactionPayload;
use crate::transaction::types::{RawTransaction, SignedTransaction};
use crate::types::{AccountAddress, ChainId};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default maximum gas amount.
pub const DEFAULT_MAX_GAS_AMOUNT: u64 = 200_000;

/// Default gas unit price in octas.
pub const DEFAULT_GAS_UNIT_PRICE: u64 = 100;

/// Default lifetime of a transaction, in seconds from assembly.
pub const DEFAULT_EXPIRATION_SECONDS: u64 = 600;

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Builder for [`RawTransaction`].
///
/// Sender, sequence number, payload and chain id are required. Gas defaults
/// to 200 000 units at 100 octas and the expiration to ten minutes from
/// [`TransactionBuilder::build`].
///
/// # Example
///
/// ```rust
/// use aptos_txn_pipeline::transaction::{EntryFunction, TransactionBuilder};
/// use aptos_txn_pipeline::types::{AccountAddress, ChainId};
///
/// let raw = TransactionBuilder::new()
///     .sender(AccountAddress::from_hex("0xa11ce").unwrap())
///     .sequence_number(5)
///     .payload(EntryFunction::apt_transfer(AccountAddress::ONE, 717).unwrap().into())
///     .max_gas_amount(1_000_000)
///     .gas_unit_price(1)
///     .expiration_from_now(10)
///     .chain_id(ChainId::new(4))
///     .build()
///     .unwrap();
/// assert_eq!(raw.sequence_number, 5);
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    sender: Option<AccountAddress>,
    sequence_number: Option<u64>,
    payload: Option<TransactionPayload>,
    max_gas_amount: u64,
    gas_unit_price: u64,
    expiration_timestamp_secs: Option<u64>,
    chain_id: Option<ChainId>,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuilder {
    /// Creates a builder with default gas settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sender: None,
            sequence_number: None,
            payload: None,
            max_gas_amount: DEFAULT_MAX_GAS_AMOUNT,
            gas_unit_price: DEFAULT_GAS_UNIT_PRICE,
            expiration_timestamp_secs: None,
            chain_id: None,
        }
    }

    /// Sets the sender.
    #[must_use]
    pub fn sender(mut self, sender: AccountAddress) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Sets the sequence number, normally just read from the network.
    #[must_use]
    pub fn sequence_number(mut self, sequence_number: u64) -> Self {
        self.sequence_number = Some(sequence_number);
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn payload(mut self, payload: TransactionPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Sets the maximum gas amount.
    #[must_use]
    pub fn max_gas_amount(mut self, max_gas_amount: u64) -> Self {
        self.max_gas_amount = max_gas_amount;
        self
    }

    /// Sets the gas unit price.
    #[must_use]
    pub fn gas_unit_price(mut self, gas_unit_price: u64) -> Self {
        self.gas_unit_price = gas_unit_price;
        self
    }

    /// Sets an absolute expiration in seconds since the Unix epoch.
    #[must_use]
    pub fn expiration_timestamp_secs(mut self, expiration_timestamp_secs: u64) -> Self {
        self.expiration_timestamp_secs = Some(expiration_timestamp_secs);
        self
    }

    /// Sets the expiration to `seconds` from now.
    #[must_use]
    pub fn expiration_from_now(mut self, seconds: u64) -> Self {
        self.expiration_timestamp_secs = Some(now_secs().saturating_add(seconds));
        self
    }

    /// Sets the chain id.
    #[must_use]
    pub fn chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Assembles the raw transaction. No network access.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Transaction`] if a required field is missing
    /// or the expiration is not in the future.
    pub fn build(self) -> PipelineResult<RawTransaction> {
        let sender = self
            .sender
            .ok_or_else(|| PipelineError::transaction("sender is required"))?;
        let sequence_number = self
            .sequence_number
            .ok_or_else(|| PipelineError::transaction("sequence_number is required"))?;
        let payload = self
            .payload
            .ok_or_else(|| PipelineError::transaction("payload is required"))?;
        let chain_id = self
            .chain_id
            .ok_or_else(|| PipelineError::transaction("chain_id is required"))?;

        let now = now_secs();
        let expiration_timestamp_secs = self
            .expiration_timestamp_secs
            .unwrap_or_else(|| now.saturating_add(DEFAULT_EXPIRATION_SECONDS));
        if expiration_timestamp_secs <= now {
            return Err(PipelineError::transaction(format!(
                "expiration {expiration_timestamp_secs} is not after the current time {now}"
            )));
        }

        Ok(RawTransaction::new(
            sender,
            sequence_number,
            payload,
            self.max_gas_amount,
            self.gas_unit_price,
            expiration_timestamp_secs,
            chain_id,
        ))
    }
}

/// Signs a raw transaction.
///
/// The signer is handed `sha3_256("APTOS::RawTransaction") ‖ bcs(raw)` and
/// its signature is packaged with its public key into the authenticator.
///
/// # Errors
///
/// Returns an error if the transaction cannot be encoded or the signer fails.
pub fn sign_transaction<S>(raw_txn: RawTransaction, signer: &S) -> PipelineResult<SignedTransaction>
where
    S: TransactionSigner + ?Sized,
{
    let message = raw_txn.signing_message()?;
    let signature = signer.sign_message(&message)?;
    let authenticator = TransactionAuthenticator::ed25519(signer.public_key(), signature);
    Ok(SignedTransaction::new(raw_txn, authenticator))
}
