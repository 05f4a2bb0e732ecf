//! The end-to-end flow: read, assemble, sign, submit, wait.

use crate::api::FullnodeClient;
use crate::config::{ConfirmationConfig, PipelineConfig};
use crate::crypto::TransactionSigner;
use crate::error::{PipelineError, PipelineResult};
use crate::submit::{SubmissionResult, TransactionNetwork, TransactionSubmitter};
use crate::transaction::{
    sign_transaction, EntryFunction, RawTransaction, SignedTransaction, TransactionBuilder,
    TransactionPayload, DEFAULT_EXPIRATION_SECONDS, DEFAULT_GAS_UNIT_PRICE,
    DEFAULT_MAX_GAS_AMOUNT,
};
use crate::types::{AccountAddress, ChainId, HashValue, TypeTag};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Gas and expiration settings for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Maximum gas units the transaction may consume.
    pub max_gas_amount: u64,
    /// Price per gas unit in octas.
    pub gas_unit_price: u64,
    /// Lifetime in seconds, counted from assembly.
    pub expiration_secs: u64,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            max_gas_amount: DEFAULT_MAX_GAS_AMOUNT,
            gas_unit_price: DEFAULT_GAS_UNIT_PRICE,
            expiration_secs: DEFAULT_EXPIRATION_SECONDS,
        }
    }
}

impl TransactionOptions {
    /// Sets the maximum gas amount.
    #[must_use]
    pub fn with_max_gas_amount(mut self, max_gas_amount: u64) -> Self {
        self.max_gas_amount = max_gas_amount;
        self
    }

    /// Sets the gas unit price.
    #[must_use]
    pub fn with_gas_unit_price(mut self, gas_unit_price: u64) -> Self {
        self.gas_unit_price = gas_unit_price;
        self
    }

    /// Sets the lifetime in seconds.
    #[must_use]
    pub fn with_expiration_secs(mut self, expiration_secs: u64) -> Self {
        self.expiration_secs = expiration_secs;
        self
    }
}

/// Builds, signs, submits and confirms transactions.
///
/// The pipeline holds no per-transaction state: every call reads the
/// sequence number and chain id afresh, so one pipeline can drive many
/// concurrent flows. Ordering between flows of the same sender is left to
/// the caller.
///
/// # Example
///
/// ```rust,no_run
/// use aptos_txn_pipeline::account::Ed25519Account;
/// use aptos_txn_pipeline::pipeline::TransactionOptions;
/// use aptos_txn_pipeline::transaction::EntryFunction;
/// use aptos_txn_pipeline::{AccountAddress, PipelineConfig, TransactionPipeline};
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let pipeline = TransactionPipeline::new(PipelineConfig::local())?;
///     let sender = Ed25519Account::generate();
///     let payload = EntryFunction::apt_transfer(AccountAddress::ONE, 717)?;
///     let result = pipeline
///         .sign_submit_and_wait(&sender, payload.into(), TransactionOptions::default(), &CancellationToken::new())
///         .await?;
///     println!("{} {}", result.hash, result.state());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TransactionPipeline<N = FullnodeClient> {
    submitter: TransactionSubmitter<N>,
    expected_chain_id: Option<ChainId>,
}

impl TransactionPipeline<FullnodeClient> {
    /// Creates a pipeline talking to the fullnode in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        let confirmation = config.confirmation().clone();
        let expected_chain_id = config.network().chain_id();
        let client = FullnodeClient::new(config)?;
        Ok(Self {
            submitter: TransactionSubmitter::new(client, confirmation),
            expected_chain_id,
        })
    }
}

impl<N: TransactionNetwork> TransactionPipeline<N> {
    /// Creates a pipeline over any network implementation.
    pub fn with_network(network: N, confirmation: ConfirmationConfig) -> Self {
        Self {
            submitter: TransactionSubmitter::new(network, confirmation),
            expected_chain_id: None,
        }
    }

    /// Requires the network to report `chain_id` before anything is signed.
    #[must_use]
    pub fn expect_chain_id(mut self, chain_id: ChainId) -> Self {
        self.expected_chain_id = Some(chain_id);
        self
    }

    /// The underlying network.
    pub fn network(&self) -> &N {
        self.submitter.network()
    }

    /// Assembles a transaction for `sender`, reading its sequence number and
    /// the chain id concurrently.
    ///
    /// # Errors
    ///
    /// Returns an error if either read fails, the node reports a chain id
    /// other than the expected one, or assembly fails.
    pub async fn build_transaction(
        &self,
        sender: AccountAddress,
        payload: TransactionPayload,
        options: TransactionOptions,
    ) -> PipelineResult<RawTransaction> {
        let network = self.network();
        let (sequence_number, chain_id) =
            tokio::try_join!(network.sequence_number(sender), network.chain_id())?;
        if let Some(expected) = self.expected_chain_id {
            if expected != chain_id {
                return Err(PipelineError::Config(format!(
                    "node reports chain id {chain_id}, expected {expected}"
                )));
            }
        }
        debug!(sender = %sender, sequence_number, chain_id = %chain_id, "Assembling transaction");

        TransactionBuilder::new()
            .sender(sender)
            .sequence_number(sequence_number)
            .payload(payload)
            .max_gas_amount(options.max_gas_amount)
            .gas_unit_price(options.gas_unit_price)
            .expiration_from_now(options.expiration_secs)
            .chain_id(chain_id)
            .build()
    }

    /// Signs a raw transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or signing fails.
    pub fn sign<S: TransactionSigner + ?Sized>(
        &self,
        raw_txn: RawTransaction,
        signer: &S,
    ) -> PipelineResult<SignedTransaction> {
        sign_transaction(raw_txn, signer)
    }

    /// Submits a signed transaction once and waits for its outcome.
    ///
    /// # Errors
    ///
    /// See [`TransactionSubmitter::submit_and_wait`].
    pub async fn submit_and_wait(
        &self,
        signed_txn: &SignedTransaction,
        cancel: &CancellationToken,
    ) -> PipelineResult<SubmissionResult> {
        self.submitter.submit_and_wait(signed_txn, cancel).await
    }

    /// Resumes waiting on a transaction submitted earlier, e.g. after a
    /// [`TimedOut`](crate::submit::TransactionOutcome::TimedOut) outcome.
    ///
    /// # Errors
    ///
    /// See [`TransactionSubmitter::wait_for_confirmation`].
    pub async fn wait_for_confirmation(
        &self,
        hash: HashValue,
        expiration_timestamp_secs: u64,
        cancel: &CancellationToken,
    ) -> PipelineResult<SubmissionResult> {
        self.submitter
            .wait_for_confirmation(hash, expiration_timestamp_secs, cancel)
            .await
    }

    /// Runs the whole flow for `payload` sent by `signer`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading, assembly, signing or transport fails.
    /// Rejection, execution failure, expiry and timeout are reported in the
    /// returned [`SubmissionResult`].
    pub async fn sign_submit_and_wait<S: TransactionSigner + ?Sized>(
        &self,
        signer: &S,
        payload: TransactionPayload,
        options: TransactionOptions,
        cancel: &CancellationToken,
    ) -> PipelineResult<SubmissionResult> {
        let raw_txn = self
            .build_transaction(signer.address(), payload, options)
            .await?;
        let signed_txn = self.sign(raw_txn, signer)?;
        self.submit_and_wait(&signed_txn, cancel).await
    }

    /// Transfers `amount` of `coin_type` with `0x1::coin::transfer`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::sign_submit_and_wait`].
    pub async fn transfer_coin<S: TransactionSigner + ?Sized>(
        &self,
        signer: &S,
        coin_type: TypeTag,
        recipient: AccountAddress,
        amount: u64,
        options: TransactionOptions,
        cancel: &CancellationToken,
    ) -> PipelineResult<SubmissionResult> {
        let payload = EntryFunction::coin_transfer(coin_type, recipient, amount)?;
        self.sign_submit_and_wait(signer, payload.into(), options, cancel)
            .await
    }
}
