//! Submit once, then poll by hash until a terminal outcome.

use super::network::{SubmitResponse, TransactionNetwork};
use super::status::{
    SubmissionResult, TransactionOutcome, TransactionState, TransactionStatus,
};
use crate::config::ConfirmationConfig;
use crate::error::PipelineResult;
use crate::transaction::SignedTransaction;
use crate::types::HashValue;
use tokio::time::{sleep_until, timeout, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs the submission and confirmation protocol against a
/// [`TransactionNetwork`].
///
/// A submission is sent exactly once. A refusal ends the protocol with
/// [`TransactionOutcome::Rejected`] and nothing is polled. An accepted
/// transaction is polled by hash with capped exponential backoff until it is
/// committed, observed expired, or the wait budget in [`ConfirmationConfig`]
/// runs out. Transport errors during polling are tolerated up to
/// `max_transient_errors` in a row; past that the wait degrades to
/// [`TransactionOutcome::TimedOut`].
#[derive(Debug, Clone)]
pub struct TransactionSubmitter<N> {
    network: N,
    config: ConfirmationConfig,
}

impl<N: TransactionNetwork> TransactionSubmitter<N> {
    /// Creates a submitter.
    pub fn new(network: N, config: ConfirmationConfig) -> Self {
        Self { network, config }
    }

    /// The underlying network.
    pub fn network(&self) -> &N {
        &self.network
    }

    /// The wait budget and poll schedule.
    pub fn config(&self) -> &ConfirmationConfig {
        &self.config
    }

    /// Submits `txn` and waits for its outcome.
    ///
    /// The hash is computed locally first, so a rejected transaction still
    /// reports one. If `cancel` is already cancelled nothing is sent and the
    /// outcome is [`TransactionOutcome::TimedOut`].
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be encoded, the submission
    /// fails at the transport level, or polling hits a non-transient error.
    /// Rejection, execution failure, expiry and timeout are outcomes, not
    /// errors.
    pub async fn submit_and_wait(
        &self,
        txn: &SignedTransaction,
        cancel: &CancellationToken,
    ) -> PipelineResult<SubmissionResult> {
        let local_hash = txn.hash()?;
        let sender = txn.sender();
        let sequence_number = txn.sequence_number();
        debug!(
            txn_hash = %local_hash,
            sender = %sender,
            sequence_number,
            state = %TransactionState::Built,
            "Submitting transaction"
        );

        if cancel.is_cancelled() {
            debug!(txn_hash = %local_hash, "Cancelled before submission");
            return Ok(SubmissionResult {
                hash: local_hash,
                outcome: TransactionOutcome::TimedOut,
            });
        }

        let hash = match self.network.submit(txn).await? {
            SubmitResponse::Rejected(reason) => {
                info!(
                    txn_hash = %local_hash,
                    sender = %sender,
                    sequence_number,
                    reason = %reason,
                    "Transaction rejected"
                );
                return Ok(SubmissionResult {
                    hash: local_hash,
                    outcome: TransactionOutcome::Rejected(reason),
                });
            }
            SubmitResponse::Accepted { hash } => {
                if hash != local_hash {
                    warn!(
                        txn_hash = %hash,
                        local_hash = %local_hash,
                        "Node reported a different transaction hash"
                    );
                }
                hash
            }
        };
        info!(txn_hash = %hash, sender = %sender, sequence_number, "Transaction submitted");

        self.wait_for_confirmation(hash, txn.expiration_timestamp_secs(), cancel)
            .await
    }

    /// Polls `hash` until it reaches a terminal state.
    ///
    /// `expiration_timestamp_secs` is the transaction's expiration; once the
    /// node's ledger time passes it while the transaction is still unknown or
    /// pending, the outcome is [`TransactionOutcome::Expired`]. Cancelling
    /// `cancel` stops polling at once with [`TransactionOutcome::TimedOut`].
    ///
    /// # Errors
    ///
    /// Returns the first non-transient error reported by the network.
    pub async fn wait_for_confirmation(
        &self,
        hash: HashValue,
        expiration_timestamp_secs: u64,
        cancel: &CancellationToken,
    ) -> PipelineResult<SubmissionResult> {
        let deadline = Instant::now() + self.config.timeout;
        let expiration_usecs = expiration_timestamp_secs.saturating_mul(1_000_000);
        let mut interval = self.config.first_poll_interval();
        let mut transient_errors = 0u32;
        let mut polls = 0u32;
        let mut state = TransactionState::Submitted;

        let outcome = loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break TransactionOutcome::TimedOut;
            }

            let polled = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(txn_hash = %hash, "Confirmation wait cancelled");
                    break TransactionOutcome::TimedOut;
                }
                polled = timeout(remaining, self.network.transaction_status(hash)) => polled,
            };
            polls += 1;
            let Ok(polled) = polled else {
                break TransactionOutcome::TimedOut;
            };

            match polled {
                Ok(observation) => {
                    transient_errors = 0;
                    match observation.status {
                        TransactionStatus::Committed(info) => {
                            break TransactionOutcome::Committed(info);
                        }
                        status => {
                            if status == TransactionStatus::Pending {
                                state = TransactionState::Pending;
                            }
                            if observation
                                .ledger_timestamp_usecs
                                .is_some_and(|now| now >= expiration_usecs)
                            {
                                break TransactionOutcome::Expired;
                            }
                            debug!(
                                txn_hash = %hash,
                                state = %state,
                                attempt = polls,
                                next_poll_ms = duration_ms(interval),
                                "Transaction not committed yet"
                            );
                        }
                    }
                }
                Err(error) if error.is_transient() => {
                    transient_errors += 1;
                    warn!(
                        txn_hash = %hash,
                        attempt = transient_errors,
                        error = %error,
                        "Transient error while polling"
                    );
                    if transient_errors > self.config.max_transient_errors {
                        break TransactionOutcome::TimedOut;
                    }
                }
                Err(error) => return Err(error),
            }

            let wake_at = (Instant::now() + interval).min(deadline);
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(txn_hash = %hash, "Confirmation wait cancelled");
                    break TransactionOutcome::TimedOut;
                }
                () = sleep_until(wake_at) => {}
            }
            interval = self.config.next_poll_interval(interval);
        };

        let result = SubmissionResult { hash, outcome };
        match &result.outcome {
            TransactionOutcome::Committed(info) => info!(
                txn_hash = %hash,
                state = %result.state(),
                version = info.version,
                gas_used = info.gas_used,
                vm_status = %info.vm_status,
                "Transaction committed"
            ),
            _ => info!(txn_hash = %hash, state = %result.state(), polls, "Stopped waiting for transaction"),
        }
        Ok(result)
    }
}

fn duration_ms(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
