//! The network seam the confirmation protocol runs against.

use super::status::{RejectionReason, TransactionStatus};
use crate::error::PipelineResult;
use crate::transaction::SignedTransaction;
use crate::types::{AccountAddress, ChainId, HashValue};
use async_trait::async_trait;
use std::sync::Arc;

/// The node's answer to a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitResponse {
    /// Admitted to the mempool under `hash`.
    Accepted {
        /// The hash the node computed.
        hash: HashValue,
    },
    /// Refused.
    Rejected(RejectionReason),
}

/// One answer to a status-by-hash query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusObservation {
    /// The transaction's status.
    pub status: TransactionStatus,
    /// The node's ledger time in microseconds when it answered, if reported.
    pub ledger_timestamp_usecs: Option<u64>,
}

/// Everything the pipeline needs from a node.
///
/// [`crate::api::FullnodeClient`] implements this over REST; tests implement it
/// over an in-memory ledger. Implementations must be safe to share between
/// concurrent flows.
#[async_trait]
pub trait TransactionNetwork: Send + Sync {
    /// The next sequence number of `address`.
    async fn sequence_number(&self, address: AccountAddress) -> PipelineResult<u64>;

    /// The chain id of the network.
    async fn chain_id(&self) -> PipelineResult<ChainId>;

    /// Submits `txn` exactly once. A refusal is `Ok(SubmitResponse::Rejected)`;
    /// `Err` is reserved for transport failures.
    async fn submit(&self, txn: &SignedTransaction) -> PipelineResult<SubmitResponse>;

    /// Looks up a transaction by hash, in a single attempt.
    async fn transaction_status(&self, hash: HashValue) -> PipelineResult<StatusObservation>;
}

#[async_trait]
impl<T: TransactionNetwork + ?Sized> TransactionNetwork for Arc<T> {
    async fn sequence_number(&self, address: AccountAddress) -> PipelineResult<u64> {
        (**self).sequence_number(address).await
    }

    async fn chain_id(&self) -> PipelineResult<ChainId> {
        (**self).chain_id().await
    }

    async fn submit(&self, txn: &SignedTransaction) -> PipelineResult<SubmitResponse> {
        (**self).submit(txn).await
    }

    async fn transaction_status(&self, hash: HashValue) -> PipelineResult<StatusObservation> {
        (**self).transaction_status(hash).await
    }
}
