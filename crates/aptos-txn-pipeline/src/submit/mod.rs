//! Submission and confirmation.
//!
//! [`TransactionSubmitter`] sends a signed transaction once and then polls the
//! node by hash until the transaction reaches one of the terminal states of
//! [`TransactionState`]. Its only dependency is the [`TransactionNetwork`]
//! trait, so the protocol can be driven against any node implementation.

mod network;
mod status;
mod submitter;

pub use network::{StatusObservation, SubmitResponse, TransactionNetwork};
pub use status::{
    RejectionReason, SubmissionResult, TransactionOutcome, TransactionState, TransactionStatus,
};
pub use submitter::TransactionSubmitter;
