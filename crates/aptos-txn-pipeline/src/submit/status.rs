//! Transaction states and terminal outcomes.

use crate::error::{PipelineError, PipelineResult};
use crate::transaction::ExecutionInfo;
use crate::types::HashValue;
use serde_json::Value;
use std::fmt;

/// What the node knows about a transaction hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionStatus {
    /// The node has no record of the hash.
    NotFound,
    /// The transaction sits in the mempool.
    Pending,
    /// The transaction was committed, successfully or not.
    Committed(ExecutionInfo),
}

impl TransactionStatus {
    /// Reads the status from a `GET /transactions/by_hash/{hash}` body.
    ///
    /// A body with `"type": "pending_transaction"` is pending; a body with a
    /// `version` is committed.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is neither, or a committed body is missing
    /// one of `version`, `success`, `vm_status` or `gas_used`.
    pub fn from_json(value: &Value) -> PipelineResult<Self> {
        if value.get("type").and_then(Value::as_str) == Some("pending_transaction") {
            return Ok(Self::Pending);
        }
        if value.get("version").is_none() {
            return Err(PipelineError::transaction(format!(
                "unrecognized transaction body: {value}"
            )));
        }
        Ok(Self::Committed(ExecutionInfo {
            version: u64_field(value, "version")?,
            success: value
                .get("success")
                .and_then(Value::as_bool)
                .ok_or_else(|| missing_field("success"))?,
            vm_status: value
                .get("vm_status")
                .and_then(Value::as_str)
                .ok_or_else(|| missing_field("vm_status"))?
                .to_string(),
            gas_used: u64_field(value, "gas_used")?,
        }))
    }
}

// The node sends u64 values as decimal strings.
fn u64_field(value: &Value, name: &str) -> PipelineResult<u64> {
    match value.get(name) {
        Some(Value::String(s)) => s.parse().map_err(|_| {
            PipelineError::transaction(format!("field `{name}` is not a u64: {s}"))
        }),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| PipelineError::transaction(format!("field `{name}` is not a u64: {n}"))),
        _ => Err(missing_field(name)),
    }
}

fn missing_field(name: &str) -> PipelineError {
    PipelineError::transaction(format!("committed transaction is missing `{name}`"))
}

/// The node's reason for refusing a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectionReason {
    /// HTTP status of the refusal, when the network is HTTP.
    pub status_code: Option<u16>,
    /// Human-readable reason.
    pub message: String,
    /// Machine-readable error code, e.g. `invalid_transaction_update`.
    pub error_code: Option<String>,
    /// VM status code for validation failures, e.g. 3 for a stale sequence number.
    pub vm_error_code: Option<u64>,
}

impl RejectionReason {
    /// A rejection with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: message.into(),
            error_code: None,
            vm_error_code: None,
        }
    }

    /// Converts a structured API error into a rejection. Other errors are
    /// handed back unchanged.
    pub(crate) fn from_api_error(error: PipelineError) -> Result<Self, PipelineError> {
        match error {
            PipelineError::Api {
                status_code,
                message,
                error_code,
                vm_error_code,
            } => Ok(Self {
                status_code: Some(status_code),
                message,
                error_code,
                vm_error_code,
            }),
            other => Err(other),
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.status_code {
            write!(f, "({code}) ")?;
        }
        f.write_str(&self.message)?;
        if let Some(error_code) = &self.error_code {
            write!(f, " [{error_code}]")?;
        }
        Ok(())
    }
}

/// Lifecycle of a single transaction.
///
/// `Built` → `Submitted` → `Pending` → one of the terminal states.
/// `Rejected` is reached straight from `Built`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionState {
    /// Signed, not yet sent.
    Built,
    /// Accepted by the node for mempool admission.
    Submitted,
    /// Observed in the mempool.
    Pending,
    /// Committed and executed successfully.
    CommittedSuccess,
    /// Committed, but execution aborted.
    CommittedFailure,
    /// The expiration time passed before the transaction was committed.
    Expired,
    /// The wait budget ran out. The transaction may still commit.
    TimedOut,
    /// The node refused the submission.
    Rejected,
}

impl TransactionState {
    /// True for states that end the protocol.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Built | Self::Submitted | Self::Pending)
    }

    /// Snake-case name, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Built => "built",
            Self::Submitted => "submitted",
            Self::Pending => "pending",
            Self::CommittedSuccess => "committed_success",
            Self::CommittedFailure => "committed_failure",
            Self::Expired => "expired",
            Self::TimedOut => "timed_out",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The terminal verdict of the submit-then-poll protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// Committed; [`ExecutionInfo::success`] tells whether execution succeeded.
    Committed(ExecutionInfo),
    /// The expiration time passed before commit; the transaction will never commit.
    Expired,
    /// The wait budget ran out or the wait was cancelled. The transaction may
    /// still commit and must be re-queried.
    TimedOut,
    /// The node refused the submission; nothing was polled.
    Rejected(RejectionReason),
}

impl TransactionOutcome {
    /// The terminal state this outcome corresponds to.
    pub fn state(&self) -> TransactionState {
        match self {
            Self::Committed(info) if info.success => TransactionState::CommittedSuccess,
            Self::Committed(_) => TransactionState::CommittedFailure,
            Self::Expired => TransactionState::Expired,
            Self::TimedOut => TransactionState::TimedOut,
            Self::Rejected(_) => TransactionState::Rejected,
        }
    }
}

/// A transaction hash together with its outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionResult {
    /// The transaction hash.
    pub hash: HashValue,
    /// The outcome.
    pub outcome: TransactionOutcome,
}

impl SubmissionResult {
    /// The terminal state.
    pub fn state(&self) -> TransactionState {
        self.outcome.state()
    }

    /// True if the transaction was committed and executed successfully.
    pub fn is_success(&self) -> bool {
        self.state() == TransactionState::CommittedSuccess
    }

    /// Execution details, if the transaction was committed.
    pub fn execution_info(&self) -> Option<&ExecutionInfo> {
        match &self.outcome {
            TransactionOutcome::Committed(info) => Some(info),
            _ => None,
        }
    }
}
