//! Error types for the transaction pipeline.
//!
//! [`PipelineError`] covers everything that stops a flow before the network
//! has rendered a verdict: encoding misuse, malformed addresses or type tags,
//! bad key material, and transport failures. A refused submission, an aborted
//! execution and an exhausted wait budget are *outcomes* rather than errors and
//! are reported through [`crate::submit::TransactionOutcome`].

use thiserror::Error;

/// A specialized Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// The main error type for the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Error occurred during HTTP communication
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error occurred during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A value could not be canonically encoded
    #[error("BCS error: {0}")]
    Bcs(#[from] crate::bcs::Error),

    /// Error occurred during URL parsing
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Error occurred during hex encoding/decoding
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Invalid account address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid Move identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Invalid type tag format
    #[error("Invalid type tag: {0}")]
    InvalidTypeTag(String),

    /// An argument value does not fit its declared Move type
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid public key
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Invalid signature
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// An external signer could not produce a signature
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Transaction building error
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// API returned an error response
    #[error("API error ({status_code}): {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
        /// Optional error code from the API
        error_code: Option<String>,
        /// Optional VM error code
        vm_error_code: Option<u64>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    /// Creates a new transaction error
    pub fn transaction<S: Into<String>>(msg: S) -> Self {
        Self::Transaction(msg.into())
    }

    /// Creates a new API error from response details
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
            error_code: None,
            vm_error_code: None,
        }
    }

    /// Creates a new API error with additional details
    pub fn api_with_details(
        status_code: u16,
        message: impl Into<String>,
        error_code: Option<String>,
        vm_error_code: Option<u64>,
    ) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
            error_code,
            vm_error_code,
        }
    }

    /// Returns the HTTP status code attached to this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status_code, .. } => Some(*status_code),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true if the node reported that the requested object does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Returns true if this is a transport-level failure that may succeed on a
    /// later attempt: dropped or refused connections, request timeouts, rate
    /// limiting and server-side errors.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) if e.is_timeout() || e.is_connect() || e.is_request() => true,
            _ => matches!(self.status_code(), Some(408 | 429 | 500..=599)),
        }
    }
}
