//! Fullnode response bodies and ledger headers.

use crate::types::HashValue;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

const LEDGER_VERSION_HEADER: &str = "x-aptos-ledger-version";
const LEDGER_TIMESTAMP_HEADER: &str = "x-aptos-ledger-timestamp";
const EPOCH_HEADER: &str = "x-aptos-epoch";
const BLOCK_HEIGHT_HEADER: &str = "x-aptos-block-height";
const OLDEST_LEDGER_VERSION_HEADER: &str = "x-aptos-oldest-ledger-version";

/// A response body together with the ledger state the node reported in its
/// `x-aptos-*` headers.
#[derive(Debug, Clone)]
pub struct AptosResponse<T> {
    /// The decoded body.
    pub data: T,
    /// Latest ledger version known to the node.
    pub ledger_version: Option<u64>,
    /// Ledger timestamp in microseconds since the Unix epoch.
    pub ledger_timestamp: Option<u64>,
    /// Current epoch.
    pub epoch: Option<u64>,
    /// Latest block height.
    pub block_height: Option<u64>,
    /// Oldest ledger version the node still serves.
    pub oldest_ledger_version: Option<u64>,
}

impl<T> AptosResponse<T> {
    /// Wraps a body with no ledger information.
    pub fn new(data: T) -> Self {
        Self {
            data,
            ledger_version: None,
            ledger_timestamp: None,
            epoch: None,
            block_height: None,
            oldest_ledger_version: None,
        }
    }

    pub(crate) fn with_headers(data: T, headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };
        Self {
            data,
            ledger_version: read(LEDGER_VERSION_HEADER),
            ledger_timestamp: read(LEDGER_TIMESTAMP_HEADER),
            epoch: read(EPOCH_HEADER),
            block_height: read(BLOCK_HEIGHT_HEADER),
            oldest_ledger_version: read(OLDEST_LEDGER_VERSION_HEADER),
        }
    }

    /// Discards the ledger information.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Maps the body, keeping the ledger information.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> AptosResponse<U> {
        AptosResponse {
            data: f(self.data),
            ledger_version: self.ledger_version,
            ledger_timestamp: self.ledger_timestamp,
            epoch: self.epoch,
            block_height: self.block_height,
            oldest_ledger_version: self.oldest_ledger_version,
        }
    }
}

/// The body returned when a submission is accepted into the mempool.
///
/// Numeric fields are decimal strings, as the node sends them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTransaction {
    /// The transaction hash.
    pub hash: HashValue,
    /// The sender address.
    pub sender: String,
    /// The sender's sequence number.
    pub sequence_number: String,
    /// Maximum gas units.
    pub max_gas_amount: String,
    /// Gas unit price.
    pub gas_unit_price: String,
    /// Expiration in seconds since the Unix epoch.
    pub expiration_timestamp_secs: String,
}

/// The body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerInfo {
    /// Chain id of the network.
    pub chain_id: u8,
    /// Current epoch.
    pub epoch: String,
    /// Latest ledger version.
    pub ledger_version: String,
    /// Oldest ledger version still served.
    pub oldest_ledger_version: String,
    /// Ledger timestamp in microseconds.
    pub ledger_timestamp: String,
    /// `full_node` or `validator`.
    pub node_role: String,
    /// Oldest block height still served.
    pub oldest_block_height: String,
    /// Latest block height.
    pub block_height: String,
    /// Build hash of the node software.
    #[serde(default)]
    pub git_hash: Option<String>,
}

impl LedgerInfo {
    /// The ledger version as a number.
    pub fn version(&self) -> Result<u64, std::num::ParseIntError> {
        self.ledger_version.parse()
    }

    /// The ledger timestamp in microseconds.
    pub fn timestamp_usecs(&self) -> Result<u64, std::num::ParseIntError> {
        self.ledger_timestamp.parse()
    }

    /// The block height as a number.
    pub fn height(&self) -> Result<u64, std::num::ParseIntError> {
        self.block_height.parse()
    }
}

/// The body of `GET /accounts/{address}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountData {
    /// Next sequence number, as a decimal string.
    pub sequence_number: String,
    /// Authentication key, hex encoded.
    pub authentication_key: String,
}

impl AccountData {
    /// The next sequence number as a number.
    pub fn sequence_number(&self) -> Result<u64, std::num::ParseIntError> {
        self.sequence_number.parse()
    }
}
