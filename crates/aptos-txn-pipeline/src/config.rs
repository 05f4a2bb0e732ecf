//! Network presets and tunables.
//!
//! [`PipelineConfig`] selects the fullnode to talk to and how the HTTP layer
//! behaves; [`ConfirmationConfig`] is the wait budget and poll schedule used
//! after a transaction has been accepted.

use crate::retry::RetryConfig;
use crate::types::ChainId;
use std::time::Duration;
use url::Url;

/// HTTP connection pool settings for the shared client.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum idle connections per host; `None` means unlimited.
    pub max_idle_per_host: Option<usize>,
    /// How long an idle connection is kept.
    pub idle_timeout: Duration,
    /// TCP keepalive interval; `None` disables keepalive.
    pub tcp_keepalive: Option<Duration>,
    /// Whether to set `TCP_NODELAY`.
    pub tcp_nodelay: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: None,
            idle_timeout: Duration::from_secs(90),
            tcp_keepalive: Some(Duration::from_secs(60)),
            tcp_nodelay: true,
        }
    }
}

impl PoolConfig {
    /// Many concurrent flows against one node.
    pub fn high_throughput() -> Self {
        Self {
            max_idle_per_host: Some(32),
            idle_timeout: Duration::from_secs(300),
            tcp_keepalive: Some(Duration::from_secs(30)),
            tcp_nodelay: true,
        }
    }

    /// Short-lived connections for a local node.
    pub fn low_latency() -> Self {
        Self {
            max_idle_per_host: Some(8),
            idle_timeout: Duration::from_secs(30),
            tcp_keepalive: Some(Duration::from_secs(15)),
            tcp_nodelay: true,
        }
    }
}

/// Known Aptos networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// Aptos mainnet.
    Mainnet,
    /// Aptos testnet.
    Testnet,
    /// Aptos devnet, whose chain id changes on every reset.
    Devnet,
    /// A local node.
    Local,
    /// Any other endpoint.
    Custom,
}

impl Network {
    /// The chain id this network always has, if it is fixed.
    pub fn chain_id(&self) -> Option<ChainId> {
        match self {
            Network::Mainnet => Some(ChainId::mainnet()),
            Network::Testnet => Some(ChainId::testnet()),
            Network::Local => Some(ChainId::local()),
            Network::Devnet | Network::Custom => None,
        }
    }

    /// Lowercase network name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Local => "local",
            Network::Custom => "custom",
        }
    }
}

/// Shortest delay between two status polls.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Wait budget and poll schedule for transaction confirmation.
///
/// Polling starts at `initial_poll_interval` and multiplies by
/// `backoff_multiplier` after each poll, capped at `max_poll_interval`. Every
/// delay is at least [`MIN_POLL_INTERVAL`], whatever the fields say. The
/// whole wait never exceeds `timeout`. Up to `max_transient_errors`
/// consecutive transport failures are tolerated before the wait gives up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationConfig {
    /// Total wait budget measured from the first poll.
    pub timeout: Duration,
    /// Delay after the first poll.
    pub initial_poll_interval: Duration,
    /// Upper bound on the delay between polls.
    pub max_poll_interval: Duration,
    /// Growth factor of the delay between polls.
    pub backoff_multiplier: u32,
    /// Consecutive transport failures tolerated while polling.
    pub max_transient_errors: u32,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            initial_poll_interval: Duration::from_millis(200),
            max_poll_interval: Duration::from_secs(2),
            backoff_multiplier: 2,
            max_transient_errors: 3,
        }
    }
}

impl ConfirmationConfig {
    /// Sets the total wait budget.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the poll schedule.
    #[must_use]
    pub fn with_poll_interval(mut self, initial: Duration, max: Duration, multiplier: u32) -> Self {
        let initial = initial.max(MIN_POLL_INTERVAL);
        self.initial_poll_interval = initial;
        self.max_poll_interval = max.max(initial);
        self.backoff_multiplier = multiplier.max(1);
        self
    }

    /// Sets the number of consecutive transport failures tolerated.
    #[must_use]
    pub fn with_max_transient_errors(mut self, max: u32) -> Self {
        self.max_transient_errors = max;
        self
    }

    /// The delay after the first poll.
    pub fn first_poll_interval(&self) -> Duration {
        self.initial_poll_interval.max(MIN_POLL_INTERVAL)
    }

    /// The delay that follows `current` in the schedule.
    pub fn next_poll_interval(&self, current: Duration) -> Duration {
        current
            .saturating_mul(self.backoff_multiplier.max(1))
            .min(self.max_poll_interval)
            .max(MIN_POLL_INTERVAL)
    }
}

/// Configuration for a pipeline.
///
/// # Example
///
/// ```rust
/// use aptos_txn_pipeline::config::{ConfirmationConfig, PipelineConfig};
/// use std::time::Duration;
///
/// let config = PipelineConfig::testnet()
///     .with_timeout(Duration::from_secs(10))
///     .with_confirmation(ConfirmationConfig::default().with_timeout(Duration::from_secs(60)));
/// assert_eq!(config.confirmation().timeout, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub(crate) network: Network,
    pub(crate) fullnode_url: Url,
    pub(crate) timeout: Duration,
    pub(crate) retry_config: RetryConfig,
    pub(crate) pool_config: PoolConfig,
    pub(crate) confirmation: ConfirmationConfig,
    pub(crate) api_key: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::devnet()
    }
}

impl PipelineConfig {
    fn preset(network: Network, url: &'static str) -> Self {
        Self {
            network,
            fullnode_url: Url::parse(url).expect("preset fullnode URLs are valid"),
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::default(),
            pool_config: PoolConfig::default(),
            confirmation: ConfirmationConfig::default(),
            api_key: None,
        }
    }

    /// Aptos mainnet, with conservative retries.
    pub fn mainnet() -> Self {
        Self {
            retry_config: RetryConfig::conservative(),
            ..Self::preset(Network::Mainnet, "https://fullnode.mainnet.aptoslabs.com/v1")
        }
    }

    /// Aptos testnet.
    pub fn testnet() -> Self {
        Self::preset(Network::Testnet, "https://fullnode.testnet.aptoslabs.com/v1")
    }

    /// Aptos devnet.
    pub fn devnet() -> Self {
        Self::preset(Network::Devnet, "https://fullnode.devnet.aptoslabs.com/v1")
    }

    /// A node on `127.0.0.1:8080`, with fast retries and a short timeout.
    pub fn local() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retry_config: RetryConfig::aggressive(),
            pool_config: PoolConfig::low_latency(),
            ..Self::preset(Network::Local, "http://127.0.0.1:8080/v1")
        }
    }

    /// Any fullnode, given its REST base URL including the `/v1` suffix.
    ///
    /// # Errors
    ///
    /// Returns an error if `fullnode_url` is not a valid URL.
    pub fn custom(fullnode_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            network: Network::Custom,
            fullnode_url: Url::parse(fullnode_url)?,
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::default(),
            pool_config: PoolConfig::default(),
            confirmation: ConfirmationConfig::default(),
            api_key: None,
        })
    }

    /// Sets the per-request HTTP timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry policy for reads.
    #[must_use]
    pub fn with_retry(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Disables retries for reads.
    #[must_use]
    pub fn without_retry(mut self) -> Self {
        self.retry_config = RetryConfig::no_retry();
        self
    }

    /// Sets the confirmation wait budget and poll schedule.
    #[must_use]
    pub fn with_confirmation(mut self, confirmation: ConfirmationConfig) -> Self {
        self.confirmation = confirmation;
        self
    }

    /// Sets the connection pool settings.
    #[must_use]
    pub fn with_pool(mut self, pool_config: PoolConfig) -> Self {
        self.pool_config = pool_config;
        self
    }

    /// Sets an API key, sent as a bearer token.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The selected network.
    pub fn network(&self) -> Network {
        self.network
    }

    /// The fullnode REST base URL.
    pub fn fullnode_url(&self) -> &Url {
        &self.fullnode_url
    }

    /// The per-request HTTP timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The retry policy for reads.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// The connection pool settings.
    pub fn pool_config(&self) -> &PoolConfig {
        &self.pool_config
    }

    /// The confirmation wait budget and poll schedule.
    pub fn confirmation(&self) -> &ConfirmationConfig {
        &self.confirmation
    }

    /// The API key, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}
