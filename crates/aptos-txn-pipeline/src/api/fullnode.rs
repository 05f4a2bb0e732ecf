//! Fullnode REST API client.

use crate::api::response::{AccountData, AptosResponse, LedgerInfo, PendingTransaction};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::retry::{RetryConfig, RetryExecutor};
use crate::submit::{
    RejectionReason, StatusObservation, SubmitResponse, TransactionNetwork, TransactionStatus,
};
use crate::transaction::SignedTransaction;
use crate::types::{AccountAddress, ChainId, HashValue};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

const BCS_CONTENT_TYPE: &str = "application/x.aptos.signed_transaction+bcs";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Client for the Aptos fullnode REST API.
///
/// Reads go through a [`RetryExecutor`] configured by
/// [`PipelineConfig::with_retry`]. Submissions and status polls are sent
/// exactly once: a submission must never be replayed behind the caller's
/// back, and the confirmation loop keeps its own error budget.
///
/// The client is cheap to clone and clones share one connection pool.
///
/// # Example
///
/// ```rust,no_run
/// use aptos_txn_pipeline::api::FullnodeClient;
/// use aptos_txn_pipeline::config::PipelineConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = FullnodeClient::new(PipelineConfig::testnet())?;
///     let chain_id = client.get_chain_id().await?;
///     println!("chain id: {chain_id}");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FullnodeClient {
    config: PipelineConfig,
    client: Client,
}

impl FullnodeClient {
    /// Creates a new fullnode client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        let pool = config.pool_config();
        let mut builder = Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(pool.max_idle_per_host.unwrap_or(usize::MAX))
            .pool_idle_timeout(pool.idle_timeout)
            .tcp_nodelay(pool.tcp_nodelay);
        if let Some(keepalive) = pool.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }
        let client = builder.build()?;
        Ok(Self { config, client })
    }

    /// The REST base URL.
    pub fn base_url(&self) -> &Url {
        self.config.fullnode_url()
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The retry policy for reads.
    pub fn retry_config(&self) -> &RetryConfig {
        self.config.retry_config()
    }

    /// Gets the current ledger information.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the node answers with an error
    /// status, or the body cannot be decoded.
    pub async fn get_ledger_info(&self) -> PipelineResult<AptosResponse<LedgerInfo>> {
        self.get_json(self.build_url("")).await
    }

    /// Gets the chain id of the network.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_ledger_info`].
    pub async fn get_chain_id(&self) -> PipelineResult<ChainId> {
        Ok(ChainId::new(self.get_ledger_info().await?.data.chain_id))
    }

    /// Gets an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the account does not exist
    /// (404), or the body cannot be decoded.
    pub async fn get_account(
        &self,
        address: AccountAddress,
    ) -> PipelineResult<AptosResponse<AccountData>> {
        self.get_json(self.build_url(&format!("accounts/{address}")))
            .await
    }

    /// Gets the next sequence number of an account.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_account`], or if the sequence number is not a u64.
    pub async fn get_sequence_number(&self, address: AccountAddress) -> PipelineResult<u64> {
        let account = self.get_account(address).await?;
        account.data.sequence_number().map_err(|e| {
            PipelineError::transaction(format!(
                "account {address} has invalid sequence number `{}`: {e}",
                account.data.sequence_number
            ))
        })
    }

    /// Submits a signed transaction as BCS. Sent exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Api`] if the node refuses the transaction, or
    /// a transport or decoding error.
    pub async fn submit_transaction(
        &self,
        signed_txn: &SignedTransaction,
    ) -> PipelineResult<AptosResponse<PendingTransaction>> {
        let request = self
            .request(self.client.post(self.build_url("transactions")))
            .header(CONTENT_TYPE, BCS_CONTENT_TYPE)
            .body(signed_txn.to_bcs()?);
        Self::handle_response(request.send().await?).await
    }

    /// Gets a transaction by hash, as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the hash is unknown (404), or
    /// the body is not JSON.
    pub async fn get_transaction_by_hash(
        &self,
        hash: HashValue,
    ) -> PipelineResult<AptosResponse<serde_json::Value>> {
        self.get_json(self.transaction_url(hash)).await
    }

    /// Gets the status of a transaction in a single attempt.
    ///
    /// An unknown hash is [`TransactionStatus::NotFound`] rather than an
    /// error; the ledger timestamp of the answer is kept either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the node answers with an error
    /// other than 404, or the body is not a transaction.
    pub async fn get_transaction_status(
        &self,
        hash: HashValue,
    ) -> PipelineResult<AptosResponse<TransactionStatus>> {
        let response = self
            .request(self.client.get(self.transaction_url(hash)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(AptosResponse::with_headers(
                TransactionStatus::NotFound,
                response.headers(),
            ));
        }
        let body: AptosResponse<serde_json::Value> = Self::handle_response(response).await?;
        let status = TransactionStatus::from_json(&body.data)?;
        Ok(body.map(|_| status))
    }

    fn transaction_url(&self, hash: HashValue) -> Url {
        self.build_url(&format!("transactions/by_hash/{hash}"))
    }

    fn build_url(&self, path: &str) -> Url {
        let mut url = self.config.fullnode_url().clone();
        if !path.is_empty() {
            if !url.path().ends_with('/') {
                url.set_path(&format!("{}/", url.path()));
            }
            url.set_path(&format!("{}{}", url.path(), path));
        }
        url
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header(ACCEPT, JSON_CONTENT_TYPE);
        match self.config.api_key() {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> PipelineResult<AptosResponse<T>> {
        let executor = RetryExecutor::new(self.config.retry_config().clone());
        executor
            .execute(|| {
                let request = self.request(self.client.get(url.clone()));
                async move { Self::handle_response(request.send().await?).await }
            })
            .await
    }

    async fn handle_response<T: DeserializeOwned>(
        response: Response,
    ) -> PipelineResult<AptosResponse<T>> {
        let status = response.status();
        let headers = response.headers().clone();

        if status.is_success() {
            let data: T = response.json().await?;
            return Ok(AptosResponse::with_headers(data, &headers));
        }

        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        let error_code = body
            .get("error_code")
            .and_then(|v| v.as_str())
            .map(ToString::to_string);
        let vm_error_code = body.get("vm_error_code").and_then(serde_json::Value::as_u64);

        Err(PipelineError::api_with_details(
            status.as_u16(),
            message,
            error_code,
            vm_error_code,
        ))
    }
}

#[async_trait]
impl TransactionNetwork for FullnodeClient {
    async fn sequence_number(&self, address: AccountAddress) -> PipelineResult<u64> {
        self.get_sequence_number(address).await
    }

    async fn chain_id(&self) -> PipelineResult<ChainId> {
        self.get_chain_id().await
    }

    async fn submit(&self, txn: &SignedTransaction) -> PipelineResult<SubmitResponse> {
        match self.submit_transaction(txn).await {
            Ok(pending) => Ok(SubmitResponse::Accepted {
                hash: pending.data.hash,
            }),
            // Throttling and server faults say nothing about the transaction itself.
            Err(error) if error.is_transient() => Err(error),
            Err(error) => {
                debug!(error = %error, "Submission refused by node");
                RejectionReason::from_api_error(error).map(SubmitResponse::Rejected)
            }
        }
    }

    async fn transaction_status(&self, hash: HashValue) -> PipelineResult<StatusObservation> {
        let response = self.get_transaction_status(hash).await?;
        Ok(StatusObservation {
            ledger_timestamp_usecs: response.ledger_timestamp,
            status: response.data,
        })
    }
}
