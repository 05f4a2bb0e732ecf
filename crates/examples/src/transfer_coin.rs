//! Transfers APT with `0x1::coin::transfer<0x1::aptos_coin::AptosCoin>` and
//! waits for the result.
//!
//! ```text
//! APTOS_NODE_URL=http://127.0.0.1:8080/v1 \
//! APTOS_PRIVATE_KEY=0x... \
//! APTOS_RECIPIENT=0xb0b \
//! cargo run -p examples --bin transfer_coin
//! ```
//!
//! Without `APTOS_PRIVATE_KEY` a fresh key is generated; it needs funding
//! before the transfer can succeed. Ctrl-C stops waiting.

use anyhow::Context;
use aptos_txn_pipeline::account::Ed25519Account;
use aptos_txn_pipeline::config::{ConfirmationConfig, PipelineConfig};
use aptos_txn_pipeline::pipeline::TransactionOptions;
use aptos_txn_pipeline::submit::TransactionOutcome;
use aptos_txn_pipeline::transaction::EntryFunctionBuilder;
use aptos_txn_pipeline::{AccountAddress, TransactionPipeline};
use std::env;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match env::var("APTOS_NODE_URL") {
        Ok(url) => PipelineConfig::custom(&url).context("APTOS_NODE_URL is not a URL")?,
        Err(_) => PipelineConfig::local(),
    }
    .with_confirmation(ConfirmationConfig::default().with_timeout(Duration::from_secs(30)));

    let sender = match env::var("APTOS_PRIVATE_KEY") {
        Ok(key) => Ed25519Account::from_private_key_hex(&key).context("invalid APTOS_PRIVATE_KEY")?,
        Err(_) => {
            let account = Ed25519Account::generate();
            warn!(address = %account.address(), "Generated a new sender; fund it before retrying");
            account
        }
    };
    let recipient = match env::var("APTOS_RECIPIENT") {
        Ok(address) => AccountAddress::from_hex(&address).context("invalid APTOS_RECIPIENT")?,
        Err(_) => Ed25519Account::generate().address(),
    };
    let amount: u64 = env::var("APTOS_AMOUNT")
        .ok()
        .map(|v| v.parse())
        .transpose()
        .context("APTOS_AMOUNT is not a u64")?
        .unwrap_or(717);

    let payload = EntryFunctionBuilder::new("0x1::coin::transfer")
        .type_arg("0x1::aptos_coin::AptosCoin")
        .arg(recipient)
        .arg(amount)
        .build()?;
    let options = TransactionOptions::default()
        .with_max_gas_amount(1_000_000)
        .with_gas_unit_price(1)
        .with_expiration_secs(10);

    let pipeline = TransactionPipeline::new(config)?;
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    info!(sender = %sender.address(), recipient = %recipient, amount, "Transferring");
    let result = pipeline
        .sign_submit_and_wait(&sender, payload, options, &cancel)
        .await?;

    match &result.outcome {
        TransactionOutcome::Committed(info) if info.success => {
            info!(txn_hash = %result.hash, version = info.version, gas_used = info.gas_used, "Transfer committed");
        }
        TransactionOutcome::Committed(info) => {
            anyhow::bail!("transfer {} aborted: {}", result.hash, info.vm_status);
        }
        TransactionOutcome::Rejected(reason) => {
            anyhow::bail!("transfer {} rejected: {reason}", result.hash);
        }
        TransactionOutcome::Expired => {
            anyhow::bail!("transfer {} expired before it was committed", result.hash);
        }
        TransactionOutcome::TimedOut => {
            warn!(txn_hash = %result.hash, "Stopped waiting; the transfer may still commit");
        }
    }
    Ok(())
}
