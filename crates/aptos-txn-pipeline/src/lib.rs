//! # aptos-txn-pipeline
//!
//! Client-side construction, signing, submission and confirmation of Aptos
//! transactions.
//!
//! A transaction moves through the crate in one direction:
//!
//! 1. [`transaction::EntryFunction`] (or another [`transaction::TransactionPayload`])
//!    describes the call, with arguments already in canonical form.
//! 2. [`transaction::TransactionBuilder`] assembles a [`transaction::RawTransaction`]
//!    from the sender's sequence number and the chain id.
//! 3. A [`crypto::TransactionSigner`] signs `sha3_256("APTOS::RawTransaction") ‖ bcs(raw)`.
//! 4. [`submit::TransactionSubmitter`] sends the signed bytes once and polls the
//!    node by hash until the transaction is committed, expires, is rejected, or
//!    the wait budget runs out.
//!
//! [`TransactionPipeline`] strings the steps together against a fullnode.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aptos_txn_pipeline::account::Ed25519Account;
//! use aptos_txn_pipeline::pipeline::TransactionOptions;
//! use aptos_txn_pipeline::submit::TransactionOutcome;
//! use aptos_txn_pipeline::transaction::EntryFunction;
//! use aptos_txn_pipeline::{AccountAddress, PipelineConfig, TransactionPipeline};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = TransactionPipeline::new(PipelineConfig::testnet())?;
//!     let sender = Ed25519Account::from_private_key_hex("0x...")?;
//!     let payload = EntryFunction::apt_transfer(AccountAddress::from_hex("0xb0b")?, 717)?;
//!
//!     let result = pipeline
//!         .sign_submit_and_wait(&sender, payload.into(), TransactionOptions::default(), &CancellationToken::new())
//!         .await?;
//!     match result.outcome {
//!         TransactionOutcome::Committed(info) => println!("committed at {}", info.version),
//!         TransactionOutcome::TimedOut => println!("{} may still commit", result.hash),
//!         other => println!("{other:?}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`bcs`] - canonical encoding
//! - [`types`] - addresses, type tags and hashes
//! - [`transaction`] - payloads, raw and signed transactions
//! - [`crypto`] - Ed25519 keys and the signer capability
//! - [`api`] - fullnode REST client
//! - [`submit`] - the submit-then-poll protocol

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod account;
pub mod api;
pub mod bcs;
pub mod config;
pub mod crypto;
pub mod error;
pub mod pipeline;
pub mod retry;
pub mod submit;
pub mod transaction;
pub mod types;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::TransactionPipeline;

pub use types::{AccountAddress, ChainId, HashValue};
