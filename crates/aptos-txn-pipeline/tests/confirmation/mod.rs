//! The submit-then-poll protocol against an in-memory ledger.
//!
//! Every test runs on paused tokio time, so poll schedules and wait budgets
//! are exact and the suite finishes instantly.

use aptos_txn_pipeline::account::Ed25519Account;
use aptos_txn_pipeline::config::ConfirmationConfig;
use aptos_txn_pipeline::crypto::Ed25519PrivateKey;
use aptos_txn_pipeline::pipeline::TransactionOptions;
use aptos_txn_pipeline::submit::{
    RejectionReason, StatusObservation, SubmitResponse, TransactionNetwork, TransactionOutcome,
    TransactionState, TransactionStatus, TransactionSubmitter,
};
use aptos_txn_pipeline::transaction::{
    sign_transaction, EntryFunction, ExecutionInfo, SignedTransaction, TransactionBuilder,
};
use aptos_txn_pipeline::types::{AccountAddress, ChainId, HashValue};
use aptos_txn_pipeline::{PipelineError, PipelineResult, TransactionPipeline};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const CHAIN_ID: ChainId = ChainId::new(4);

#[derive(Default)]
struct Ledger {
    sequence_numbers: HashMap<AccountAddress, u64>,
    submitted: HashMap<HashValue, Instant>,
    next_version: u64,
    submissions: u32,
    polls: u32,
    failing_polls: u32,
}

/// A node that commits every accepted transaction `commit_latency` after
/// submission. Its ledger clock starts at `ledger_start_secs` and follows
/// tokio time.
struct SimulatedNetwork {
    ledger: Mutex<Ledger>,
    commit_latency: Duration,
    execution_succeeds: bool,
    drop_submissions: bool,
    poll_error: Option<fn() -> PipelineError>,
    ledger_start_secs: u64,
    started: Instant,
}

impl SimulatedNetwork {
    fn new(commit_latency: Duration) -> Self {
        Self {
            ledger: Mutex::new(Ledger::default()),
            commit_latency,
            execution_succeeds: true,
            drop_submissions: false,
            poll_error: None,
            ledger_start_secs: now_secs(),
            started: Instant::now(),
        }
    }

    fn with_sequence_number(self, address: AccountAddress, sequence_number: u64) -> Self {
        self.ledger
            .lock()
            .unwrap()
            .sequence_numbers
            .insert(address, sequence_number);
        self
    }

    fn failing_polls(self, count: u32, error: fn() -> PipelineError) -> Self {
        self.ledger.lock().unwrap().failing_polls = count;
        Self {
            poll_error: Some(error),
            ..self
        }
    }

    fn polls(&self) -> u32 {
        self.ledger.lock().unwrap().polls
    }

    fn submissions(&self) -> u32 {
        self.ledger.lock().unwrap().submissions
    }

    fn ledger_timestamp_usecs(&self) -> u64 {
        let elapsed = Instant::now().duration_since(self.started);
        self.ledger_start_secs * 1_000_000 + elapsed.as_micros() as u64
    }
}

#[async_trait]
impl TransactionNetwork for SimulatedNetwork {
    async fn sequence_number(&self, address: AccountAddress) -> PipelineResult<u64> {
        let ledger = self.ledger.lock().unwrap();
        Ok(ledger.sequence_numbers.get(&address).copied().unwrap_or(0))
    }

    async fn chain_id(&self) -> PipelineResult<ChainId> {
        Ok(CHAIN_ID)
    }

    async fn submit(&self, txn: &SignedTransaction) -> PipelineResult<SubmitResponse> {
        let mut ledger = self.ledger.lock().unwrap();
        ledger.submissions += 1;
        let current = ledger
            .sequence_numbers
            .get(&txn.sender())
            .copied()
            .unwrap_or(0);
        if txn.sequence_number() < current {
            return Ok(SubmitResponse::Rejected(RejectionReason {
                status_code: Some(400),
                message: "Invalid transaction: SEQUENCE_NUMBER_TOO_OLD".into(),
                error_code: Some("vm_error".into()),
                vm_error_code: Some(3),
            }));
        }
        let hash = txn.hash()?;
        if !self.drop_submissions {
            ledger.submitted.insert(hash, Instant::now());
        }
        Ok(SubmitResponse::Accepted { hash })
    }

    async fn transaction_status(&self, hash: HashValue) -> PipelineResult<StatusObservation> {
        let mut ledger = self.ledger.lock().unwrap();
        ledger.polls += 1;
        if ledger.failing_polls > 0 {
            ledger.failing_polls -= 1;
            if let Some(error) = self.poll_error {
                return Err(error());
            }
        }
        let status = match ledger.submitted.get(&hash).copied() {
            None => TransactionStatus::NotFound,
            Some(at) if at.elapsed() < self.commit_latency => TransactionStatus::Pending,
            Some(_) => {
                ledger.next_version += 1;
                TransactionStatus::Committed(ExecutionInfo {
                    version: ledger.next_version,
                    success: self.execution_succeeds,
                    vm_status: if self.execution_succeeds {
                        "Executed successfully".into()
                    } else {
                        "Move abort in 0x1::coin: EINSUFFICIENT_BALANCE(0x10006)".into()
                    },
                    gas_used: 7,
                })
            }
        };
        Ok(StatusObservation {
            status,
            ledger_timestamp_usecs: Some(self.ledger_timestamp_usecs()),
        })
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn account() -> Ed25519Account {
    Ed25519Account::from_private_key(Ed25519PrivateKey::from_bytes(&[9u8; 32]).unwrap())
}

fn signed(account: &Ed25519Account, sequence_number: u64, expiration: u64) -> SignedTransaction {
    let raw = TransactionBuilder::new()
        .sender(account.address())
        .sequence_number(sequence_number)
        .payload(EntryFunction::apt_transfer(AccountAddress::ONE, 717).unwrap().into())
        .max_gas_amount(1_000_000)
        .gas_unit_price(1)
        .expiration_timestamp_secs(expiration)
        .chain_id(CHAIN_ID)
        .build()
        .unwrap();
    sign_transaction(raw, account).unwrap()
}

#[track_caller]
fn assert_elapsed(started: Instant, millis: u64) {
    let elapsed = started.elapsed();
    let expected = Duration::from_millis(millis);
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(5),
        "elapsed {elapsed:?}, expected {expected:?}"
    );
}

fn budget(timeout: Duration) -> ConfirmationConfig {
    ConfirmationConfig::default().with_timeout(timeout)
}

#[tokio::test(start_paused = true)]
async fn test_committed_success() {
    let account = account();
    let network = Arc::new(SimulatedNetwork::new(Duration::from_secs(1)));
    let submitter = TransactionSubmitter::new(network.clone(), budget(Duration::from_secs(30)));
    let txn = signed(&account, 0, now_secs() + 600);

    let started = Instant::now();
    let result = submitter
        .submit_and_wait(&txn, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.hash, txn.hash().unwrap());
    assert_eq!(result.state(), TransactionState::CommittedSuccess);
    assert!(result.is_success());
    assert_eq!(result.execution_info().unwrap().gas_used, 7);
    // Polls at 0, 200, 600 and 1400 ms; the last one sees the commit.
    assert_eq!(network.polls(), 4);
    assert_elapsed(started, 1400);
}

#[tokio::test(start_paused = true)]
async fn test_committed_failure_is_an_outcome() {
    let account = account();
    let network = Arc::new(SimulatedNetwork {
        execution_succeeds: false,
        ..SimulatedNetwork::new(Duration::from_millis(100))
    });
    let submitter = TransactionSubmitter::new(network, budget(Duration::from_secs(30)));
    let txn = signed(&account, 0, now_secs() + 600);

    let result = submitter
        .submit_and_wait(&txn, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.state(), TransactionState::CommittedFailure);
    let TransactionOutcome::Committed(info) = &result.outcome else {
        panic!("expected a commit, got {:?}", result.outcome);
    };
    assert!(info.vm_status.contains("EINSUFFICIENT_BALANCE"));
}

#[tokio::test(start_paused = true)]
async fn test_budget_shorter_than_commit_latency_times_out() {
    let account = account();
    let network = Arc::new(SimulatedNetwork::new(Duration::from_secs(5)));
    let submitter = TransactionSubmitter::new(network.clone(), budget(Duration::from_secs(2)));
    let txn = signed(&account, 0, now_secs() + 600);

    let started = Instant::now();
    let result = submitter
        .submit_and_wait(&txn, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.outcome, TransactionOutcome::TimedOut);
    assert!(started.elapsed() <= Duration::from_secs(2));

    // The transaction still lands after the caller stopped waiting.
    tokio::time::advance(Duration::from_secs(5)).await;
    let later = network.transaction_status(result.hash).await.unwrap();
    assert!(matches!(later.status, TransactionStatus::Committed(_)));
}

#[tokio::test(start_paused = true)]
async fn test_stale_sequence_number_is_rejected_without_polling() {
    let account = account();
    let network =
        Arc::new(SimulatedNetwork::new(Duration::from_secs(1)).with_sequence_number(account.address(), 5));
    let submitter = TransactionSubmitter::new(network.clone(), budget(Duration::from_secs(30)));
    let txn = signed(&account, 4, now_secs() + 600);

    let started = Instant::now();
    let result = submitter
        .submit_and_wait(&txn, &CancellationToken::new())
        .await
        .unwrap();

    let TransactionOutcome::Rejected(reason) = &result.outcome else {
        panic!("expected a rejection, got {:?}", result.outcome);
    };
    assert_eq!(reason.vm_error_code, Some(3));
    assert_eq!(result.hash, txn.hash().unwrap());
    assert_eq!(network.submissions(), 1);
    assert_eq!(network.polls(), 0);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_expired_when_ledger_passes_expiration() {
    let account = account();
    let expiration = now_secs() + 600;
    let network = Arc::new(SimulatedNetwork {
        drop_submissions: true,
        ledger_start_secs: expiration - 1,
        ..SimulatedNetwork::new(Duration::from_secs(1))
    });
    let submitter = TransactionSubmitter::new(network.clone(), budget(Duration::from_secs(30)));
    let txn = signed(&account, 0, expiration);

    let started = Instant::now();
    let result = submitter
        .submit_and_wait(&txn, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.outcome, TransactionOutcome::Expired);
    // Polls at 0, 200, 600, 1400 ms; the ledger clock passes the expiration at 1000 ms.
    assert_elapsed(started, 1400);
    assert_eq!(network.polls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_transient_poll_errors_are_retried() {
    let account = account();
    let network = Arc::new(
        SimulatedNetwork::new(Duration::ZERO)
            .failing_polls(2, || PipelineError::api(503, "Service unavailable")),
    );
    let submitter = TransactionSubmitter::new(network.clone(), budget(Duration::from_secs(30)));
    let txn = signed(&account, 0, now_secs() + 600);

    let result = submitter
        .submit_and_wait(&txn, &CancellationToken::new())
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(network.polls(), 3);
    assert_eq!(network.submissions(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_persistent_poll_errors_degrade_to_timed_out() {
    let account = account();
    let network = Arc::new(
        SimulatedNetwork::new(Duration::ZERO)
            .failing_polls(u32::MAX, || PipelineError::api(502, "Bad gateway")),
    );
    let config = budget(Duration::from_secs(30)).with_max_transient_errors(3);
    let submitter = TransactionSubmitter::new(network.clone(), config);
    let txn = signed(&account, 0, now_secs() + 600);

    let result = submitter
        .submit_and_wait(&txn, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.outcome, TransactionOutcome::TimedOut);
    assert_eq!(network.polls(), 4);
    assert_eq!(network.submissions(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_non_transient_poll_error_is_returned() {
    let account = account();
    let network = Arc::new(
        SimulatedNetwork::new(Duration::ZERO)
            .failing_polls(1, || PipelineError::api(400, "invalid hash")),
    );
    let submitter = TransactionSubmitter::new(network, budget(Duration::from_secs(30)));
    let txn = signed(&account, 0, now_secs() + 600);

    let err = submitter
        .submit_and_wait(&txn, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(400));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_stops_polling() {
    let account = account();
    let network = Arc::new(SimulatedNetwork::new(Duration::from_secs(60)));
    let submitter = TransactionSubmitter::new(network.clone(), budget(Duration::from_secs(30)));
    let txn = signed(&account, 0, now_secs() + 600);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = submitter.submit_and_wait(&txn, &cancel).await.unwrap();

    assert_eq!(result.outcome, TransactionOutcome::TimedOut);
    assert_elapsed(started, 500);
    let polls = network.polls();
    assert_eq!(polls, 2);

    tokio::time::advance(Duration::from_secs(5)).await;
    assert_eq!(network.polls(), polls);
}

#[tokio::test(start_paused = true)]
async fn test_already_cancelled_wait_does_not_poll() {
    let network = Arc::new(SimulatedNetwork::new(Duration::ZERO));
    let submitter = TransactionSubmitter::new(network.clone(), ConfirmationConfig::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = submitter
        .wait_for_confirmation(HashValue::ZERO, now_secs() + 600, &cancel)
        .await
        .unwrap();
    assert_eq!(result.outcome, TransactionOutcome::TimedOut);
    assert_eq!(network.polls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_already_cancelled_flow_does_not_submit() {
    let account = account();
    let network = Arc::new(SimulatedNetwork::new(Duration::ZERO));
    let submitter = TransactionSubmitter::new(network.clone(), ConfirmationConfig::default());
    let txn = signed(&account, 0, now_secs() + 600);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = submitter.submit_and_wait(&txn, &cancel).await.unwrap();

    assert_eq!(result.outcome, TransactionOutcome::TimedOut);
    assert_eq!(result.hash, txn.hash().unwrap());
    assert_eq!(network.submissions(), 0);
    assert_eq!(network.polls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_zero_poll_interval_is_floored() {
    let account = account();
    let network = Arc::new(SimulatedNetwork::new(Duration::from_secs(60)));
    let config = budget(Duration::from_millis(200)).with_poll_interval(
        Duration::ZERO,
        Duration::ZERO,
        2,
    );
    let submitter = TransactionSubmitter::new(network.clone(), config);
    let txn = signed(&account, 0, now_secs() + 600);

    let started = Instant::now();
    let result = submitter
        .submit_and_wait(&txn, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.outcome, TransactionOutcome::TimedOut);
    assert_elapsed(started, 200);
    // One poll every 10 ms: 0, 10, ..., 190.
    assert_eq!(network.polls(), 20);
}

#[tokio::test(start_paused = true)]
async fn test_zero_backoff_multiplier_keeps_interval() {
    let account = account();
    let network = Arc::new(SimulatedNetwork::new(Duration::from_secs(60)));
    let config = ConfirmationConfig {
        timeout: Duration::from_secs(1),
        initial_poll_interval: Duration::from_millis(100),
        backoff_multiplier: 0,
        ..ConfirmationConfig::default()
    };
    let submitter = TransactionSubmitter::new(network.clone(), config);
    let txn = signed(&account, 0, now_secs() + 600);

    let result = submitter
        .submit_and_wait(&txn, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.outcome, TransactionOutcome::TimedOut);
    assert_eq!(network.polls(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_pipeline_reads_builds_signs_and_confirms() {
    let account = account();
    let network = Arc::new(
        SimulatedNetwork::new(Duration::from_millis(300)).with_sequence_number(account.address(), 5),
    );
    let pipeline = TransactionPipeline::with_network(network.clone(), budget(Duration::from_secs(30)));
    let options = TransactionOptions::default()
        .with_max_gas_amount(1_000_000)
        .with_gas_unit_price(1)
        .with_expiration_secs(10);

    let payload = EntryFunction::apt_transfer(AccountAddress::ONE, 717).unwrap();
    let raw = pipeline
        .build_transaction(account.address(), payload.clone().into(), options)
        .await
        .unwrap();
    assert_eq!(raw.sequence_number, 5);
    assert_eq!(raw.chain_id, CHAIN_ID);
    assert_eq!(raw.max_gas_amount, 1_000_000);
    assert!(raw.expiration_timestamp_secs > now_secs());

    let result = pipeline
        .sign_submit_and_wait(&account, payload.into(), options, &CancellationToken::new())
        .await
        .unwrap();
    assert!(result.is_success());
    assert_eq!(network.submissions(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_pipeline_refuses_unexpected_chain() {
    let account = account();
    let network = Arc::new(SimulatedNetwork::new(Duration::ZERO));
    let pipeline = TransactionPipeline::with_network(network.clone(), ConfirmationConfig::default())
        .expect_chain_id(ChainId::mainnet());

    let payload = EntryFunction::apt_transfer(AccountAddress::ONE, 717).unwrap();
    let err = pipeline
        .sign_submit_and_wait(
            &account,
            payload.into(),
            TransactionOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
    assert_eq!(network.submissions(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_flows_share_one_network() {
    let network = Arc::new(SimulatedNetwork::new(Duration::from_millis(500)));
    let submitter = Arc::new(TransactionSubmitter::new(
        network.clone(),
        budget(Duration::from_secs(30)),
    ));

    let handles: Vec<_> = (0u8..4)
        .map(|i| {
            let submitter = submitter.clone();
            tokio::spawn(async move {
                let sender = Ed25519Account::from_private_key(
                    Ed25519PrivateKey::from_bytes(&[i + 1; 32]).unwrap(),
                );
                let txn = signed(&sender, 0, now_secs() + 600);
                submitter
                    .submit_and_wait(&txn, &CancellationToken::new())
                    .await
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_success());
    }
    assert_eq!(network.submissions(), 4);
}
