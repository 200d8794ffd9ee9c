/// Transaction pipeline
///
/// Drives one submission end to end: sequence lookup, gas estimation, fee,
/// wallet signature and sync broadcast. A pipeline runs a single submission
/// at a time; a concurrent call fails fast instead of queuing. An account
/// sequence mismatch reported by the chain is reconciled and retried
/// exactly once.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};

use crate::chain::codec::BroadcastResult;
use crate::chain::gateway::ChainGateway;
use crate::chain::messages::ArcadeMsg;
use crate::chain::tx_builder::{SignerData, TxSigner};
use crate::chain::wallet::Wallet;
use crate::config::Config;
use crate::error::{Result, TxError};
use crate::orchestrator::broadcaster::{self, parse_sequence_mismatch, readable_reason};
use crate::orchestrator::fee::FeeCalculator;
use crate::orchestrator::gas::GasEstimator;
use crate::orchestrator::sequence::{AccountSequence, SequenceTracker};
use crate::orchestrator::session_resolver::SessionResolver;

/// Where a submission currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineState {
    Idle,
    BuildingAttempt,
    AwaitingSignature,
    Broadcasting,
    MismatchDetected,
    Success,
    Failed,
}

/// Tracks state transitions of one submission for the log
struct Progress {
    state: PipelineState,
    attempt: u32,
}

impl Progress {
    fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            attempt: 0,
        }
    }

    fn enter(&mut self, next: PipelineState) {
        if next == PipelineState::BuildingAttempt {
            self.attempt += 1;
        }
        log::debug!("Attempt {}: {:?} -> {:?}", self.attempt, self.state, next);
        self.state = next;
    }

    /// Record a failure on the way out
    fn fail(&mut self, e: TxError) -> TxError {
        self.enter(PipelineState::Failed);
        e
    }
}

pub struct TxPipeline {
    gateway: Arc<dyn ChainGateway>,
    wallet: Arc<dyn Wallet>,
    signer: TxSigner,
    estimator: GasEstimator,
    fees: FeeCalculator,
    resolver: SessionResolver,
    retry_delay: Duration,
    /// Held for the whole of a submission
    tracker: Mutex<SequenceTracker>,
}

impl TxPipeline {
    pub fn new(
        config: &Config,
        gateway: Arc<dyn ChainGateway>,
        wallet: Arc<dyn Wallet>,
    ) -> Result<Self> {
        Ok(Self {
            gateway,
            wallet,
            signer: TxSigner::new(&config.chain.chain_id, config.pipeline.signing_timeout()),
            estimator: GasEstimator::new(&config.pipeline),
            fees: FeeCalculator::from_config(&config.chain)?,
            resolver: SessionResolver::from_config(&config.resolver),
            retry_delay: config.pipeline.mismatch_retry_delay(),
            tracker: Mutex::new(SequenceTracker::new()),
        })
    }

    pub fn chain_id(&self) -> &str {
        self.signer.chain_id()
    }

    /// Sign and broadcast `messages` as one transaction.
    ///
    /// Returns once the chain accepted the transaction into its mempool.
    /// Fails with `InProgress` while another submission is running.
    pub async fn submit(&self, messages: &[ArcadeMsg], memo: &str) -> Result<BroadcastResult> {
        let mut tracker = self.tracker.try_lock().map_err(|_| TxError::InProgress)?;
        let mut progress = Progress::new();

        if messages.is_empty() {
            return Err(TxError::encoding("transaction must carry at least one message"));
        }

        let key = self.wallet.get_key(self.chain_id()).await?;
        if let Some(foreign) = messages.iter().find(|m| m.creator() != key.address) {
            return Err(TxError::encoding(format!(
                "{} creator {} does not match wallet address {}",
                foreign.type_url(),
                foreign.creator(),
                key.address
            )));
        }

        let mut mismatch_seen = false;
        loop {
            progress.enter(PipelineState::BuildingAttempt);

            let account = tracker
                .get(self.gateway.as_ref(), &key.address)
                .await
                .map_err(|e| progress.fail(e))?;
            let estimate = self
                .estimator
                .estimate(self.gateway.as_ref(), messages, memo, &key.pub_key, account.sequence)
                .await
                .map_err(|e| progress.fail(e))?;
            let fee = self.fees.fee_for(estimate.gas_used);

            progress.enter(PipelineState::AwaitingSignature);
            let data = SignerData {
                account_number: account.account_number,
                sequence: account.sequence,
            };
            let signed = self
                .signer
                .sign(self.wallet.as_ref(), &key, data, messages, memo, &fee)
                .await
                .map_err(|e| progress.fail(e))?;

            progress.enter(PipelineState::Broadcasting);
            let result = broadcaster::broadcast(self.gateway.as_ref(), &signed.tx_bytes)
                .await
                .map_err(|e| progress.fail(e))?;

            if let Some(mismatch) = parse_sequence_mismatch(&result.raw_log) {
                progress.enter(PipelineState::MismatchDetected);
                if mismatch_seen {
                    log::error!(
                        "Sequence mismatch again after reconciling (expected {}, got {})",
                        mismatch.expected,
                        mismatch.got
                    );
                    return Err(progress.fail(TxError::SequenceMismatch {
                        expected: mismatch.expected,
                        got: mismatch.got,
                    }));
                }
                mismatch_seen = true;

                log::warn!(
                    "Sequence mismatch (expected {}, got {}), retrying once",
                    mismatch.expected,
                    mismatch.got
                );
                tracker.reconcile(&key.address, account.account_number, mismatch.expected);
                sleep(self.retry_delay).await;
                continue;
            }

            if !result.is_accepted() {
                return Err(progress.fail(TxError::ApplicationRejected {
                    code: result.code,
                    reason: readable_reason(&result.raw_log),
                    tx_hash: result.tx_hash,
                }));
            }

            tracker.mark_submitted(&key.address, account.account_number, account.sequence);
            progress.enter(PipelineState::Success);
            return Ok(result);
        }
    }

    /// Id of the session a just-accepted StartSession created for this wallet
    pub async fn resolve_session_id(&self, game_id: &str) -> Result<u64> {
        let key = self.wallet.get_key(self.chain_id()).await?;
        self.resolver
            .resolve(self.gateway.as_ref(), &key.address, game_id)
            .await
    }

    /// Cached sequence for `address`; waits for a running submission
    pub async fn cached_sequence(&self, address: &str) -> Option<AccountSequence> {
        self.tracker.lock().await.cached(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::proto::{AuthInfo, TxRaw};
    use crate::testing::{accepted, http_error, rejected, FakeWallet, ScriptedGateway, PLAYER};
    use prost::Message;

    fn config() -> Config {
        let mut config = Config::default();
        config.pipeline.mismatch_retry_delay_ms = 1;
        config
    }

    fn pipeline(gateway: Arc<ScriptedGateway>, wallet: Arc<FakeWallet>) -> TxPipeline {
        TxPipeline::new(&config(), gateway, wallet).unwrap()
    }

    fn auth_info(tx_bytes: &[u8]) -> AuthInfo {
        let raw = TxRaw::decode(tx_bytes).unwrap();
        AuthInfo::decode(raw.auth_info_bytes.as_slice()).unwrap()
    }

    fn insert_coin() -> Vec<ArcadeMsg> {
        vec![ArcadeMsg::insert_coin(PLAYER, "pacman", 1)]
    }

    #[tokio::test]
    async fn test_submit_success_advances_sequence() {
        let gateway = Arc::new(ScriptedGateway::new().with_account(4, 5));
        let wallet = Arc::new(FakeWallet::new());
        let pipeline = pipeline(gateway.clone(), wallet.clone());

        let result = pipeline.submit(&insert_coin(), "").await.unwrap();
        assert_eq!(result.tx_hash, "HASH1");
        assert_eq!(pipeline.cached_sequence(PLAYER).await.unwrap().sequence, 6);

        let auth = auth_info(&gateway.broadcasted()[0]);
        assert_eq!(auth.signer_infos[0].sequence, 5);
        // default simulation reports 100000 gas
        assert_eq!(auth.fee.unwrap().gas_limit, 130_000);
        assert_eq!(wallet.signed_docs()[0].account_number, 4);
    }

    #[tokio::test]
    async fn test_back_to_back_submits_use_cached_sequence() {
        let gateway = Arc::new(ScriptedGateway::new().with_account(4, 5));
        let pipeline = pipeline(gateway.clone(), Arc::new(FakeWallet::new()));

        pipeline.submit(&insert_coin(), "").await.unwrap();
        pipeline.submit(&insert_coin(), "").await.unwrap();

        let sent = gateway.broadcasted();
        assert_eq!(auth_info(&sent[0]).signer_infos[0].sequence, 5);
        assert_eq!(auth_info(&sent[1]).signer_infos[0].sequence, 6);
        assert_eq!(pipeline.cached_sequence(PLAYER).await.unwrap().sequence, 7);
    }

    #[tokio::test]
    async fn test_concurrent_submit_is_rejected() {
        let gateway = Arc::new(ScriptedGateway::new().with_account(1, 5));
        let (wallet, entered, release) = FakeWallet::gated();
        let pipeline = Arc::new(pipeline(gateway.clone(), Arc::new(wallet)));

        let first = {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.submit(&insert_coin(), "").await })
        };
        entered.notified().await;

        let err = pipeline.submit(&insert_coin(), "").await.unwrap_err();
        assert!(matches!(err, TxError::InProgress));
        assert_eq!(gateway.account_queries(), 1);

        release.notify_one();
        first.await.unwrap().unwrap();
        assert_eq!(pipeline.cached_sequence(PLAYER).await.unwrap().sequence, 6);
        assert_eq!(gateway.broadcasted().len(), 1);
    }

    #[tokio::test]
    async fn test_simulation_failure_uses_fallback() {
        let gateway = Arc::new(ScriptedGateway::new().with_account(1, 0));
        gateway.push_simulate(Err(http_error(500, "internal error")));
        let pipeline = pipeline(gateway.clone(), Arc::new(FakeWallet::new()));

        let msgs = vec![
            ArcadeMsg::insert_coin(PLAYER, "pacman", 1),
            ArcadeMsg::start_session(PLAYER, "pacman"),
        ];
        pipeline.submit(&msgs, "").await.unwrap();

        // fallback 670000 gas used -> limit ceil(670000 × 1.25) + 5000
        let fee = auth_info(&gateway.broadcasted()[0]).fee.unwrap();
        assert_eq!(fee.gas_limit, 842_500);
        assert_eq!(fee.amount[0].amount, "21063");
    }

    #[tokio::test]
    async fn test_mismatch_reconciles_and_retries_once() {
        let gateway = Arc::new(ScriptedGateway::new().with_account(1, 6));
        gateway.push_broadcast(Ok(rejected(
            "HASH1",
            0,
            "account sequence mismatch, expected 7, got 6: incorrect account sequence",
        )));
        let wallet = Arc::new(FakeWallet::new());
        let pipeline = pipeline(gateway.clone(), wallet.clone());

        let result = pipeline.submit(&insert_coin(), "").await.unwrap();
        assert_eq!(result.tx_hash, "HASH2");

        let sent = gateway.broadcasted();
        assert_eq!(sent.len(), 2);
        assert_eq!(auth_info(&sent[0]).signer_infos[0].sequence, 6);
        assert_eq!(auth_info(&sent[1]).signer_infos[0].sequence, 7);
        assert_eq!(wallet.signed_docs().len(), 2);
        assert_eq!(pipeline.cached_sequence(PLAYER).await.unwrap().sequence, 8);
    }

    #[tokio::test]
    async fn test_second_mismatch_is_terminal() {
        let gateway = Arc::new(ScriptedGateway::new().with_account(1, 6));
        gateway.push_broadcast(Ok(rejected("A", 32, "account sequence mismatch, expected 7, got 6")));
        gateway.push_broadcast(Ok(rejected("B", 32, "account sequence mismatch, expected 9, got 7")));
        let pipeline = pipeline(gateway.clone(), Arc::new(FakeWallet::new()));

        let err = pipeline.submit(&insert_coin(), "").await.unwrap_err();
        assert!(matches!(err, TxError::SequenceMismatch { expected: 9, got: 7 }));
        assert_eq!(gateway.broadcasted().len(), 2);

        // lock released on the error path
        gateway.push_broadcast(Ok(accepted("C")));
        assert!(pipeline.submit(&insert_coin(), "").await.is_ok());
    }

    #[tokio::test]
    async fn test_signing_declined_is_not_retried() {
        let gateway = Arc::new(ScriptedGateway::new().with_account(1, 2));
        let pipeline = pipeline(gateway.clone(), Arc::new(FakeWallet::declining()));

        let err = pipeline.submit(&insert_coin(), "").await.unwrap_err();
        assert!(matches!(err, TxError::SigningDeclined(_)));
        assert!(gateway.broadcasted().is_empty());
        assert_eq!(pipeline.cached_sequence(PLAYER).await.unwrap().sequence, 2);
    }

    #[tokio::test]
    async fn test_application_rejection() {
        let gateway = Arc::new(ScriptedGateway::new().with_account(1, 2));
        gateway.push_broadcast(Ok(rejected(
            "BAD",
            5,
            "failed to execute message; message index: 0: insufficient credits",
        )));
        let pipeline = pipeline(gateway.clone(), Arc::new(FakeWallet::new()));

        let err = pipeline.submit(&insert_coin(), "").await.unwrap_err();
        match err {
            TxError::ApplicationRejected { code, reason, tx_hash } => {
                assert_eq!(code, 5);
                assert_eq!(reason, "insufficient credits");
                assert_eq!(tx_hash, "BAD");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(gateway.broadcasted().len(), 1);
        assert_eq!(pipeline.cached_sequence(PLAYER).await.unwrap().sequence, 2);
    }

    #[tokio::test]
    async fn test_creator_must_match_wallet() {
        let gateway = Arc::new(ScriptedGateway::new().with_account(1, 2));
        let pipeline = pipeline(gateway.clone(), Arc::new(FakeWallet::new()));

        let msgs = vec![ArcadeMsg::insert_coin("arcade1someoneelse", "pacman", 1)];
        let err = pipeline.submit(&msgs, "").await.unwrap_err();
        assert!(matches!(err, TxError::Encoding(_)));
        assert_eq!(gateway.account_queries(), 0);
    }

    #[tokio::test]
    async fn test_empty_message_list_fails_before_network() {
        let gateway = Arc::new(ScriptedGateway::new().with_account(1, 2));
        let pipeline = pipeline(gateway.clone(), Arc::new(FakeWallet::new()));

        let err = pipeline.submit(&[], "").await.unwrap_err();
        assert!(matches!(err, TxError::Encoding(_)));
        assert_eq!(gateway.account_queries(), 0);
        assert!(gateway.simulated().is_empty());
    }

    #[tokio::test]
    async fn test_unfunded_account_propagates() {
        let gateway = Arc::new(ScriptedGateway::new());
        let pipeline = pipeline(gateway.clone(), Arc::new(FakeWallet::new()));

        let err = pipeline.submit(&insert_coin(), "").await.unwrap_err();
        assert!(matches!(err, TxError::AccountNotFound { .. }));
        assert!(gateway.simulated().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_session_id_uses_wallet_address() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_sessions(Ok(serde_json::json!({
            "sessions": [{"id": "12", "status": "SESSION_STATUS_ACTIVE", "player": PLAYER}]
        })));
        let pipeline = pipeline(gateway.clone(), Arc::new(FakeWallet::new()));

        assert_eq!(pipeline.resolve_session_id("pacman").await.unwrap(), 12);
    }
}
