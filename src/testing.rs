//! Scripted stand-ins for the gateway and wallet used across unit tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::chain::gateway::ChainGateway;
use crate::chain::proto::SignDoc;
use crate::chain::wallet::{DirectSignResponse, Signature, Wallet, WalletKey};
use crate::error::{Result, TxError};

pub const PLAYER: &str = "arcade1player";
pub const CHAIN_ID: &str = "arcade-1";

pub fn pub_key() -> Vec<u8> {
    let mut key = vec![0x02];
    key.extend_from_slice(&[0x11; 32]);
    key
}

pub fn accepted(hash: &str) -> Value {
    json!({"tx_response": {"txhash": hash, "code": 0, "raw_log": "[]"}})
}

pub fn rejected(hash: &str, code: u32, raw_log: &str) -> Value {
    json!({"tx_response": {"txhash": hash, "code": code, "raw_log": raw_log}})
}

pub fn http_error(status: u16, body: &str) -> TxError {
    TxError::Transport {
        status: Some(status),
        message: body.to_string(),
    }
}

#[derive(Default)]
struct GatewayState {
    account: Option<(u64, u64)>,
    account_queries: usize,
    simulate: VecDeque<Result<Value>>,
    simulated: Vec<Vec<u8>>,
    broadcast: VecDeque<Result<Value>>,
    broadcasted: Vec<Vec<u8>>,
    sessions: VecDeque<Result<Value>>,
    session_queries: usize,
}

/// Gateway answering from queues; an empty queue falls back to a benign default
#[derive(Default)]
pub struct ScriptedGateway {
    state: Mutex<GatewayState>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, account_number: u64, sequence: u64) -> Self {
        self.state.lock().unwrap().account = Some((account_number, sequence));
        self
    }

    pub fn push_simulate(&self, response: Result<Value>) {
        self.state.lock().unwrap().simulate.push_back(response);
    }

    pub fn push_broadcast(&self, response: Result<Value>) {
        self.state.lock().unwrap().broadcast.push_back(response);
    }

    pub fn push_sessions(&self, response: Result<Value>) {
        self.state.lock().unwrap().sessions.push_back(response);
    }

    pub fn broadcasted(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().broadcasted.clone()
    }

    pub fn simulated(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().simulated.clone()
    }

    pub fn account_queries(&self) -> usize {
        self.state.lock().unwrap().account_queries
    }

    pub fn session_queries(&self) -> usize {
        self.state.lock().unwrap().session_queries
    }
}

#[async_trait]
impl ChainGateway for ScriptedGateway {
    async fn account(&self, address: &str) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        state.account_queries += 1;
        match state.account {
            Some((account_number, sequence)) => Ok(json!({
                "account": {
                    "@type": "/cosmos.auth.v1beta1.BaseAccount",
                    "address": address,
                    "account_number": account_number.to_string(),
                    "sequence": sequence.to_string(),
                }
            })),
            None => Err(TxError::AccountNotFound {
                address: address.to_string(),
            }),
        }
    }

    async fn simulate(&self, tx_bytes: &[u8]) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        state.simulated.push(tx_bytes.to_vec());
        state
            .simulate
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"gas_info": {"gas_wanted": "2000000", "gas_used": "100000"}})))
    }

    async fn broadcast(&self, tx_bytes: &[u8]) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        state.broadcasted.push(tx_bytes.to_vec());
        let n = state.broadcasted.len();
        state
            .broadcast
            .pop_front()
            .unwrap_or_else(|| Ok(accepted(&format!("HASH{}", n))))
    }

    async fn sessions(&self, _player: &str, _game_id: &str) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        state.session_queries += 1;
        state
            .sessions
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"sessions": []})))
    }
}

/// Wallet that signs with a fixed signature, optionally pausing until released
pub struct FakeWallet {
    key: WalletKey,
    decline: bool,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
    signed: Mutex<Vec<SignDoc>>,
}

impl FakeWallet {
    pub fn new() -> Self {
        Self {
            key: WalletKey {
                address: PLAYER.to_string(),
                pub_key: pub_key(),
            },
            decline: false,
            gate: None,
            signed: Mutex::new(Vec::new()),
        }
    }

    pub fn declining() -> Self {
        Self {
            decline: true,
            ..Self::new()
        }
    }

    /// Returns the wallet plus (entered, release) notifiers
    pub fn gated() -> (Self, Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let wallet = Self {
            gate: Some((entered.clone(), release.clone())),
            ..Self::new()
        };
        (wallet, entered, release)
    }

    pub fn signed_docs(&self) -> Vec<SignDoc> {
        self.signed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Wallet for FakeWallet {
    async fn get_key(&self, _chain_id: &str) -> Result<WalletKey> {
        Ok(self.key.clone())
    }

    async fn sign_direct(
        &self,
        _chain_id: &str,
        _address: &str,
        sign_doc: SignDoc,
    ) -> Result<DirectSignResponse> {
        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }
        if self.decline {
            return Err(TxError::SigningDeclined("user rejected the request".to_string()));
        }

        self.signed.lock().unwrap().push(sign_doc.clone());
        Ok(DirectSignResponse {
            signed: sign_doc,
            signature: Signature {
                bytes: vec![0x5a; 64],
                pub_key: self.key.pub_key.clone(),
            },
        })
    }
}
