/// Transaction codec
///
/// Encodes the Cosmos SDK transaction envelope (TxBody, AuthInfo, SignDoc,
/// TxRaw) from arcade messages and decodes the JSON answers of the REST
/// gateway. Every encoder validates its input first so a malformed value
/// fails with a descriptive error instead of producing truncated bytes.

use prost::Message;
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::chain::account_types::{AccountInfo, AccountJson};
use crate::chain::messages::ArcadeMsg;
use crate::chain::proto::{
    Any, AuthInfo, Coin, Fee, ModeInfo, PubKey, SignDoc, SignerInfo, TxBody, TxRaw,
    PUB_KEY_TYPE_URL,
};
use crate::error::{Result, TxError};

pub const COMPRESSED_PUB_KEY_LEN: usize = 33;
pub const SIGNATURE_LEN: usize = 64;

/// Encode messages and memo into TxBody bytes
pub fn encode_tx_body(messages: &[ArcadeMsg], memo: &str) -> Result<Vec<u8>> {
    if messages.is_empty() {
        return Err(TxError::encoding("transaction must carry at least one message"));
    }

    let anys = messages
        .iter()
        .map(ArcadeMsg::to_any)
        .collect::<Result<Vec<Any>>>()?;

    let body = TxBody {
        messages: anys,
        memo: memo.to_string(),
        timeout_height: 0,
        extension_options: vec![],
        non_critical_extension_options: vec![],
    };

    Ok(body.encode_to_vec())
}

/// Inverse of [`encode_tx_body`]
pub fn decode_tx_body(bytes: &[u8]) -> Result<(Vec<ArcadeMsg>, String)> {
    let body = TxBody::decode(bytes)?;
    let messages = body
        .messages
        .iter()
        .map(ArcadeMsg::from_any)
        .collect::<Result<Vec<_>>>()?;
    Ok((messages, body.memo))
}

/// Encode a single-signer AuthInfo in SIGN_MODE_DIRECT
pub fn encode_auth_info(pub_key: &[u8], sequence: u64, fee: &Fee) -> Result<Vec<u8>> {
    if pub_key.len() != COMPRESSED_PUB_KEY_LEN {
        return Err(TxError::encoding(format!(
            "public key must be {} bytes (compressed secp256k1), got {}",
            COMPRESSED_PUB_KEY_LEN,
            pub_key.len()
        )));
    }
    validate_fee(fee)?;

    let pub_key_any = Any {
        type_url: PUB_KEY_TYPE_URL.to_string(),
        value: PubKey { key: pub_key.to_vec() }.encode_to_vec(),
    };

    let auth_info = AuthInfo {
        signer_infos: vec![SignerInfo {
            public_key: Some(pub_key_any),
            mode_info: Some(ModeInfo::direct()),
            sequence,
        }],
        fee: Some(fee.clone()),
    };

    Ok(auth_info.encode_to_vec())
}

fn validate_fee(fee: &Fee) -> Result<()> {
    for coin in &fee.amount {
        if coin.denom.is_empty() {
            return Err(TxError::encoding("fee coin has an empty denom"));
        }
        if coin.amount.is_empty() || !coin.amount.chars().all(|c| c.is_ascii_digit()) {
            return Err(TxError::encoding(format!(
                "fee amount {:?} is not an integer string",
                coin.amount
            )));
        }
    }
    Ok(())
}

/// Assemble the broadcastable TxRaw
pub fn encode_tx_raw(body: &[u8], auth_info: &[u8], signatures: &[Vec<u8>]) -> Result<Vec<u8>> {
    if body.is_empty() || auth_info.is_empty() {
        return Err(TxError::encoding("body and auth info bytes must not be empty"));
    }
    if signatures.is_empty() {
        return Err(TxError::encoding("transaction must carry a signature"));
    }
    if let Some(bad) = signatures.iter().find(|s| s.len() != SIGNATURE_LEN) {
        return Err(TxError::encoding(format!(
            "signature must be {} bytes, got {}",
            SIGNATURE_LEN,
            bad.len()
        )));
    }

    let raw = TxRaw {
        body_bytes: body.to_vec(),
        auth_info_bytes: auth_info.to_vec(),
        signatures: signatures.to_vec(),
    };
    Ok(raw.encode_to_vec())
}

/// Canonical bytes a wallet signs
pub fn sign_doc_bytes(doc: &SignDoc) -> Vec<u8> {
    doc.encode_to_vec()
}

/// Upper-case hex SHA-256 of the TxRaw bytes, as the chain reports it
pub fn tx_hash(tx_raw: &[u8]) -> String {
    hex::encode_upper(Sha256::digest(tx_raw))
}

/// Fee with a single coin
pub fn fee(denom: &str, amount: u128, gas_limit: u64) -> Fee {
    Fee {
        amount: vec![Coin {
            denom: denom.to_string(),
            amount: amount.to_string(),
        }],
        gas_limit,
        payer: String::new(),
        granter: String::new(),
    }
}

// ---------------------------------------------------------------------------
// JSON decoders
// ---------------------------------------------------------------------------

/// Parsed `tx_response` of a sync broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastResult {
    pub tx_hash: String,
    /// 0 means accepted into the mempool, not finalized
    pub code: u32,
    pub raw_log: String,
}

impl BroadcastResult {
    pub fn is_accepted(&self) -> bool {
        self.code == 0
    }
}

#[derive(Deserialize)]
struct BroadcastEnvelope {
    tx_response: Option<TxResponseJson>,
}

#[derive(Deserialize)]
struct TxResponseJson {
    #[serde(default)]
    txhash: String,
    #[serde(default, deserialize_with = "de_u64_lenient")]
    code: u64,
    #[serde(default)]
    raw_log: String,
}

pub fn decode_broadcast_response(value: Value) -> Result<BroadcastResult> {
    let envelope: BroadcastEnvelope = serde_json::from_value(value)
        .map_err(|e| TxError::encoding(format!("malformed broadcast response: {}", e)))?;
    let response = envelope
        .tx_response
        .ok_or_else(|| TxError::encoding("broadcast response has no tx_response"))?;
    let code = u32::try_from(response.code)
        .map_err(|_| TxError::encoding(format!("result code {} out of range", response.code)))?;

    Ok(BroadcastResult {
        tx_hash: response.txhash,
        code,
        raw_log: response.raw_log,
    })
}

/// Gateway error object (`{"code": 3, "message": "..."}`)
pub fn decode_gateway_error(body: &str) -> Option<(u32, String)> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = value.get("message")?.as_str()?.to_string();
    let code = value
        .get("code")
        .and_then(Value::as_u64)
        .and_then(|c| u32::try_from(c).ok())
        .filter(|c| *c != 0)?;
    Some((code, message))
}

/// Read `gas_info.gas_used`; absent, non-numeric or zero is an error
pub fn decode_simulate_response(value: &Value) -> Result<u64> {
    let raw = value
        .get("gas_info")
        .and_then(|g| g.get("gas_used"))
        .ok_or_else(|| TxError::SimulationUnavailable("response has no gas_info.gas_used".into()))?;

    let gas_used = match raw {
        Value::String(s) => s.trim().parse::<i128>().ok(),
        Value::Number(n) => n.as_i64().map(i128::from),
        _ => None,
    }
    .ok_or_else(|| TxError::SimulationUnavailable(format!("gas_used {} is not an integer", raw)))?;

    if gas_used <= 0 {
        return Err(TxError::SimulationUnavailable(format!(
            "gas_used {} is not positive",
            gas_used
        )));
    }
    u64::try_from(gas_used)
        .map_err(|_| TxError::SimulationUnavailable(format!("gas_used {} overflows", gas_used)))
}

pub fn decode_account_response(value: Value) -> Result<AccountInfo> {
    #[derive(Deserialize)]
    struct Envelope {
        account: Option<AccountJson>,
    }

    let envelope: Envelope = serde_json::from_value(value)
        .map_err(|e| TxError::encoding(format!("malformed account response: {}", e)))?;
    let account = envelope
        .account
        .ok_or_else(|| TxError::encoding("account response has no account"))?;
    account.info()
}

/// Session status as reported by the sessions endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Ended,
    Other(String),
}

impl SessionStatus {
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_ascii_lowercase();
        let normalized = lowered.trim_start_matches("session_status_");
        match normalized {
            "active" | "in_progress" | "started" => SessionStatus::Active,
            "ended" | "completed" | "finished" | "expired" => SessionStatus::Ended,
            _ => SessionStatus::Other(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: u64,
    pub status: SessionStatus,
    pub game_id: String,
    pub player: String,
}

pub fn decode_sessions_response(value: Value) -> Result<Vec<SessionRecord>> {
    #[derive(Deserialize)]
    struct Envelope {
        #[serde(default)]
        sessions: Vec<SessionJson>,
    }

    #[derive(Deserialize)]
    struct SessionJson {
        #[serde(alias = "session_id", deserialize_with = "de_u64_lenient")]
        id: u64,
        #[serde(default)]
        status: String,
        #[serde(default)]
        game_id: String,
        #[serde(default)]
        player: String,
    }

    let envelope: Envelope = serde_json::from_value(value)
        .map_err(|e| TxError::encoding(format!("malformed sessions response: {}", e)))?;

    Ok(envelope
        .sessions
        .into_iter()
        .map(|s| SessionRecord {
            id: s.id,
            status: SessionStatus::parse(&s.status),
            game_id: s.game_id,
            player: s.player,
        })
        .collect())
}

/// Cosmos REST encodes 64-bit integers as strings; accept both forms.
/// `null` is malformed; a missing field is left to `#[serde(default)]`.
pub(crate) fn de_u64_lenient<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::String(s) => s.trim().parse::<u64>().map_err(D::Error::custom),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom(format!("{} is not an unsigned integer", n))),
        other => Err(D::Error::custom(format!("expected integer, got {}", other))),
    }
}
