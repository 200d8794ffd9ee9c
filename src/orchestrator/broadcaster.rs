use lazy_static::lazy_static;
use regex::Regex;

use crate::chain::codec::{self, BroadcastResult};
use crate::chain::gateway::ChainGateway;
use crate::error::{Result, TxError};

lazy_static! {
    static ref SEQUENCE_MISMATCH: Regex =
        Regex::new(r"(?is)account sequence mismatch.*?expected\D*?(\d+).*?got\D*?(\d+)")
            .unwrap();
    static ref MESSAGE_INDEX_PREFIX: Regex =
        Regex::new(r"^failed to execute message; message index: \d+: ").unwrap();
}

/// Sequence numbers extracted from a mismatch log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceMismatch {
    pub expected: u64,
    pub got: u64,
}

/// Find "account sequence mismatch ... expected E ... got G" anywhere in a log
pub fn parse_sequence_mismatch(raw_log: &str) -> Option<SequenceMismatch> {
    let caps = SEQUENCE_MISMATCH.captures(raw_log)?;
    let expected = caps.get(1)?.as_str().parse().ok()?;
    let got = caps.get(2)?.as_str().parse().ok()?;
    Some(SequenceMismatch { expected, got })
}

/// Chain log with the per-message execution prefix stripped
pub fn readable_reason(raw_log: &str) -> String {
    let trimmed = raw_log.trim();
    if trimmed.is_empty() {
        return "no reason given".to_string();
    }
    MESSAGE_INDEX_PREFIX.replace(trimmed, "").into_owned()
}

/// Sync-mode broadcast. Only network failures are errors here; any answer
/// the chain gave, accepted or not, comes back as a `BroadcastResult`.
pub async fn broadcast(gateway: &dyn ChainGateway, tx_bytes: &[u8]) -> Result<BroadcastResult> {
    let mut result = match gateway.broadcast(tx_bytes).await {
        Ok(value) => codec::decode_broadcast_response(value)?,
        Err(TxError::Transport { status, message }) => match codec::decode_gateway_error(&message) {
            Some((code, reason)) => {
                log::debug!("Gateway answered HTTP {:?} with code {}", status, code);
                BroadcastResult {
                    tx_hash: String::new(),
                    code,
                    raw_log: reason,
                }
            }
            None => return Err(TxError::Transport { status, message }),
        },
        Err(e) => return Err(e),
    };

    if result.tx_hash.is_empty() {
        result.tx_hash = codec::tx_hash(tx_bytes);
    }

    if result.is_accepted() {
        log::info!("Transaction {} accepted into mempool", result.tx_hash);
    } else {
        log::warn!(
            "Transaction {} rejected with code {}: {}",
            result.tx_hash,
            result.code,
            readable_reason(&result.raw_log)
        );
    }

    Ok(result)
}
