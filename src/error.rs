use thiserror::Error;

/// Failures surfaced by the transaction pipeline and its collaborators.
#[derive(Debug, Error)]
pub enum TxError {
    /// Network or HTTP failure talking to the gateway
    #[error("transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// Simulation could not produce a usable gas figure
    #[error("simulation unavailable: {0}")]
    SimulationUnavailable(String),

    /// The wallet refused to sign, or did not answer in time
    #[error("signing declined: {0}")]
    SigningDeclined(String),

    /// The chain expected a different account sequence
    #[error("account sequence mismatch: expected {expected}, got {got}")]
    SequenceMismatch { expected: u64, got: u64 },

    /// The transaction was checked and refused with a non-zero code
    #[error("transaction rejected (code {code}): {reason}")]
    ApplicationRejected {
        code: u32,
        reason: String,
        tx_hash: String,
    },

    /// Session polling exhausted its deadline without a match
    #[error("no session found for game {game_id}")]
    SessionNotFound { game_id: String },

    /// Malformed input or response payload
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Another submission currently holds the pipeline
    #[error("a transaction is already in progress")]
    InProgress,

    #[error("account {address} not found on chain (is it funded?)")]
    AccountNotFound { address: String },
}

pub type Result<T> = std::result::Result<T, TxError>;

impl TxError {
    pub fn transport(message: impl Into<String>) -> Self {
        TxError::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        TxError::Encoding(message.into())
    }
}

impl From<reqwest::Error> for TxError {
    fn from(e: reqwest::Error) -> Self {
        TxError::Transport {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl From<prost::DecodeError> for TxError {
    fn from(e: prost::DecodeError) -> Self {
        TxError::Encoding(format!("protobuf decode failed: {}", e))
    }
}

impl From<prost::EncodeError> for TxError {
    fn from(e: prost::EncodeError) -> Self {
        TxError::Encoding(format!("protobuf encode failed: {}", e))
    }
}
