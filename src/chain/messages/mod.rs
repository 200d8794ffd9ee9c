mod achievement;
mod credits;
mod game;
mod session;

pub use achievement::MsgClaimAchievement;
pub use credits::MsgInsertCoin;
pub use game::{MsgRegisterGame, MsgSetHighScoreInitials};
pub use session::{MsgStartSession, MsgSubmitScore, MsgUsePowerUp};

use prost::Message;

use crate::chain::proto::Any;
use crate::error::{Result, TxError};

/// Common surface of every arcade module message
pub trait ArcadeMessage: Message + Default + Sized {
    /// Fully-qualified protobuf type URL
    const TYPE_URL: &'static str;

    /// Address that signs and pays for the message
    fn creator(&self) -> &str;

    /// Field-level checks run before encoding
    fn validate(&self) -> Result<()>;

    fn to_any(&self) -> Result<Any> {
        self.validate()?;
        Ok(Any {
            type_url: Self::TYPE_URL.to_string(),
            value: self.encode_to_vec(),
        })
    }

    fn from_any_value(value: &[u8]) -> Result<Self> {
        Self::decode(value).map_err(|e| {
            TxError::encoding(format!("failed to decode {}: {}", Self::TYPE_URL, e))
        })
    }
}

pub(crate) fn require_non_empty(field: &str, value: &str, type_url: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TxError::encoding(format!("{}: {} must not be empty", type_url, field)));
    }
    Ok(())
}

/// One on-chain operation of the arcade module
#[derive(Debug, Clone, PartialEq)]
pub enum ArcadeMsg {
    InsertCoin(MsgInsertCoin),
    StartSession(MsgStartSession),
    SubmitScore(MsgSubmitScore),
    UsePowerUp(MsgUsePowerUp),
    RegisterGame(MsgRegisterGame),
    ClaimAchievement(MsgClaimAchievement),
    SetHighScoreInitials(MsgSetHighScoreInitials),
}

impl ArcadeMsg {
    pub fn insert_coin(creator: &str, game_id: &str, credits: u64) -> Self {
        ArcadeMsg::InsertCoin(MsgInsertCoin {
            creator: creator.to_string(),
            game_id: game_id.to_string(),
            credits,
        })
    }

    pub fn start_session(creator: &str, game_id: &str) -> Self {
        ArcadeMsg::StartSession(MsgStartSession {
            creator: creator.to_string(),
            game_id: game_id.to_string(),
        })
    }

    pub fn submit_score(creator: &str, session_id: u64, score: u64, level: u64) -> Self {
        ArcadeMsg::SubmitScore(MsgSubmitScore {
            creator: creator.to_string(),
            session_id,
            score,
            level,
        })
    }

    pub fn use_power_up(creator: &str, session_id: u64, power_up: &str) -> Self {
        ArcadeMsg::UsePowerUp(MsgUsePowerUp {
            creator: creator.to_string(),
            session_id,
            power_up: power_up.to_string(),
        })
    }

    pub fn register_game(creator: &str, game_id: &str, name: &str, credits_per_play: u64) -> Self {
        ArcadeMsg::RegisterGame(MsgRegisterGame {
            creator: creator.to_string(),
            game_id: game_id.to_string(),
            name: name.to_string(),
            credits_per_play,
        })
    }

    pub fn claim_achievement(creator: &str, game_id: &str, achievement_id: &str) -> Self {
        ArcadeMsg::ClaimAchievement(MsgClaimAchievement {
            creator: creator.to_string(),
            game_id: game_id.to_string(),
            achievement_id: achievement_id.to_string(),
        })
    }

    pub fn set_high_score_initials(creator: &str, game_id: &str, initials: &str) -> Self {
        ArcadeMsg::SetHighScoreInitials(MsgSetHighScoreInitials {
            creator: creator.to_string(),
            game_id: game_id.to_string(),
            initials: initials.to_string(),
        })
    }

    pub fn creator(&self) -> &str {
        match self {
            ArcadeMsg::InsertCoin(m) => m.creator(),
            ArcadeMsg::StartSession(m) => m.creator(),
            ArcadeMsg::SubmitScore(m) => m.creator(),
            ArcadeMsg::UsePowerUp(m) => m.creator(),
            ArcadeMsg::RegisterGame(m) => m.creator(),
            ArcadeMsg::ClaimAchievement(m) => m.creator(),
            ArcadeMsg::SetHighScoreInitials(m) => m.creator(),
        }
    }

    pub fn type_url(&self) -> &'static str {
        match self {
            ArcadeMsg::InsertCoin(_) => MsgInsertCoin::TYPE_URL,
            ArcadeMsg::StartSession(_) => MsgStartSession::TYPE_URL,
            ArcadeMsg::SubmitScore(_) => MsgSubmitScore::TYPE_URL,
            ArcadeMsg::UsePowerUp(_) => MsgUsePowerUp::TYPE_URL,
            ArcadeMsg::RegisterGame(_) => MsgRegisterGame::TYPE_URL,
            ArcadeMsg::ClaimAchievement(_) => MsgClaimAchievement::TYPE_URL,
            ArcadeMsg::SetHighScoreInitials(_) => MsgSetHighScoreInitials::TYPE_URL,
        }
    }

    /// Whether the chain assigns a session id as a side effect
    pub fn starts_session(&self) -> bool {
        matches!(self, ArcadeMsg::StartSession(_))
    }

    pub fn to_any(&self) -> Result<Any> {
        match self {
            ArcadeMsg::InsertCoin(m) => m.to_any(),
            ArcadeMsg::StartSession(m) => m.to_any(),
            ArcadeMsg::SubmitScore(m) => m.to_any(),
            ArcadeMsg::UsePowerUp(m) => m.to_any(),
            ArcadeMsg::RegisterGame(m) => m.to_any(),
            ArcadeMsg::ClaimAchievement(m) => m.to_any(),
            ArcadeMsg::SetHighScoreInitials(m) => m.to_any(),
        }
    }

    /// Decode a message by its type URL; unknown URLs are an error
    pub fn from_any(any: &Any) -> Result<Self> {
        let value = any.value.as_slice();
        let msg = match any.type_url.as_str() {
            MsgInsertCoin::TYPE_URL => ArcadeMsg::InsertCoin(MsgInsertCoin::from_any_value(value)?),
            MsgStartSession::TYPE_URL => {
                ArcadeMsg::StartSession(MsgStartSession::from_any_value(value)?)
            }
            MsgSubmitScore::TYPE_URL => ArcadeMsg::SubmitScore(MsgSubmitScore::from_any_value(value)?),
            MsgUsePowerUp::TYPE_URL => ArcadeMsg::UsePowerUp(MsgUsePowerUp::from_any_value(value)?),
            MsgRegisterGame::TYPE_URL => {
                ArcadeMsg::RegisterGame(MsgRegisterGame::from_any_value(value)?)
            }
            MsgClaimAchievement::TYPE_URL => {
                ArcadeMsg::ClaimAchievement(MsgClaimAchievement::from_any_value(value)?)
            }
            MsgSetHighScoreInitials::TYPE_URL => {
                ArcadeMsg::SetHighScoreInitials(MsgSetHighScoreInitials::from_any_value(value)?)
            }
            other => return Err(TxError::encoding(format!("unknown message type {}", other))),
        };
        Ok(msg)
    }
}
