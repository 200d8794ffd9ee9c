use super::{require_non_empty, ArcadeMessage};
use crate::error::Result;

/// Open a play session; the chain assigns the session id
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct MsgStartSession {
    #[prost(string, tag = "1")]
    pub creator: String,
    #[prost(string, tag = "2")]
    pub game_id: String,
}

impl ArcadeMessage for MsgStartSession {
    const TYPE_URL: &'static str = "/arcade.arcade.v1.MsgStartSession";

    fn creator(&self) -> &str {
        &self.creator
    }

    fn validate(&self) -> Result<()> {
        require_non_empty("creator", &self.creator, Self::TYPE_URL)?;
        require_non_empty("game_id", &self.game_id, Self::TYPE_URL)
    }
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct MsgSubmitScore {
    #[prost(string, tag = "1")]
    pub creator: String,
    #[prost(uint64, tag = "2")]
    pub session_id: u64,
    #[prost(uint64, tag = "3")]
    pub score: u64,
    #[prost(uint64, tag = "4")]
    pub level: u64,
}

impl ArcadeMessage for MsgSubmitScore {
    const TYPE_URL: &'static str = "/arcade.arcade.v1.MsgSubmitScore";

    fn creator(&self) -> &str {
        &self.creator
    }

    fn validate(&self) -> Result<()> {
        require_non_empty("creator", &self.creator, Self::TYPE_URL)
    }
}

/// Spend credits on a power-up inside a running session
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct MsgUsePowerUp {
    #[prost(string, tag = "1")]
    pub creator: String,
    #[prost(uint64, tag = "2")]
    pub session_id: u64,
    #[prost(string, tag = "3")]
    pub power_up: String,
}

impl ArcadeMessage for MsgUsePowerUp {
    const TYPE_URL: &'static str = "/arcade.arcade.v1.MsgUsePowerUp";

    fn creator(&self) -> &str {
        &self.creator
    }

    fn validate(&self) -> Result<()> {
        require_non_empty("creator", &self.creator, Self::TYPE_URL)?;
        require_non_empty("power_up", &self.power_up, Self::TYPE_URL)
    }
}
