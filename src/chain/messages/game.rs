use super::{require_non_empty, ArcadeMessage};
use crate::error::{Result, TxError};

const MAX_INITIALS: usize = 3;

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct MsgRegisterGame {
    #[prost(string, tag = "1")]
    pub creator: String,
    #[prost(string, tag = "2")]
    pub game_id: String,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(uint64, tag = "4")]
    pub credits_per_play: u64,
}

impl ArcadeMessage for MsgRegisterGame {
    const TYPE_URL: &'static str = "/arcade.arcade.v1.MsgRegisterGame";

    fn creator(&self) -> &str {
        &self.creator
    }

    fn validate(&self) -> Result<()> {
        require_non_empty("creator", &self.creator, Self::TYPE_URL)?;
        require_non_empty("game_id", &self.game_id, Self::TYPE_URL)?;
        require_non_empty("name", &self.name, Self::TYPE_URL)?;
        if self.credits_per_play == 0 {
            return Err(TxError::encoding("MsgRegisterGame: credits_per_play must be positive"));
        }
        Ok(())
    }
}

/// Attach arcade-style initials to the player's best score
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct MsgSetHighScoreInitials {
    #[prost(string, tag = "1")]
    pub creator: String,
    #[prost(string, tag = "2")]
    pub game_id: String,
    #[prost(string, tag = "3")]
    pub initials: String,
}

impl ArcadeMessage for MsgSetHighScoreInitials {
    const TYPE_URL: &'static str = "/arcade.arcade.v1.MsgSetHighScoreInitials";

    fn creator(&self) -> &str {
        &self.creator
    }

    fn validate(&self) -> Result<()> {
        require_non_empty("creator", &self.creator, Self::TYPE_URL)?;
        require_non_empty("game_id", &self.game_id, Self::TYPE_URL)?;
        let valid = !self.initials.is_empty()
            && self.initials.len() <= MAX_INITIALS
            && self.initials.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(TxError::encoding(format!(
                "MsgSetHighScoreInitials: initials must be 1-{} ASCII letters or digits, got {:?}",
                MAX_INITIALS, self.initials
            )));
        }
        Ok(())
    }
}
