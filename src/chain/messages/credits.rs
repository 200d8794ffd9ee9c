use super::{require_non_empty, ArcadeMessage};
use crate::error::{Result, TxError};

/// Buy play credits for a game
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct MsgInsertCoin {
    #[prost(string, tag = "1")]
    pub creator: String,
    #[prost(string, tag = "2")]
    pub game_id: String,
    #[prost(uint64, tag = "3")]
    pub credits: u64,
}

impl ArcadeMessage for MsgInsertCoin {
    const TYPE_URL: &'static str = "/arcade.arcade.v1.MsgInsertCoin";

    fn creator(&self) -> &str {
        &self.creator
    }

    fn validate(&self) -> Result<()> {
        require_non_empty("creator", &self.creator, Self::TYPE_URL)?;
        require_non_empty("game_id", &self.game_id, Self::TYPE_URL)?;
        if self.credits == 0 {
            return Err(TxError::encoding("MsgInsertCoin: credits must be positive"));
        }
        Ok(())
    }
}
