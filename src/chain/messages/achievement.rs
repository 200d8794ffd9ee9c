use super::{require_non_empty, ArcadeMessage};
use crate::error::Result;

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct MsgClaimAchievement {
    #[prost(string, tag = "1")]
    pub creator: String,
    #[prost(string, tag = "2")]
    pub game_id: String,
    #[prost(string, tag = "3")]
    pub achievement_id: String,
}

impl ArcadeMessage for MsgClaimAchievement {
    const TYPE_URL: &'static str = "/arcade.arcade.v1.MsgClaimAchievement";

    fn creator(&self) -> &str {
        &self.creator
    }

    fn validate(&self) -> Result<()> {
        require_non_empty("creator", &self.creator, Self::TYPE_URL)?;
        require_non_empty("game_id", &self.game_id, Self::TYPE_URL)?;
        require_non_empty("achievement_id", &self.achievement_id, Self::TYPE_URL)
    }
}
