use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};

use crate::chain::codec::{self, SessionRecord, SessionStatus};
use crate::chain::gateway::ChainGateway;
use crate::config::ResolverConfig;
use crate::error::{Result, TxError};

/// Polls the sessions endpoint until the session a StartSession created shows up
#[derive(Debug, Clone)]
pub struct SessionResolver {
    poll_interval: Duration,
    timeout: Duration,
}

impl SessionResolver {
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.poll_interval(), config.timeout())
    }

    /// Returns the highest-id active session as soon as one appears. At the
    /// deadline, falls back to the highest id seen in any state.
    pub async fn resolve(
        &self,
        gateway: &dyn ChainGateway,
        player: &str,
        game_id: &str,
    ) -> Result<u64> {
        let deadline = Instant::now() + self.timeout;
        let mut newest: Option<u64> = None;
        let mut polls = 0u32;

        loop {
            polls += 1;
            match timeout_at(deadline, self.poll(gateway, player, game_id)).await {
                Ok(Ok(sessions)) => {
                    if let Some(active) = sessions
                        .iter()
                        .filter(|s| s.status == SessionStatus::Active)
                        .map(|s| s.id)
                        .max()
                    {
                        log::info!("Resolved active session {} after {} polls", active, polls);
                        return Ok(active);
                    }
                    newest = newest.max(sessions.iter().map(|s| s.id).max());
                }
                Ok(Err(e)) => log::warn!("Session poll {} failed: {}", polls, e),
                Err(_) => log::warn!("Session poll {} still pending at the deadline", polls),
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }

        match newest {
            Some(id) => {
                log::warn!("No active session for {} within {:?}, using newest {}", game_id, self.timeout, id);
                Ok(id)
            }
            None => Err(TxError::SessionNotFound {
                game_id: game_id.to_string(),
            }),
        }
    }

    /// Sessions for this player and game; records tagged for another game or player are dropped
    async fn poll(
        &self,
        gateway: &dyn ChainGateway,
        player: &str,
        game_id: &str,
    ) -> Result<Vec<SessionRecord>> {
        let sessions = codec::decode_sessions_response(gateway.sessions(player, game_id).await?)?;
        Ok(sessions
            .into_iter()
            .filter(|s| s.game_id.is_empty() || s.game_id == game_id)
            .filter(|s| s.player.is_empty() || s.player == player)
            .collect())
    }
}
