use crate::chain::codec::{self, SIGNATURE_LEN};
use crate::chain::gateway::ChainGateway;
use crate::chain::messages::ArcadeMsg;
use crate::chain::proto::Fee;
use crate::config::PipelineConfig;
use crate::error::{Result, TxError};

/// Gas figure handed to the fee calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimate {
    pub gas_used: u64,
    /// false when the static fallback was used
    pub simulated: bool,
}

/// Estimates gas by simulating a throwaway, zero-signed copy of the transaction
#[derive(Debug, Clone)]
pub struct GasEstimator {
    simulate_gas_limit: u64,
    fallback_base: u64,
    fallback_per_message: u64,
}

impl GasEstimator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            simulate_gas_limit: config.simulate_gas_limit,
            fallback_base: config.fallback_base_gas,
            fallback_per_message: config.fallback_gas_per_message,
        }
    }

    /// base + (n - 1) × per-message
    pub fn fallback_gas(&self, message_count: usize) -> u64 {
        let extra = message_count.saturating_sub(1) as u64;
        self.fallback_base
            .saturating_add(extra.saturating_mul(self.fallback_per_message))
    }

    /// Simulation failures fall back to the static estimate; malformed input does not.
    pub async fn estimate(
        &self,
        gateway: &dyn ChainGateway,
        messages: &[ArcadeMsg],
        memo: &str,
        pub_key: &[u8],
        sequence: u64,
    ) -> Result<GasEstimate> {
        let tx_bytes = self.simulation_tx(messages, memo, pub_key, sequence)?;

        match self.simulate(gateway, &tx_bytes).await {
            Ok(gas_used) => {
                log::debug!("Simulation used {} gas", gas_used);
                Ok(GasEstimate {
                    gas_used,
                    simulated: true,
                })
            }
            Err(e) => {
                let gas_used = self.fallback_gas(messages.len());
                log::warn!("Gas simulation failed: {}, using static estimate {}", e, gas_used);
                Ok(GasEstimate {
                    gas_used,
                    simulated: false,
                })
            }
        }
    }

    /// TxRaw with the placeholder gas limit, an empty fee and a zeroed signature
    pub fn simulation_tx(
        &self,
        messages: &[ArcadeMsg],
        memo: &str,
        pub_key: &[u8],
        sequence: u64,
    ) -> Result<Vec<u8>> {
        let fee = Fee {
            amount: vec![],
            gas_limit: self.simulate_gas_limit,
            payer: String::new(),
            granter: String::new(),
        };

        let body = codec::encode_tx_body(messages, memo)?;
        let auth_info = codec::encode_auth_info(pub_key, sequence, &fee)?;
        codec::encode_tx_raw(&body, &auth_info, &[vec![0u8; SIGNATURE_LEN]])
    }

    async fn simulate(&self, gateway: &dyn ChainGateway, tx_bytes: &[u8]) -> Result<u64> {
        let response = gateway.simulate(tx_bytes).await.map_err(|e| match e {
            TxError::SimulationUnavailable(_) => e,
            other => TxError::SimulationUnavailable(other.to_string()),
        })?;
        codec::decode_simulate_response(&response)
    }
}
