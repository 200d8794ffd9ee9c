use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub chain: ChainConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub rest_endpoint: String,
    pub chain_id: String,
    pub bech32_prefix: String,
    pub fee_denom: String,
    /// Gas price as an exact ratio: numerator / denominator per gas unit
    pub gas_price_numerator: u64,
    pub gas_price_denominator: u64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Gas limit written into the throwaway simulation transaction
    pub simulate_gas_limit: u64,
    pub fallback_base_gas: u64,
    pub fallback_gas_per_message: u64,
    pub mismatch_retry_delay_ms: u64,
    pub signing_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub poll_interval_ms: u64,
    pub timeout_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rest_endpoint: "http://localhost:1317".to_string(),
            chain_id: "arcade-1".to_string(),
            bech32_prefix: "arcade".to_string(),
            fee_denom: "uarcade".to_string(),
            gas_price_numerator: 25,
            gas_price_denominator: 1000, // 0.025uarcade
            request_timeout_secs: 30,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            simulate_gas_limit: 2_000_000,
            fallback_base_gas: 550_000,
            fallback_gas_per_message: 120_000,
            mismatch_retry_delay_ms: 250,
            signing_timeout_secs: 120,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 800,
            timeout_ms: 12_000,
        }
    }
}

impl PipelineConfig {
    pub fn mismatch_retry_delay(&self) -> Duration {
        Duration::from_millis(self.mismatch_retry_delay_ms)
    }

    pub fn signing_timeout(&self) -> Duration {
        Duration::from_secs(self.signing_timeout_secs)
    }
}

impl ResolverConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
