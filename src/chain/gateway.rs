use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::ChainConfig;
use crate::error::{Result, TxError};

/// Network boundary to the chain's REST gateway. Every call returns the raw
/// JSON answer; decoding lives in the codec.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Account info for `address`
    async fn account(&self, address: &str) -> Result<Value>;

    /// Dry-run a transaction for gas estimation
    async fn simulate(&self, tx_bytes: &[u8]) -> Result<Value>;

    /// Submit a signed transaction in sync (mempool-accepted) mode
    async fn broadcast(&self, tx_bytes: &[u8]) -> Result<Value>;

    /// Recent sessions of `player` for `game_id`
    async fn sessions(&self, player: &str, game_id: &str) -> Result<Value>;
}

/// reqwest-backed gateway for the Cosmos REST (LCD) API
#[derive(Clone)]
pub struct RestGateway {
    client: Client,
    base_url: String,
}

impl RestGateway {
    pub fn new(config: &ChainConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.rest_endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn an HTTP answer into JSON, keeping non-2xx bodies for the caller
    async fn read_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TxError::Transport {
                status: Some(status.as_u16()),
                message: if body.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body
                },
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| TxError::encoding(format!("gateway returned invalid JSON: {}", e)))
    }
}

#[async_trait]
impl ChainGateway for RestGateway {
    async fn account(&self, address: &str) -> Result<Value> {
        let url = self.url(&format!("/cosmos/auth/v1beta1/accounts/{}", address));
        log::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(TxError::AccountNotFound {
                address: address.to_string(),
            });
        }
        Self::read_json(response).await
    }

    async fn simulate(&self, tx_bytes: &[u8]) -> Result<Value> {
        let url = self.url("/cosmos/tx/v1beta1/simulate");
        log::debug!("POST {} ({} bytes)", url, tx_bytes.len());

        let body = json!({ "tx_bytes": BASE64.encode(tx_bytes) });
        let response = self.client.post(&url).json(&body).send().await?;
        Self::read_json(response).await
    }

    async fn broadcast(&self, tx_bytes: &[u8]) -> Result<Value> {
        let url = self.url("/cosmos/tx/v1beta1/txs");
        log::info!("Broadcasting {} bytes to {}", tx_bytes.len(), url);

        let body = json!({
            "tx_bytes": BASE64.encode(tx_bytes),
            "mode": "BROADCAST_MODE_SYNC",
        });
        let response = self.client.post(&url).json(&body).send().await?;
        Self::read_json(response).await
    }

    async fn sessions(&self, player: &str, game_id: &str) -> Result<Value> {
        let url = self.url("/arcade/arcade/v1/sessions");
        let response = self
            .client
            .get(&url)
            .query(&[("player", player), ("game_id", game_id)])
            .send()
            .await?;
        Self::read_json(response).await
    }
}
