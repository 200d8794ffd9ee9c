// Library exports for arcade_tx

pub mod chain;
pub mod config;
pub mod error;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use chain::{ArcadeMsg, BroadcastResult, ChainGateway, LocalWallet, RestGateway, Wallet};
pub use config::Config;
pub use error::{Result, TxError};
pub use orchestrator::TxPipeline;
