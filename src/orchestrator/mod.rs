//! Submission pipeline for arcade transactions: gas estimation, fees,
//! sequence tracking, broadcast and session discovery.

pub mod broadcaster;
pub mod fee;
pub mod gas;
pub mod sequence;
pub mod session_resolver;
mod transaction_manager;

pub use broadcaster::{parse_sequence_mismatch, readable_reason, SequenceMismatch};
pub use fee::FeeCalculator;
pub use gas::{GasEstimate, GasEstimator};
pub use sequence::{AccountSequence, SequenceTracker};
pub use session_resolver::SessionResolver;
pub use transaction_manager::TxPipeline;
