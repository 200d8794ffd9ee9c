pub mod account_types;
pub mod codec;
pub mod gateway;
pub mod messages;
pub mod proto;
pub mod tx_builder;
pub mod wallet;

pub use account_types::AccountInfo;
pub use codec::{BroadcastResult, SessionRecord, SessionStatus};
pub use gateway::{ChainGateway, RestGateway};
pub use messages::ArcadeMsg;
pub use tx_builder::{SignedTx, SignerData, TxSigner};
pub use wallet::{LocalWallet, Wallet, WalletKey};
