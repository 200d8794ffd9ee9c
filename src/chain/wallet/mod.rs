mod keys;
mod signer;

pub use keys::LocalWallet;
pub use signer::DirectSigner;

use async_trait::async_trait;

use crate::chain::proto::SignDoc;
use crate::error::Result;

/// Public identity a wallet exposes for a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletKey {
    pub address: String,
    /// 33-byte compressed secp256k1 key
    pub pub_key: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// 64-byte compact (r || s) signature
    pub bytes: Vec<u8>,
    pub pub_key: Vec<u8>,
}

/// Answer to a SIGN_MODE_DIRECT request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectSignResponse {
    /// The document actually signed; a wallet may adjust it
    pub signed: SignDoc,
    pub signature: Signature,
}

/// Signing capability supplied from outside the pipeline.
///
/// Implementations must report a refusal or failure as
/// `TxError::SigningDeclined`.
#[async_trait]
pub trait Wallet: Send + Sync {
    async fn get_key(&self, chain_id: &str) -> Result<WalletKey>;

    async fn sign_direct(
        &self,
        chain_id: &str,
        address: &str,
        sign_doc: SignDoc,
    ) -> Result<DirectSignResponse>;
}
