use async_trait::async_trait;
use bech32::Hrp;
use bip32::{ChildNumber, XPrv};
use bip39::Mnemonic;
use ripemd::Ripemd160;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{DirectSignResponse, DirectSigner, Signature, Wallet, WalletKey};
use crate::chain::proto::SignDoc;
use crate::error::{Result, TxError};

/// Cosmos coin type 118: m/44'/118'/0'/0/0
const COSMOS_COIN_TYPE: u32 = 118;

/// Mnemonic-backed wallet signing locally in SIGN_MODE_DIRECT.
/// Key material is zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct LocalWallet {
    #[zeroize(skip)]
    address: String,
    #[zeroize(skip)]
    chain_id: String,
    private_key_bytes: [u8; 32],
    public_key_bytes: [u8; 33],
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

impl LocalWallet {
    /// Derive the first account of `mnemonic` for a chain using `prefix` addresses
    pub fn from_mnemonic(mnemonic: &str, prefix: &str, chain_id: &str) -> Result<Self> {
        let mnemonic = Mnemonic::parse(mnemonic)
            .map_err(|e| TxError::encoding(format!("invalid mnemonic: {}", e)))?;
        let mut seed = mnemonic.to_seed("");

        let derived = derive_private_key(&seed);
        seed.zeroize();
        let mut private_key = derived?;

        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(&private_key)
            .map_err(|e| TxError::encoding(format!("invalid private key: {}", e)))?;
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        let address = cosmos_address(&public_key, prefix)?;

        let mut private_key_bytes = [0u8; 32];
        private_key_bytes.copy_from_slice(&private_key);
        private_key.zeroize();

        Ok(Self {
            address,
            chain_id: chain_id.to_string(),
            private_key_bytes,
            public_key_bytes: public_key.serialize(),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn public_key_compressed(&self) -> [u8; 33] {
        self.public_key_bytes
    }

    fn private_key(&self) -> Result<SecretKey> {
        SecretKey::from_slice(&self.private_key_bytes)
            .map_err(|e| TxError::SigningDeclined(format!("invalid private key: {}", e)))
    }

    fn check_chain(&self, chain_id: &str) -> Result<()> {
        if chain_id != self.chain_id {
            return Err(TxError::SigningDeclined(format!(
                "wallet is bound to chain {}, refusing to sign for {}",
                self.chain_id, chain_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Wallet for LocalWallet {
    async fn get_key(&self, chain_id: &str) -> Result<WalletKey> {
        self.check_chain(chain_id)?;
        Ok(WalletKey {
            address: self.address.clone(),
            pub_key: self.public_key_bytes.to_vec(),
        })
    }

    async fn sign_direct(
        &self,
        chain_id: &str,
        address: &str,
        sign_doc: SignDoc,
    ) -> Result<DirectSignResponse> {
        self.check_chain(chain_id)?;
        if address != self.address {
            return Err(TxError::SigningDeclined(format!(
                "wallet does not hold a key for {}",
                address
            )));
        }
        if sign_doc.chain_id != chain_id {
            return Err(TxError::SigningDeclined(format!(
                "sign doc is for chain {}, request is for {}",
                sign_doc.chain_id, chain_id
            )));
        }

        let bytes = DirectSigner::new().sign_doc(&sign_doc, &self.private_key()?)?;
        Ok(DirectSignResponse {
            signed: sign_doc,
            signature: Signature {
                bytes,
                pub_key: self.public_key_bytes.to_vec(),
            },
        })
    }
}

fn derive_private_key(seed: &[u8]) -> Result<[u8; 32]> {
    let path = [
        (44, true),
        (COSMOS_COIN_TYPE, true),
        (0, true),
        (0, false),
        (0, false),
    ];

    let mut key = XPrv::new(seed)
        .map_err(|e| TxError::encoding(format!("failed to create XPrv from seed: {}", e)))?;
    for (index, hardened) in path {
        let child = ChildNumber::new(index, hardened)
            .map_err(|e| TxError::encoding(format!("invalid derivation index: {}", e)))?;
        key = key
            .derive_child(child)
            .map_err(|e| TxError::encoding(format!("failed to derive key: {}", e)))?;
    }

    Ok(key.to_bytes())
}

/// bech32(prefix, ripemd160(sha256(compressed pubkey)))
fn cosmos_address(public_key: &PublicKey, prefix: &str) -> Result<String> {
    let sha = Sha256::digest(public_key.serialize());
    let hash = Ripemd160::digest(sha);

    let hrp = Hrp::parse(prefix)
        .map_err(|e| TxError::encoding(format!("invalid bech32 prefix {:?}: {}", prefix, e)))?;
    bech32::encode::<bech32::Bech32>(hrp, &hash)
        .map_err(|e| TxError::encoding(format!("bech32 encoding failed: {}", e)))
}
