use secp256k1::{Message, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

use crate::chain::codec::sign_doc_bytes;
use crate::chain::proto::SignDoc;
use crate::error::{Result, TxError};

/// SIGN_MODE_DIRECT signer for Cosmos secp256k1 keys
pub struct DirectSigner {
    secp: Secp256k1<secp256k1::All>,
}

impl Default for DirectSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectSigner {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// Sign the SHA-256 of the encoded SignDoc.
    /// Returns the 64-byte compact signature (low-S, no recovery byte).
    pub fn sign_doc(&self, doc: &SignDoc, private_key: &SecretKey) -> Result<Vec<u8>> {
        let hash: [u8; 32] = Sha256::digest(sign_doc_bytes(doc)).into();
        self.sign_hash(&hash, private_key)
    }

    pub fn sign_hash(&self, hash: &[u8; 32], private_key: &SecretKey) -> Result<Vec<u8>> {
        let message = Message::from_digest_slice(hash)
            .map_err(|e| TxError::SigningDeclined(format!("invalid digest: {}", e)))?;
        let signature = self.secp.sign_ecdsa(&message, private_key);
        Ok(signature.serialize_compact().to_vec())
    }
}
