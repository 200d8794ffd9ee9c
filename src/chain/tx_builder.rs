/// Transaction signer
///
/// Builds the body and auth info for one attempt, asks the wallet for a
/// SIGN_MODE_DIRECT signature and assembles the broadcastable TxRaw from
/// the document the wallet reports as signed.

use std::time::Duration;

use crate::chain::codec;
use crate::chain::messages::ArcadeMsg;
use crate::chain::proto::{Fee, SignDoc};
use crate::chain::wallet::{Wallet, WalletKey};
use crate::error::{Result, TxError};

/// A signed, encoded transaction ready for broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    pub tx_bytes: Vec<u8>,
    /// Locally computed hash of `tx_bytes`
    pub tx_hash: String,
}

/// Inputs that vary per attempt
#[derive(Debug, Clone, Copy)]
pub struct SignerData {
    pub account_number: u64,
    pub sequence: u64,
}

pub struct TxSigner {
    chain_id: String,
    signing_timeout: Duration,
}

impl TxSigner {
    pub fn new(chain_id: &str, signing_timeout: Duration) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            signing_timeout,
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Unsigned document for this attempt
    pub fn sign_doc(
        &self,
        key: &WalletKey,
        data: SignerData,
        messages: &[ArcadeMsg],
        memo: &str,
        fee: &Fee,
    ) -> Result<SignDoc> {
        let body_bytes = codec::encode_tx_body(messages, memo)?;
        let auth_info_bytes = codec::encode_auth_info(&key.pub_key, data.sequence, fee)?;

        Ok(SignDoc {
            body_bytes,
            auth_info_bytes,
            chain_id: self.chain_id.clone(),
            account_number: data.account_number,
        })
    }

    /// Build, sign and assemble. Wallet refusals, failures and timeouts all
    /// surface as `SigningDeclined`.
    pub async fn sign(
        &self,
        wallet: &dyn Wallet,
        key: &WalletKey,
        data: SignerData,
        messages: &[ArcadeMsg],
        memo: &str,
        fee: &Fee,
    ) -> Result<SignedTx> {
        let doc = self.sign_doc(key, data, messages, memo, fee)?;

        log::debug!(
            "Requesting signature for {} (account {}, sequence {})",
            key.address,
            data.account_number,
            data.sequence
        );

        let request = wallet.sign_direct(&self.chain_id, &key.address, doc);
        let response = match tokio::time::timeout(self.signing_timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(TxError::SigningDeclined(reason))) => {
                return Err(TxError::SigningDeclined(reason))
            }
            Ok(Err(other)) => return Err(TxError::SigningDeclined(other.to_string())),
            Err(_) => {
                return Err(TxError::SigningDeclined(format!(
                    "wallet did not answer within {:?}",
                    self.signing_timeout
                )))
            }
        };

        if response.signature.bytes.is_empty() {
            return Err(TxError::SigningDeclined("wallet returned an empty signature".into()));
        }
        if response.signed.chain_id != self.chain_id {
            return Err(TxError::encoding(format!(
                "wallet signed for chain {}, expected {}",
                response.signed.chain_id, self.chain_id
            )));
        }

        let tx_bytes = codec::encode_tx_raw(
            &response.signed.body_bytes,
            &response.signed.auth_info_bytes,
            &[response.signature.bytes],
        )?;
        let tx_hash = codec::tx_hash(&tx_bytes);

        Ok(SignedTx { tx_bytes, tx_hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::proto::TxRaw;
    use crate::chain::wallet::{DirectSignResponse, Signature};
    use crate::testing::{FakeWallet, CHAIN_ID, PLAYER};
    use async_trait::async_trait;
    use prost::Message;

    fn signer() -> TxSigner {
        TxSigner::new(CHAIN_ID, Duration::from_secs(5))
    }

    fn data() -> SignerData {
        SignerData {
            account_number: 12,
            sequence: 3,
        }
    }

    fn fee() -> Fee {
        codec::fee("uarcade", 3250, 130_000)
    }

    #[tokio::test]
    async fn test_sign_assembles_tx_raw() {
        let wallet = FakeWallet::new();
        let key = wallet.get_key(CHAIN_ID).await.unwrap();
        let msgs = vec![ArcadeMsg::insert_coin(PLAYER, "pacman", 2)];

        let signed = signer()
            .sign(&wallet, &key, data(), &msgs, "hi", &fee())
            .await
            .unwrap();

        let raw = TxRaw::decode(signed.tx_bytes.as_slice()).unwrap();
        assert_eq!(raw.signatures, vec![vec![0x5a; 64]]);
        assert_eq!(signed.tx_hash, codec::tx_hash(&signed.tx_bytes));

        let (decoded, memo) = codec::decode_tx_body(&raw.body_bytes).unwrap();
        assert_eq!(decoded, msgs);
        assert_eq!(memo, "hi");

        let docs = wallet.signed_docs();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].account_number, 12);
        assert_eq!(docs[0].chain_id, CHAIN_ID);
    }

    #[tokio::test]
    async fn test_declined() {
        let wallet = FakeWallet::declining();
        let key = wallet.get_key(CHAIN_ID).await.unwrap();
        let msgs = vec![ArcadeMsg::start_session(PLAYER, "pacman")];

        let err = signer()
            .sign(&wallet, &key, data(), &msgs, "", &fee())
            .await
            .unwrap_err();
        assert!(matches!(err, TxError::SigningDeclined(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_a_decline() {
        let (wallet, _entered, _release) = FakeWallet::gated();
        let key = wallet.get_key(CHAIN_ID).await.unwrap();
        let msgs = vec![ArcadeMsg::start_session(PLAYER, "pacman")];

        let err = TxSigner::new(CHAIN_ID, Duration::from_millis(20))
            .sign(&wallet, &key, data(), &msgs, "", &fee())
            .await
            .unwrap_err();
        assert!(matches!(err, TxError::SigningDeclined(ref m) if m.contains("did not answer")));
    }

    struct AdjustingWallet;

    #[async_trait]
    impl Wallet for AdjustingWallet {
        async fn get_key(&self, chain_id: &str) -> Result<WalletKey> {
            FakeWallet::new().get_key(chain_id).await
        }

        async fn sign_direct(
            &self,
            _chain_id: &str,
            _address: &str,
            mut sign_doc: SignDoc,
        ) -> Result<DirectSignResponse> {
            // Wallet raises the fee before signing
            let bumped = codec::fee("uarcade", 9999, 400_000);
            let key = crate::testing::pub_key();
            sign_doc.auth_info_bytes = codec::encode_auth_info(&key, 3, &bumped)?;
            Ok(DirectSignResponse {
                signed: sign_doc,
                signature: Signature {
                    bytes: vec![0x01; 64],
                    pub_key: key,
                },
            })
        }
    }

    #[tokio::test]
    async fn test_uses_doc_returned_by_wallet() {
        let wallet = AdjustingWallet;
        let key = wallet.get_key(CHAIN_ID).await.unwrap();
        let msgs = vec![ArcadeMsg::start_session(PLAYER, "pacman")];

        let signed = signer()
            .sign(&wallet, &key, data(), &msgs, "", &fee())
            .await
            .unwrap();
        let raw = TxRaw::decode(signed.tx_bytes.as_slice()).unwrap();
        let auth = crate::chain::proto::AuthInfo::decode(raw.auth_info_bytes.as_slice()).unwrap();
        assert_eq!(auth.fee.unwrap().gas_limit, 400_000);
    }

    struct EmptySignatureWallet;

    #[async_trait]
    impl Wallet for EmptySignatureWallet {
        async fn get_key(&self, chain_id: &str) -> Result<WalletKey> {
            FakeWallet::new().get_key(chain_id).await
        }

        async fn sign_direct(
            &self,
            _chain_id: &str,
            _address: &str,
            sign_doc: SignDoc,
        ) -> Result<DirectSignResponse> {
            Ok(DirectSignResponse {
                signed: sign_doc,
                signature: Signature {
                    bytes: vec![],
                    pub_key: vec![],
                },
            })
        }
    }

    #[tokio::test]
    async fn test_empty_signature_is_a_decline() {
        let wallet = EmptySignatureWallet;
        let key = wallet.get_key(CHAIN_ID).await.unwrap();
        let msgs = vec![ArcadeMsg::start_session(PLAYER, "pacman")];

        let err = signer()
            .sign(&wallet, &key, data(), &msgs, "", &fee())
            .await
            .unwrap_err();
        assert!(matches!(err, TxError::SigningDeclined(_)));
    }
}
