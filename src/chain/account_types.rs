/// Polymorphic account decoding for the auth module's REST answer.
///
/// The account endpoint returns a JSON object tagged with `@type`. Plain
/// accounts carry `account_number`/`sequence` at the top level, while
/// extension accounts (eth-style, vesting) nest a `base_account`, sometimes
/// one level deeper under `base_vesting_account`.

use serde::Deserialize;

use crate::chain::codec::de_u64_lenient;
use crate::error::{Result, TxError};

/// Numbers the pipeline needs from an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountInfo {
    pub account_number: u64,
    pub sequence: u64,
}

#[derive(Debug, Deserialize)]
pub struct BaseAccountJson {
    #[serde(default)]
    pub address: String,
    #[serde(deserialize_with = "de_u64_lenient")]
    pub account_number: u64,
    #[serde(deserialize_with = "de_u64_lenient")]
    pub sequence: u64,
}

#[derive(Debug, Deserialize)]
pub struct BaseVestingJson {
    pub base_account: Option<BaseAccountJson>,
}

#[derive(Debug, Deserialize)]
pub struct AccountJson {
    #[serde(rename = "@type", default)]
    pub type_url: String,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub account_number: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub sequence: Option<u64>,
    pub base_account: Option<BaseAccountJson>,
    pub base_vesting_account: Option<BaseVestingJson>,
}

impl AccountJson {
    /// Extract account number and sequence whatever the account type
    pub fn info(&self) -> Result<AccountInfo> {
        if let (Some(account_number), Some(sequence)) = (self.account_number, self.sequence) {
            return Ok(AccountInfo { account_number, sequence });
        }

        let base = self.base_account.as_ref().or_else(|| {
            self.base_vesting_account
                .as_ref()
                .and_then(|v| v.base_account.as_ref())
        });

        match base {
            Some(base) => {
                log::debug!(
                    "Extracted base account {} from {}",
                    base.address,
                    self.account_type()
                );
                Ok(AccountInfo {
                    account_number: base.account_number,
                    sequence: base.sequence,
                })
            }
            None => Err(TxError::encoding(format!(
                "account type {} carries no account number or sequence",
                self.account_type()
            ))),
        }
    }

    pub fn account_type(&self) -> &str {
        if self.type_url.is_empty() {
            "unknown"
        } else {
            self.type_url.trim_start_matches('/')
        }
    }
}

fn de_opt_u64<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        other => de_u64_lenient(other)
            .map(Some)
            .map_err(D::Error::custom),
    }
}
