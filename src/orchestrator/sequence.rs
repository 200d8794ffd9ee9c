use std::collections::HashMap;

use crate::chain::codec;
use crate::chain::gateway::ChainGateway;
use crate::error::Result;

/// Account number and next sequence for one signer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSequence {
    pub account_number: u64,
    pub sequence: u64,
}

/// Cache of signer -> sequence that absorbs a lagging read endpoint.
///
/// Entries only move through a fresh account query, an accepted broadcast
/// (+1), or an authoritative mismatch report.
#[derive(Debug, Default)]
pub struct SequenceTracker {
    entries: HashMap<String, AccountSequence>,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query the account and prefer a higher cached sequence for the same account number.
    /// A failed query propagates; a sequence is never synthesized.
    pub async fn get(
        &mut self,
        gateway: &dyn ChainGateway,
        address: &str,
    ) -> Result<AccountSequence> {
        let info = codec::decode_account_response(gateway.account(address).await?)?;
        let fresh = AccountSequence {
            account_number: info.account_number,
            sequence: info.sequence,
        };

        if let Some(cached) = self.entries.get(address) {
            if cached.account_number == fresh.account_number && cached.sequence > fresh.sequence {
                log::debug!(
                    "Account query for {} lags (chain {}, cached {}), using cached sequence",
                    address,
                    fresh.sequence,
                    cached.sequence
                );
                return Ok(*cached);
            }
        }

        self.entries.insert(address.to_string(), fresh);
        Ok(fresh)
    }

    /// Record a mempool-accepted broadcast that used `sequence_used`
    pub fn mark_submitted(&mut self, address: &str, account_number: u64, sequence_used: u64) {
        let next = AccountSequence {
            account_number,
            sequence: sequence_used + 1,
        };
        log::debug!("Sequence for {} advanced to {}", address, next.sequence);
        self.entries.insert(address.to_string(), next);
    }

    /// Overwrite the cache with the sequence the chain reported it expects
    pub fn reconcile(&mut self, address: &str, account_number: u64, expected: u64) {
        log::info!("Reconciling sequence for {} to {}", address, expected);
        self.entries.insert(
            address.to_string(),
            AccountSequence {
                account_number,
                sequence: expected,
            },
        );
    }

    pub fn cached(&self, address: &str) -> Option<AccountSequence> {
        self.entries.get(address).copied()
    }
}
