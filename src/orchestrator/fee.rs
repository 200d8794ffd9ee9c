use crate::chain::codec;
use crate::chain::proto::Fee;
use crate::config::ChainConfig;
use crate::error::{Result, TxError};

/// Headroom over simulated gas: ×5/4, plus a flat buffer
const GAS_ADJUST_NUM: u128 = 5;
const GAS_ADJUST_DEN: u128 = 4;
const GAS_BUFFER: u128 = 5_000;

/// Converts gas figures into fees at a fixed price ratio.
/// All rounding goes up; a fee is never below `gas_limit × price`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeCalculator {
    denom: String,
    price_num: u128,
    price_den: u128,
}

impl FeeCalculator {
    pub fn new(denom: &str, price_num: u64, price_den: u64) -> Result<Self> {
        if price_den == 0 {
            return Err(TxError::encoding("gas price denominator must be non-zero"));
        }
        if denom.is_empty() {
            return Err(TxError::encoding("fee denom must not be empty"));
        }
        Ok(Self {
            denom: denom.to_string(),
            price_num: u128::from(price_num),
            price_den: u128::from(price_den),
        })
    }

    pub fn from_config(config: &ChainConfig) -> Result<Self> {
        Self::new(
            &config.fee_denom,
            config.gas_price_numerator,
            config.gas_price_denominator,
        )
    }

    /// ceil(gas_used × 1.25) + 5000
    pub fn gas_limit_for(&self, gas_used: u64) -> u64 {
        let adjusted = ceil_div(u128::from(gas_used) * GAS_ADJUST_NUM, GAS_ADJUST_DEN) + GAS_BUFFER;
        u64::try_from(adjusted).unwrap_or(u64::MAX)
    }

    /// ceil(gas_limit × num / den)
    pub fn amount_for(&self, gas_limit: u64) -> u128 {
        ceil_div(u128::from(gas_limit) * self.price_num, self.price_den)
    }

    pub fn fee_for(&self, gas_used: u64) -> Fee {
        let gas_limit = self.gas_limit_for(gas_used);
        let amount = self.amount_for(gas_limit);
        log::debug!(
            "Fee for {} gas used: limit {}, amount {}{}",
            gas_used,
            gas_limit,
            amount,
            self.denom
        );
        codec::fee(&self.denom, amount, gas_limit)
    }
}

fn ceil_div(numerator: u128, denominator: u128) -> u128 {
    numerator / denominator + u128::from(numerator % denominator != 0)
}
