//! Gas pricing and gas limit derivation.
//!
//! EIP-1559 fees are derived without a priority-fee oracle:
//!
//! ```text
//! max_priority_fee_per_gas = base_fee + tip
//! max_fee_per_gas          = max_priority_fee_per_gas * 1.2
//! ```
//!
//! Gas limits are the node's estimate for the exact call plus a 20% margin.

use std::str::FromStr;

use alloy_rpc_types::TransactionRequest;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::amount::format_gwei;
use crate::chains::FeeMode;
use crate::error::{EvmError, Result};
use crate::rpc::ChainRpc;

/// Exactly one pricing scheme per transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GasPricing {
    Legacy {
        gas_price: u128,
    },
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
}

impl GasPricing {
    /// Upper bound on what one unit of gas can cost.
    pub fn max_price_per_gas(&self) -> u128 {
        match self {
            GasPricing::Legacy { gas_price } => *gas_price,
            GasPricing::Eip1559 { max_fee_per_gas, .. } => *max_fee_per_gas,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasLimitPolicy {
    /// Estimate and add the margin; estimation failure fails the build.
    Estimate,
    /// Estimate and add the margin; fall back to the given limit if the node cannot estimate.
    EstimateOr(u64),
    /// Use the given limit without asking the node.
    Fixed(u64),
}

/// Parses `estimate`, `estimate-or:<limit>` or a bare `<limit>`.
impl FromStr for GasLimitPolicy {
    type Err = EvmError;

    fn from_str(s: &str) -> Result<Self> {
        let parse_limit = |raw: &str| {
            raw.trim()
                .replace('_', "")
                .parse::<u64>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or_else(|| EvmError::InvalidConfig(format!("`{}` is not a gas limit", raw)))
        };

        let s = s.trim();
        if s.eq_ignore_ascii_case("estimate") {
            return Ok(GasLimitPolicy::Estimate);
        }
        if let Some(fallback) = s.strip_prefix("estimate-or:") {
            return Ok(GasLimitPolicy::EstimateOr(parse_limit(fallback)?));
        }
        Ok(GasLimitPolicy::Fixed(parse_limit(s)?))
    }
}

// floor(v * 1.2) == v + floor(v / 5) for integers, and cannot overflow before saturating.
fn apply_margin(value: u128) -> u128 {
    value.saturating_add(value / 5)
}

pub fn eip1559_fees(base_fee: u128, tip_wei: u128) -> GasPricing {
    let max_priority_fee_per_gas = base_fee.saturating_add(tip_wei);
    GasPricing::Eip1559 {
        max_fee_per_gas: apply_margin(max_priority_fee_per_gas),
        max_priority_fee_per_gas,
    }
}

/// `ceil(estimate * 1.2)`, never zero.
pub fn gas_limit_with_margin(estimate: u64) -> u64 {
    estimate.saturating_add(estimate.div_ceil(5)).max(1)
}

pub async fn resolve_pricing<R: ChainRpc + ?Sized>(rpc: &R, mode: FeeMode) -> Result<GasPricing> {
    match mode {
        FeeMode::Legacy => {
            let gas_price = rpc.gas_price().await?;
            info!("[Fees] gas price: {} gwei", format_gwei(gas_price));
            Ok(GasPricing::Legacy { gas_price })
        }
        FeeMode::Eip1559 { tip_wei } => {
            let base_fee = rpc.base_fee().await?.ok_or_else(|| {
                EvmError::Estimation("latest block has no base fee; use legacy pricing".to_string())
            })?;
            let pricing = eip1559_fees(base_fee, tip_wei);
            if let GasPricing::Eip1559 { max_fee_per_gas, max_priority_fee_per_gas } = pricing {
                info!(
                    "[Fees] base fee: {} gwei, max priority fee: {} gwei, max fee: {} gwei",
                    format_gwei(base_fee),
                    format_gwei(max_priority_fee_per_gas),
                    format_gwei(max_fee_per_gas)
                );
            }
            Ok(pricing)
        }
    }
}

pub async fn resolve_gas_limit<R: ChainRpc + ?Sized>(
    rpc: &R,
    tx: &TransactionRequest,
    policy: GasLimitPolicy,
) -> Result<u64> {
    let estimate = match policy {
        GasLimitPolicy::Fixed(limit) => return Ok(limit),
        GasLimitPolicy::Estimate => rpc.estimate_gas(tx).await?,
        GasLimitPolicy::EstimateOr(fallback) => match rpc.estimate_gas(tx).await {
            Ok(estimate) => estimate,
            Err(e) => {
                warn!("[Fees] gas estimation failed ({}), using fixed limit {}", e, fallback);
                return Ok(fallback);
            }
        },
    };

    if estimate == 0 {
        return Err(EvmError::Estimation("node estimated zero gas".to_string()));
    }
    let limit = gas_limit_with_margin(estimate);
    info!("[Fees] estimated gas: {}, using limit: {}", estimate, limit);
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::GWEI;

    #[test]
    fn twenty_gwei_base_with_five_gwei_tip() {
        let pricing = eip1559_fees(20 * GWEI, 5 * GWEI);
        assert_eq!(
            pricing,
            GasPricing::Eip1559 {
                max_fee_per_gas: 30_000_000_000,
                max_priority_fee_per_gas: 25_000_000_000,
            }
        );
    }

    #[test]
    fn max_fee_never_below_priority_fee() {
        let samples = [0u128, 1, 2, 7, 999, GWEI, 3 * GWEI + 1, u128::MAX / 4, u128::MAX];
        for base_fee in samples {
            for tip in [0u128, 1, 5 * GWEI, 10 * GWEI] {
                match eip1559_fees(base_fee, tip) {
                    GasPricing::Eip1559 { max_fee_per_gas, max_priority_fee_per_gas } => {
                        assert_eq!(max_priority_fee_per_gas, base_fee.saturating_add(tip));
                        assert!(max_fee_per_gas >= max_priority_fee_per_gas);
                    }
                    other => panic!("unexpected pricing {:?}", other),
                }
            }
        }
    }

    #[test]
    fn gas_limit_rounds_up() {
        assert_eq!(gas_limit_with_margin(21_000), 25_200);
        assert_eq!(gas_limit_with_margin(100_001), 120_002);
        assert_eq!(gas_limit_with_margin(3), 4);
        assert_eq!(gas_limit_with_margin(1), 2);
        assert_eq!(gas_limit_with_margin(0), 1);
    }

    #[test]
    fn gas_limit_is_ceiling_of_twelve_tenths() {
        for estimate in (1u64..5_000).step_by(7) {
            let limit = gas_limit_with_margin(estimate);
            assert!(u128::from(limit) * 5 >= u128::from(estimate) * 6);
            assert!(u128::from(limit - 1) * 5 < u128::from(estimate) * 6);
        }
    }

    #[test]
    fn parses_gas_policies() {
        assert_eq!("estimate".parse::<GasLimitPolicy>().unwrap(), GasLimitPolicy::Estimate);
        assert_eq!(
            "estimate-or:300000".parse::<GasLimitPolicy>().unwrap(),
            GasLimitPolicy::EstimateOr(300_000)
        );
        assert_eq!("3_000_000".parse::<GasLimitPolicy>().unwrap(), GasLimitPolicy::Fixed(3_000_000));
        assert!("0".parse::<GasLimitPolicy>().is_err());
        assert!("lots".parse::<GasLimitPolicy>().is_err());
    }

    #[test]
    fn max_price_per_gas_picks_the_cap() {
        assert_eq!(GasPricing::Legacy { gas_price: 9 }.max_price_per_gas(), 9);
        assert_eq!(eip1559_fees(20, 5).max_price_per_gas(), 30);
    }
}
