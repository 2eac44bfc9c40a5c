use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EvmError, Result};

pub const GWEI: u128 = 1_000_000_000;

pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How a chain prices gas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeMode {
    /// `gasPrice` straight from `eth_gasPrice`.
    Legacy,
    /// EIP-1559 fees derived from the latest base fee plus a fixed tip.
    Eip1559 { tip_wei: u128 },
}

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub name: String,
    pub chain_id: Option<u64>,
    pub rpc_url: String,
    pub native_symbol: String,
    pub fee_mode: FeeMode,
    pub receipt_timeout: Duration,
    pub receipt_poll_interval: Duration,
}

impl ChainConfig {
    pub const RECOGNIZED: &'static [&'static str] = &["arbitrum", "bsc", "sonic"];

    pub fn arbitrum() -> Self {
        Self {
            name: "Arbitrum One".to_string(),
            chain_id: Some(42161),
            rpc_url: "https://arb1.arbitrum.io/rpc".to_string(),
            native_symbol: "ETH".to_string(),
            fee_mode: FeeMode::Legacy,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
            receipt_poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
        }
    }

    pub fn bsc() -> Self {
        Self {
            name: "BNB Smart Chain".to_string(),
            chain_id: Some(56),
            rpc_url: "https://bsc.drpc.org".to_string(),
            native_symbol: "BNB".to_string(),
            fee_mode: FeeMode::Legacy,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
            receipt_poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
        }
    }

    pub fn sonic() -> Self {
        Self {
            name: "Sonic".to_string(),
            chain_id: Some(146),
            rpc_url: "https://sonic-rpc.publicnode.com".to_string(),
            native_symbol: "S".to_string(),
            fee_mode: FeeMode::Eip1559 { tip_wei: 5 * GWEI },
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
            // sub-second blocks
            receipt_poll_interval: Duration::from_secs(1),
        }
    }

    pub fn by_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "arbitrum" | "arb" | "arbitrum-one" => Ok(Self::arbitrum()),
            "bsc" | "bnb" | "binance" => Ok(Self::bsc()),
            "sonic" => Ok(Self::sonic()),
            other => Err(EvmError::InvalidConfig(format!(
                "unknown chain `{}` (expected one of: {})",
                other,
                Self::RECOGNIZED.join(", ")
            ))),
        }
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    /// Overrides the EIP-1559 tip. Has no effect on legacy-priced chains.
    pub fn with_tip_gwei(mut self, tip_gwei: u64) -> Self {
        if let FeeMode::Eip1559 { tip_wei } = &mut self.fee_mode {
            *tip_wei = u128::from(tip_gwei) * GWEI;
        }
        self
    }

    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    pub fn require_chain_id(&self) -> Result<u64> {
        self.chain_id
            .ok_or_else(|| EvmError::InvalidConfig(format!("chain id is not set for {}", self.name)))
    }
}

impl FromStr for ChainConfig {
    type Err = EvmError;

    fn from_str(s: &str) -> Result<Self> {
        Self::by_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_carry_their_chain_ids() {
        assert_eq!(ChainConfig::arbitrum().chain_id, Some(42161));
        assert_eq!(ChainConfig::bsc().chain_id, Some(56));
        assert_eq!(ChainConfig::sonic().chain_id, Some(146));
    }

    #[test]
    fn sonic_uses_eip1559_with_five_gwei_tip() {
        assert_eq!(ChainConfig::sonic().fee_mode, FeeMode::Eip1559 { tip_wei: 5 * GWEI });
        let tuned = ChainConfig::sonic().with_tip_gwei(10);
        assert_eq!(tuned.fee_mode, FeeMode::Eip1559 { tip_wei: 10 * GWEI });
    }

    #[test]
    fn tip_override_leaves_legacy_chains_alone() {
        assert_eq!(ChainConfig::arbitrum().with_tip_gwei(10).fee_mode, FeeMode::Legacy);
    }

    #[test]
    fn lookup_by_name_is_case_insensitive() {
        assert_eq!(ChainConfig::by_name("Sonic").unwrap().chain_id, Some(146));
        assert_eq!("BNB".parse::<ChainConfig>().unwrap().chain_id, Some(56));
        let err = ChainConfig::by_name("solana").unwrap_err();
        assert!(err.to_string().contains("arbitrum, bsc, sonic"));
    }

    #[test]
    fn missing_chain_id_is_rejected() {
        let mut config = ChainConfig::arbitrum();
        config.chain_id = None;
        assert!(matches!(config.require_chain_id(), Err(EvmError::InvalidConfig(_))));
    }
}
