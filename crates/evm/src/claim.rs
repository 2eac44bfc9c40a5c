use std::time::Duration;

use alloy_core::primitives::{Address, B256};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::calls::reward_pool;
use crate::error::Result;
use crate::executor::TxExecutor;
use crate::fees::GasLimitPolicy;
use crate::rpc::ChainRpc;

pub const DEFAULT_CLAIM_INTERVAL: Duration = Duration::from_secs(90);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClaimResult {
    Submitted { tx_hash: B256 },
    Confirmed { tx_hash: B256, block_number: Option<u64> },
    Failed { error: String },
}

impl ClaimResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, ClaimResult::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolClaim {
    pub pid: u64,
    pub result: ClaimResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimRound {
    pub round: u64,
    pub claims: Vec<PoolClaim>,
}

impl ClaimRound {
    pub fn failures(&self) -> usize {
        self.claims.iter().filter(|c| c.result.is_failed()).count()
    }
}

/// Harvests rewards from a fixed set of pools on a fixed interval.
#[derive(Debug, Clone)]
pub struct ClaimLoop {
    pub pool: Address,
    pub pool_ids: Vec<u64>,
    pub interval: Duration,
    /// Stop after this many rounds; `None` runs until the process is stopped.
    pub max_rounds: Option<u64>,
    pub wait_for_receipts: bool,
    pub gas: GasLimitPolicy,
}

impl ClaimLoop {
    pub fn new(pool: Address, pool_ids: Vec<u64>) -> Self {
        Self {
            pool,
            pool_ids,
            interval: DEFAULT_CLAIM_INTERVAL,
            max_rounds: None,
            wait_for_receipts: false,
            gas: GasLimitPolicy::Estimate,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: Option<u64>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn wait_for_receipts(mut self, wait: bool) -> Self {
        self.wait_for_receipts = wait;
        self
    }

    /// Claims every pool once. A failing pool never stops the others, except
    /// on configuration errors that would fail every claim alike.
    pub async fn run_round<R: ChainRpc>(&self, executor: &TxExecutor<R>, round: u64) -> Result<ClaimRound> {
        let mut claims = Vec::with_capacity(self.pool_ids.len());
        for &pid in &self.pool_ids {
            let result = match claim_once(executor, self.pool, pid, self.gas, self.wait_for_receipts).await {
                Ok(result) => result,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!("[ClaimLoop] round {} pool {} failed: {}", round, pid, e);
                    ClaimResult::Failed { error: e.to_string() }
                }
            };
            claims.push(PoolClaim { pid, result });
        }
        Ok(ClaimRound { round, claims })
    }

    /// Runs rounds until `max_rounds` is reached, handing each report to `on_round`.
    /// Returns the number of rounds completed.
    pub async fn run<R, F>(&self, executor: &TxExecutor<R>, mut on_round: F) -> Result<u64>
    where
        R: ChainRpc,
        F: FnMut(&ClaimRound),
    {
        if self.pool_ids.is_empty() {
            warn!("[ClaimLoop] no pool ids configured, nothing to claim");
            return Ok(0);
        }

        let mut round = 0u64;
        loop {
            round += 1;
            info!("[ClaimLoop] round {} for pools {:?}", round, self.pool_ids);
            let report = self.run_round(executor, round).await?;
            on_round(&report);

            if self.max_rounds.is_some_and(|max| round >= max) {
                return Ok(round);
            }
            info!("[ClaimLoop] next round in {}s", self.interval.as_secs());
            tokio::time::sleep(self.interval).await;
        }
    }
}

/// Claims one pool's pending rewards.
pub async fn claim_once<R: ChainRpc>(
    executor: &TxExecutor<R>,
    pool: Address,
    pid: u64,
    gas: GasLimitPolicy,
    wait_for_receipt: bool,
) -> Result<ClaimResult> {
    let call = reward_pool::claim_rewards(pool, pid);
    let tx_hash = executor.submit(&call, gas).await?;
    info!("[Claim] pool {} claim sent: {}", pid, tx_hash);
    if !wait_for_receipt {
        return Ok(ClaimResult::Submitted { tx_hash });
    }

    let receipt = executor.confirm(tx_hash).await?;
    Ok(ClaimResult::Confirmed {
        tx_hash,
        block_number: receipt.block_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_submit_only_every_ninety_seconds() {
        let claim = ClaimLoop::new(Address::repeat_byte(0x49), vec![1]);
        assert_eq!(claim.interval, Duration::from_secs(90));
        assert_eq!(claim.max_rounds, None);
        assert!(!claim.wait_for_receipts);
    }

    #[test]
    fn round_counts_failures() {
        let round = ClaimRound {
            round: 1,
            claims: vec![
                PoolClaim { pid: 1, result: ClaimResult::Failed { error: "reverted".into() } },
                PoolClaim { pid: 2, result: ClaimResult::Submitted { tx_hash: B256::ZERO } },
            ],
        };
        assert_eq!(round.failures(), 1);
    }
}
