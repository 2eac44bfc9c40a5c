use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, warn};

use onchain_evm::addresses::sonic;
use onchain_evm::claim::{claim_once, ClaimLoop, ClaimResult, DEFAULT_CLAIM_INTERVAL};
use onchain_evm::{Address, ChainConfig, GasLimitPolicy};
use onchain_scripts::{executor, init, ChainArgs};

/// Harvests reward-pool rewards by withdrawing zero from each pool.
#[derive(Debug, Parser)]
#[command(name = "claim")]
struct Cli {
    #[command(flatten)]
    chain: ChainArgs,

    /// Reward pool contract
    #[arg(long, default_value_t = sonic::SHIELD_GENESIS_POOL)]
    pool: Address,

    /// Pool ids to claim, in order
    #[arg(long = "pid", default_values_t = [1u64])]
    pids: Vec<u64>,

    /// Seconds between rounds
    #[arg(long, default_value_t = DEFAULT_CLAIM_INTERVAL.as_secs())]
    interval: u64,

    /// Stop after this many rounds
    #[arg(long)]
    rounds: Option<u64>,

    /// Claim the first pool once and exit
    #[arg(long)]
    once: bool,

    /// Wait for each claim's receipt
    #[arg(long)]
    wait: bool,

    /// Priority tip in gwei on EIP-1559 chains
    #[arg(long)]
    tip_gwei: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init();
    let cli = Cli::parse();

    let mut config = cli.chain.config(ChainConfig::sonic());
    if let Some(tip) = cli.tip_gwei {
        config = config.with_tip_gwei(tip);
    }
    let executor = executor(config).await?;

    if cli.once {
        let Some(&pid) = cli.pids.first() else {
            bail!("no pool id given");
        };
        let result = claim_once(&executor, cli.pool, pid, GasLimitPolicy::Estimate, cli.wait).await?;
        info!("[Claim] pool {}: {:?}", pid, result);
        return Ok(());
    }

    let claim = ClaimLoop::new(cli.pool, cli.pids)
        .with_interval(Duration::from_secs(cli.interval))
        .with_max_rounds(cli.rounds)
        .wait_for_receipts(cli.wait);

    let rounds = claim
        .run(&executor, |round| {
            for claim in &round.claims {
                match &claim.result {
                    ClaimResult::Failed { error } => {
                        warn!("[Claim] round {} pool {} failed: {}", round.round, claim.pid, error)
                    }
                    result => info!("[Claim] round {} pool {}: {:?}", round.round, claim.pid, result),
                }
            }
        })
        .await?;
    info!("[Claim] finished after {} rounds", rounds);
    Ok(())
}
