//! Shared command-line plumbing for the transaction scripts.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use onchain_common::{load_dotenv, optional_env_var, setup_tracing, EnvVars};
use onchain_evm::env::RPC_URL;
use onchain_evm::swap::SlippageGuard;
use onchain_evm::{parse_to_raw, ChainConfig, EvmClient, EvmEnv, LocalWallet, TxExecutor};

/// Loads `.env` and installs the log subscriber.
pub fn init() {
    load_dotenv();
    setup_tracing();
}

#[derive(Debug, Clone, Args)]
pub struct ChainArgs {
    /// Chain preset (arbitrum, bsc, sonic)
    #[arg(long)]
    pub chain: Option<ChainConfig>,

    /// JSON-RPC endpoint; falls back to RPC_URL, then the preset's endpoint
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Seconds to wait for a receipt before giving up
    #[arg(long)]
    pub receipt_timeout: Option<u64>,
}

impl ChainArgs {
    pub fn config(&self, default: ChainConfig) -> ChainConfig {
        let mut config = self.chain.clone().unwrap_or(default);
        if let Some(url) = self.rpc_url.clone().or_else(|| optional_env_var(RPC_URL)) {
            config = config.with_rpc_url(url);
        }
        if let Some(secs) = self.receipt_timeout {
            config = config.with_receipt_timeout(Duration::from_secs(secs));
        }
        config
    }
}

#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct SlippageArgs {
    /// Minimum amount of the output token to accept, in human units
    #[arg(long)]
    pub min_out: Option<String>,

    /// Accept up to this many basis points below the router's quote
    #[arg(long)]
    pub slippage_bps: Option<u16>,

    /// Accept any execution price
    #[arg(long)]
    pub unprotected: bool,
}

impl SlippageArgs {
    pub fn guard(&self, decimals_out: u8) -> Result<SlippageGuard> {
        if let Some(min_out) = &self.min_out {
            return Ok(SlippageGuard::MinOut(parse_to_raw(min_out, decimals_out)?));
        }
        if let Some(bps) = self.slippage_bps {
            return Ok(SlippageGuard::Tolerance { bps });
        }
        Ok(SlippageGuard::Unprotected)
    }
}

pub async fn connect(config: &ChainConfig) -> Result<EvmClient> {
    EvmClient::connect(config)
        .await
        .with_context(|| format!("failed to connect to {}", config.name))
}

/// The signing key from `PRIVATE_KEY`, checked against `USER_ADDRESS` when set.
pub fn load_wallet() -> Result<LocalWallet> {
    let env = EvmEnv::load().context("cannot load signing credentials")?;
    let wallet = LocalWallet::from_hex(env.private_key())?;
    wallet.ensure_address(env.user_address)?;
    info!("[Wallet] using {}", wallet.eth_address());
    Ok(wallet)
}

pub async fn executor(config: ChainConfig) -> Result<TxExecutor<EvmClient>> {
    let wallet = load_wallet()?;
    let client = connect(&config).await?;
    Ok(TxExecutor::new(client, wallet, config))
}
