use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, warn};

use onchain_evm::addresses::arbitrum;
use onchain_evm::calls::erc20::{self, TokenInfo};
use onchain_evm::{Address, ChainConfig, EvmClient, GasLimitPolicy, TokenAmount};
use onchain_scripts::{executor, init, ChainArgs};

/// Transfers an ERC-20 token to one recipient.
#[derive(Debug, Parser)]
#[command(name = "erc20_transfer")]
struct Cli {
    #[command(flatten)]
    chain: ChainArgs,

    /// Token contract
    #[arg(long, default_value_t = arbitrum::USDC_E)]
    token: Address,

    /// Recipient address
    #[arg(long)]
    to: Address,

    /// Amount in token units, e.g. 0.2
    #[arg(long)]
    amount: String,
}

async fn log_balances(
    rpc: &EvmClient,
    token: &TokenInfo,
    stage: &str,
    sender: Address,
    recipient: Address,
) -> Result<TokenAmount> {
    let decimals = token.decimals.get();
    let symbol = token.symbol.value();
    let sender_balance = TokenAmount::new(erc20::balance_of(rpc, token.address, sender).await?, decimals);
    let recipient_balance = TokenAmount::new(erc20::balance_of(rpc, token.address, recipient).await?, decimals);
    info!("[Erc20Transfer] {} sender {}: {} {}", stage, sender, sender_balance, symbol);
    info!("[Erc20Transfer] {} recipient {}: {} {}", stage, recipient, recipient_balance, symbol);
    Ok(sender_balance)
}

#[tokio::main]
async fn main() -> Result<()> {
    init();
    let cli = Cli::parse();

    let executor = executor(cli.chain.config(ChainConfig::arbitrum())).await?;
    let sender = executor.sender();
    let token = erc20::token_info(executor.rpc(), cli.token).await;
    if token.decimals.is_assumed() {
        warn!("[Erc20Transfer] decimals of {} are assumed; the raw amount may be wrong", cli.token);
    }

    let amount = TokenAmount::from_human(&cli.amount, token.decimals.get())?;
    let balance = log_balances(executor.rpc(), &token, "before", sender, cli.to).await?;
    if balance.raw < amount.raw {
        bail!("{} balance {} is below the transfer amount {}", token.symbol.value(), balance, amount);
    }

    let call = erc20::transfer(cli.token, cli.to, amount.raw);
    let receipt = executor.execute(&call, GasLimitPolicy::Estimate).await?;
    info!(
        "[Erc20Transfer] sent {} {} ({} raw) to {} in {}",
        amount,
        token.symbol.value(),
        amount.raw,
        cli.to,
        receipt.tx_hash
    );
    log_balances(executor.rpc(), &token, "after", sender, cli.to).await?;
    Ok(())
}
