use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;

use onchain_evm::amount::format_ether;
use onchain_evm::calls::ContractCall;
use onchain_evm::{to_wei, Address, ChainConfig, ChainRpc, EvmClient, GasLimitPolicy, U256};
use onchain_scripts::{executor, init, ChainArgs};

/// Sends the native coin to one recipient.
#[derive(Debug, Parser)]
#[command(name = "eth_transfer")]
struct Cli {
    #[command(flatten)]
    chain: ChainArgs,

    /// Recipient address
    #[arg(long)]
    to: Address,

    /// Amount in whole coins, e.g. 0.0002
    #[arg(long)]
    amount: String,
}

async fn log_balances(rpc: &EvmClient, symbol: &str, stage: &str, sender: Address, recipient: Address) -> Result<U256> {
    let sender_balance = rpc.balance(sender).await?;
    let recipient_balance = rpc.balance(recipient).await?;
    info!("[EthTransfer] {} sender {}: {} {}", stage, sender, format_ether(sender_balance), symbol);
    info!("[EthTransfer] {} recipient {}: {} {}", stage, recipient, format_ether(recipient_balance), symbol);
    Ok(sender_balance)
}

#[tokio::main]
async fn main() -> Result<()> {
    init();
    let cli = Cli::parse();

    let executor = executor(cli.chain.config(ChainConfig::arbitrum())).await?;
    let symbol = executor.chain().native_symbol.clone();
    let sender = executor.sender();
    let value = to_wei(&cli.amount)?;

    let balance = log_balances(executor.rpc(), &symbol, "before", sender, cli.to).await?;
    let call = ContractCall::native_transfer(cli.to, value);
    let signed = executor.prepare(&call, GasLimitPolicy::Estimate).await?;
    let max_fee = signed.request().max_fee_cost();
    if balance < value.saturating_add(max_fee) {
        bail!(
            "balance {} {} does not cover {} {} plus up to {} {} in fees",
            format_ether(balance),
            symbol,
            format_ether(value),
            symbol,
            format_ether(max_fee),
            symbol
        );
    }

    let tx_hash = executor.send(signed).await?;
    let receipt = executor.confirm(tx_hash).await?;
    info!(
        "[EthTransfer] sent {} {} to {} in {}",
        format_ether(value),
        symbol,
        cli.to,
        receipt.tx_hash
    );
    log_balances(executor.rpc(), &symbol, "after", sender, cli.to).await?;
    Ok(())
}
