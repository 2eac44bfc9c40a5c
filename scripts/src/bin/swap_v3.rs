use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use onchain_evm::addresses::bsc;
use onchain_evm::calls::erc20;
use onchain_evm::swap::{ApprovalAmount, SwapAmount, SwapExecution, SwapOrder, SwapRouter};
use onchain_evm::{format_units, parse_to_raw, Address, ChainConfig, GasLimitPolicy};
use onchain_scripts::{executor, init, ChainArgs, SlippageArgs};

/// Swaps through a V3 router's `exactInputSingle`.
#[derive(Debug, Parser)]
#[command(name = "swap_v3")]
struct Cli {
    #[command(flatten)]
    chain: ChainArgs,

    #[arg(long, default_value_t = bsc::PANCAKE_V3_ROUTER)]
    router: Address,

    #[arg(long, default_value_t = bsc::WBNB)]
    token_in: Address,

    #[arg(long, default_value_t = bsc::USDT)]
    token_out: Address,

    /// Amount of the input token in human units
    #[arg(long, default_value = "0.001")]
    amount: String,

    /// Pool fee tier (500, 3000, 10000)
    #[arg(long, default_value_t = 3000)]
    fee: u32,

    /// Minutes until the swap expires
    #[arg(long, default_value_t = 20)]
    deadline_mins: u64,

    #[command(flatten)]
    slippage: SlippageArgs,

    /// Approve an unlimited allowance instead of the exact amount
    #[arg(long)]
    unlimited_approval: bool,

    /// Gas limit for the approval: `estimate`, `estimate-or:<n>` or `<n>`
    #[arg(long)]
    approval_gas: Option<GasLimitPolicy>,

    /// Gas limit for the swap
    #[arg(long)]
    swap_gas: Option<GasLimitPolicy>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init();
    let cli = Cli::parse();

    let executor = executor(cli.chain.config(ChainConfig::bsc())).await?;
    let decimals_in = erc20::decimals(executor.rpc(), cli.token_in).await.get();
    let decimals_out = erc20::decimals(executor.rpc(), cli.token_out).await.get();

    let router = SwapRouter::V3 {
        router: cli.router,
        token_in: cli.token_in,
        token_out: cli.token_out,
        fee: cli.fee,
        deadline: Duration::from_secs(cli.deadline_mins * 60),
    };
    let amount = SwapAmount::Exact(parse_to_raw(&cli.amount, decimals_in)?);
    let mut order = SwapOrder::new(router, amount, cli.slippage.guard(decimals_out)?);
    if cli.unlimited_approval {
        order = order.with_approval(ApprovalAmount::Unlimited);
    }
    if let Some(policy) = cli.approval_gas {
        order = order.with_approval_gas(policy);
    }
    if let Some(policy) = cli.swap_gas {
        order = order.with_swap_gas(policy);
    }

    let report = SwapExecution::new(&executor, order).run().await?;
    info!(
        "[SwapV3] swapped {} {} for {} {} in {}",
        format_units(report.amount_in, decimals_in),
        report.token_in.symbol.value(),
        format_units(report.outcome.received(), decimals_out),
        report.token_out.symbol.value(),
        report.outcome.tx_hash()
    );
    Ok(())
}
