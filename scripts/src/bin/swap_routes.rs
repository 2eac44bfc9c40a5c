use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use onchain_evm::addresses::sonic;
use onchain_evm::calls::erc20;
use onchain_evm::calls::solidly::{RouteHop, SwapRoute};
use onchain_evm::swap::{ApprovalAmount, SwapAmount, SwapExecution, SwapOrder, SwapRouter};
use onchain_evm::{format_units, parse_to_raw, Address, ChainConfig, GasLimitPolicy};
use onchain_scripts::{executor, init, ChainArgs, SlippageArgs};

/// Swaps through a Solidly-style router along one or more pool hops.
#[derive(Debug, Parser)]
#[command(name = "swap_routes")]
struct Cli {
    #[command(flatten)]
    chain: ChainArgs,

    #[arg(long, default_value_t = sonic::SWAPX_ROUTER)]
    router: Address,

    #[arg(long, default_value_t = sonic::USDC_E)]
    token_in: Address,

    #[arg(long, default_value_t = sonic::SCUSD)]
    token_out: Address,

    /// Route through a volatile pool instead of a stable one
    #[arg(long)]
    volatile: bool,

    /// Explicit hops as `from:to:stable`; overrides --token-out and --volatile
    #[arg(long = "hop")]
    hops: Vec<String>,

    /// Amount of the input token in human units; the whole balance when omitted
    #[arg(long)]
    amount: Option<String>,

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

fn parse_hop(raw: &str) -> Result<RouteHop> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [from, to, stable] = parts.as_slice() else {
        bail!("hop `{}` is not `from:to:stable`", raw);
    };
    Ok(RouteHop::new(
        from.parse().with_context(|| format!("bad hop source in `{}`", raw))?,
        to.parse().with_context(|| format!("bad hop target in `{}`", raw))?,
        stable.parse().with_context(|| format!("bad stable flag in `{}`", raw))?,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    init();
    let cli = Cli::parse();

    let path = if cli.hops.is_empty() {
        SwapRoute::direct(cli.token_in, cli.token_out, !cli.volatile)
    } else {
        let hops = cli.hops.iter().map(|h| parse_hop(h)).collect::<Result<Vec<_>>>()?;
        SwapRoute::new(cli.token_in, hops)?
    };

    let executor = executor(cli.chain.config(ChainConfig::sonic())).await?;
    let decimals_in = erc20::decimals(executor.rpc(), path.token_in()).await.get();
    let decimals_out = erc20::decimals(executor.rpc(), path.token_out()).await.get();

    let amount = match &cli.amount {
        Some(amount) => SwapAmount::Exact(parse_to_raw(amount, decimals_in)?),
        None => SwapAmount::WholeBalance,
    };
    let router = SwapRouter::Routes { router: cli.router, path };
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
        "[SwapRoutes] swapped {} {} for {} {} in {}",
        format_units(report.amount_in, decimals_in),
        report.token_in.symbol.value(),
        format_units(report.outcome.received(), decimals_out),
        report.token_out.symbol.value(),
        report.outcome.tx_hash()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use onchain_evm::swap::SlippageGuard;

    use super::*;

    #[test]
    fn hop_parses_addresses_and_stable_flag() {
        let raw = format!("{}:{}:false", sonic::USDC_E, sonic::SCUSD);
        let hop = parse_hop(&raw).unwrap();
        assert_eq!(hop, RouteHop::new(sonic::USDC_E, sonic::SCUSD, false));
    }

    #[test]
    fn malformed_hops_are_rejected() {
        assert!(parse_hop(&format!("{}:{}", sonic::USDC_E, sonic::SCUSD)).is_err());
        assert!(parse_hop(&format!("{}:{}:true:extra", sonic::USDC_E, sonic::SCUSD)).is_err());
        assert!(parse_hop(&format!("0x12:{}:true", sonic::SCUSD)).is_err());

        let err = parse_hop(&format!("{}:{}:yes", sonic::USDC_E, sonic::SCUSD)).unwrap_err();
        assert!(err.to_string().contains("bad stable flag"));
    }

    #[test]
    fn cli_defaults_to_whole_balance_on_sonic_pools() {
        let cli = Cli::try_parse_from(["swap_routes", "--slippage-bps", "30"]).unwrap();
        assert_eq!(cli.amount, None);
        assert!(cli.hops.is_empty());
        assert_eq!(cli.router, sonic::SWAPX_ROUTER);
        assert_eq!(cli.slippage.guard(6).unwrap(), SlippageGuard::Tolerance { bps: 30 });
    }

    #[test]
    fn cli_requires_a_slippage_choice() {
        assert!(Cli::try_parse_from(["swap_routes", "--amount", "1"]).is_err());
    }

    #[test]
    fn cli_collects_repeated_hops_and_gas_policies() {
        let first = format!("{}:{}:true", sonic::USDC_E, sonic::SCUSD);
        let cli = Cli::try_parse_from([
            "swap_routes",
            "--unprotected",
            "--hop",
            first.as_str(),
            "--hop",
            "0x0000000000000000000000000000000000000001:0x0000000000000000000000000000000000000002:false",
            "--swap-gas",
            "estimate-or:300000",
        ])
        .unwrap();
        assert_eq!(cli.hops.len(), 2);
        assert_eq!(cli.swap_gas, Some(GasLimitPolicy::EstimateOr(300_000)));
        assert_eq!(cli.approval_gas, None);
    }
}
