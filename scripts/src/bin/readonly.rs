use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use onchain_common::optional_env_var;
use onchain_evm::addresses::arbitrum;
use onchain_evm::env::USER_ADDRESS;
use onchain_evm::snapshot::{account_snapshot, token_snapshot, AccountSnapshot, TokenSnapshot};
use onchain_evm::{Address, ChainConfig, ChainRpc, Receipt, B256};
use onchain_scripts::{connect, init, ChainArgs};

/// Reads account, token and transaction state without signing anything.
#[derive(Debug, Parser)]
#[command(name = "readonly")]
struct Cli {
    #[command(flatten)]
    chain: ChainArgs,

    /// Account to inspect; defaults to USER_ADDRESS
    #[arg(long)]
    address: Option<Address>,

    /// ERC-20 token to inspect
    #[arg(long, default_value_t = arbitrum::USDC)]
    token: Address,

    /// Spender whose allowance is reported
    #[arg(long, default_value_t = arbitrum::SUSHI_V3_ROUTER)]
    spender: Address,

    /// Transaction to look up
    #[arg(long)]
    tx_hash: Option<B256>,

    /// Print one JSON document instead of log lines
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    account: AccountSnapshot,
    token: TokenSnapshot,
    receipt: Option<Receipt>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init();
    let cli = Cli::parse();

    let address = match cli.address {
        Some(address) => address,
        None => optional_env_var(USER_ADDRESS)
            .context("pass --address or set USER_ADDRESS")?
            .parse()
            .context("USER_ADDRESS is not an address")?,
    };

    let config = cli.chain.config(ChainConfig::arbitrum());
    let client = connect(&config).await?;

    let account = account_snapshot(&client, address, &config.native_symbol).await?;
    let token = token_snapshot(&client, cli.token, address, Some(cli.spender)).await?;

    let mut receipt = None;
    if let Some(tx_hash) = cli.tx_hash {
        match client.get_transaction(tx_hash).await? {
            Some(tx) if !cli.json => info!("[Readonly] transaction: {:?}", tx),
            Some(_) => {}
            None => info!("[Readonly] transaction {} not found", tx_hash),
        }
        receipt = client.receipt(tx_hash).await?;
        if receipt.is_none() {
            info!("[Readonly] no receipt for {} yet", tx_hash);
        }
    }

    if cli.json {
        let report = Report { account, token, receipt };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    info!("[Readonly] {} on {}", address, config.name);
    for line in account.describe().into_iter().chain(token.describe()) {
        info!("[Readonly] {}", line);
    }
    if let Some(receipt) = receipt {
        info!(
            "[Readonly] receipt: status {:?}, block {:?}, gas used {}",
            receipt.status, receipt.block_number, receipt.gas_used
        );
    }
    Ok(())
}
