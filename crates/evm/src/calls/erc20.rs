use alloy_core::primitives::{Address, U256};
use alloy_core::sol;
use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::rpc::ChainRpc;
use crate::sourced::Sourced;

use super::{view, ContractCall};

pub const DEFAULT_DECIMALS: u8 = 18;
pub const UNKNOWN_SYMBOL: &str = "Unknown";

sol! {
    #[derive(Debug)]
    function balanceOf(address account) external view returns (uint256);

    #[derive(Debug)]
    function decimals() external view returns (uint8);

    #[derive(Debug)]
    function symbol() external view returns (string);

    #[derive(Debug)]
    function totalSupply() external view returns (uint256);

    #[derive(Debug)]
    function allowance(address owner, address spender) external view returns (uint256);

    #[derive(Debug)]
    function approve(address spender, uint256 amount) external returns (bool);

    #[derive(Debug)]
    function transfer(address recipient, uint256 amount) external returns (bool);
}

/// Token metadata as far as the chain would tell us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: Sourced<String>,
    pub decimals: Sourced<u8>,
}

pub fn transfer(token: Address, recipient: Address, amount: U256) -> ContractCall {
    ContractCall::new(token, &transferCall { recipient, amount })
}

pub fn approve(token: Address, spender: Address, amount: U256) -> ContractCall {
    ContractCall::new(token, &approveCall { spender, amount })
}

pub async fn balance_of<R: ChainRpc + ?Sized>(rpc: &R, token: Address, account: Address) -> Result<U256> {
    Ok(view(rpc, token, &balanceOfCall { account }).await?._0)
}

pub async fn allowance<R: ChainRpc + ?Sized>(
    rpc: &R,
    token: Address,
    owner: Address,
    spender: Address,
) -> Result<U256> {
    Ok(view(rpc, token, &allowanceCall { owner, spender }).await?._0)
}

pub async fn total_supply<R: ChainRpc + ?Sized>(rpc: &R, token: Address) -> Result<U256> {
    Ok(view(rpc, token, &totalSupplyCall {}).await?._0)
}

/// Falls back to 18 decimals when the token does not answer.
pub async fn decimals<R: ChainRpc + ?Sized>(rpc: &R, token: Address) -> Sourced<u8> {
    match view(rpc, token, &decimalsCall {}).await {
        Ok(ret) => Sourced::Queried(ret._0),
        Err(e) => {
            warn!(
                "[ERC20] decimals() failed for {} ({}), assuming {}",
                token, e, DEFAULT_DECIMALS
            );
            Sourced::Assumed(DEFAULT_DECIMALS)
        }
    }
}

pub async fn symbol<R: ChainRpc + ?Sized>(rpc: &R, token: Address) -> Sourced<String> {
    match view(rpc, token, &symbolCall {}).await {
        Ok(ret) => Sourced::Queried(ret._0),
        Err(e) => {
            warn!("[ERC20] symbol() failed for {} ({})", token, e);
            Sourced::Assumed(UNKNOWN_SYMBOL.to_string())
        }
    }
}

pub async fn token_info<R: ChainRpc + ?Sized>(rpc: &R, token: Address) -> TokenInfo {
    TokenInfo {
        address: token,
        symbol: symbol(rpc, token).await,
        decimals: decimals(rpc, token).await,
    }
}
