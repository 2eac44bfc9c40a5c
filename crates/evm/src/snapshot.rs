use alloy_core::primitives::{Address, U256};
use serde::Serialize;

use crate::amount::{format_ether, format_gwei, format_large_number, format_units, to_human};
use crate::calls::erc20::{self, TokenInfo};
use crate::error::Result;
use crate::rpc::ChainRpc;

#[derive(Debug, Clone, Serialize)]
pub struct AccountSnapshot {
    pub chain_id: u64,
    pub address: Address,
    pub nonce: u64,
    pub gas_price_wei: u128,
    pub native_balance: U256,
    pub native_symbol: String,
}

impl AccountSnapshot {
    pub fn describe(&self) -> Vec<String> {
        vec![
            format!("gas price: {} gwei", format_gwei(self.gas_price_wei)),
            format!("nonce: {}", self.nonce),
            format!(
                "{} balance: {} {}",
                self.native_symbol,
                format_ether(self.native_balance),
                self.native_symbol
            ),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenSnapshot {
    pub token: TokenInfo,
    pub balance: U256,
    pub total_supply: U256,
    pub spender: Option<Address>,
    pub allowance: Option<U256>,
}

impl TokenSnapshot {
    pub fn describe(&self) -> Vec<String> {
        let decimals = self.token.decimals.get();
        let symbol = self.token.symbol.value();
        let mut lines = vec![
            format!("{} balance: {} {}", symbol, format_units(self.balance, decimals), symbol),
            format!("total supply: {} {}", format_units(self.total_supply, decimals), symbol),
            format!(
                "total supply (short): {}",
                format_large_number(&to_human(self.total_supply, decimals))
            ),
        ];
        if let (Some(spender), Some(allowance)) = (self.spender, self.allowance) {
            lines.push(format!(
                "allowance to {}: {} {}",
                spender,
                format_units(allowance, decimals),
                symbol
            ));
        }
        if self.token.decimals.is_assumed() {
            lines.push(format!("(decimals assumed to be {})", decimals));
        }
        lines
    }
}

pub async fn account_snapshot<R: ChainRpc + ?Sized>(
    rpc: &R,
    address: Address,
    native_symbol: &str,
) -> Result<AccountSnapshot> {
    Ok(AccountSnapshot {
        chain_id: rpc.chain_id().await?,
        address,
        nonce: rpc.transaction_count(address).await?,
        gas_price_wei: rpc.gas_price().await?,
        native_balance: rpc.balance(address).await?,
        native_symbol: native_symbol.to_string(),
    })
}

pub async fn token_snapshot<R: ChainRpc + ?Sized>(
    rpc: &R,
    token: Address,
    owner: Address,
    spender: Option<Address>,
) -> Result<TokenSnapshot> {
    let info = erc20::token_info(rpc, token).await;
    let balance = erc20::balance_of(rpc, token, owner).await?;
    let total_supply = erc20::total_supply(rpc, token).await?;
    let allowance = match spender {
        Some(spender) => Some(erc20::allowance(rpc, token, owner, spender).await?),
        None => None,
    };
    Ok(TokenSnapshot {
        token: info,
        balance,
        total_supply,
        spender,
        allowance,
    })
}
