use alloy_core::primitives::{Address, U256};
use alloy_core::sol;
use serde::{Deserialize, Serialize};

use crate::error::{EvmError, Result};
use crate::rpc::ChainRpc;

use super::{view, ContractCall};

sol! {
    #[derive(Debug)]
    struct route {
        address from;
        address to;
        bool stable;
    }

    #[derive(Debug)]
    function swapExactTokensForTokens(
        uint256 amountIn,
        uint256 amountOutMin,
        route[] calldata routes,
        address to
    ) external returns (uint256[] memory amounts);

    #[derive(Debug)]
    function getAmountsOut(
        uint256 amountIn,
        route[] memory routes
    ) external view returns (uint256[] memory amounts);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteHop {
    pub from: Address,
    pub to: Address,
    pub stable: bool,
}

impl RouteHop {
    pub fn new(from: Address, to: Address, stable: bool) -> Self {
        Self { from, to, stable }
    }
}

impl From<RouteHop> for route {
    fn from(hop: RouteHop) -> Self {
        route {
            from: hop.from,
            to: hop.to,
            stable: hop.stable,
        }
    }
}

/// A contiguous path of pool hops from `token_in` to `token_out`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapRoute {
    hops: Vec<RouteHop>,
}

impl SwapRoute {
    pub fn new(token_in: Address, hops: Vec<RouteHop>) -> Result<Self> {
        let first = hops
            .first()
            .ok_or_else(|| EvmError::InvalidConfig("swap route has no hops".to_string()))?;
        if first.from != token_in {
            return Err(EvmError::InvalidConfig(format!(
                "swap route starts at {}, expected input token {}",
                first.from, token_in
            )));
        }
        if let Some(gap) = hops.windows(2).find(|pair| pair[0].to != pair[1].from) {
            return Err(EvmError::InvalidConfig(format!(
                "swap route is not contiguous: hop ends at {} but the next starts at {}",
                gap[0].to, gap[1].from
            )));
        }
        Ok(Self { hops })
    }

    /// One direct hop.
    pub fn direct(token_in: Address, token_out: Address, stable: bool) -> Self {
        Self {
            hops: vec![RouteHop::new(token_in, token_out, stable)],
        }
    }

    pub fn hops(&self) -> &[RouteHop] {
        &self.hops
    }

    pub fn token_in(&self) -> Address {
        self.hops[0].from
    }

    pub fn token_out(&self) -> Address {
        self.hops[self.hops.len() - 1].to
    }

    fn routes(&self) -> Vec<route> {
        self.hops.iter().copied().map(route::from).collect()
    }
}

pub fn swap_exact_tokens_for_tokens(
    router: Address,
    recipient: Address,
    path: &SwapRoute,
    amount_in: U256,
    amount_out_min: U256,
) -> ContractCall {
    ContractCall::new(
        router,
        &swapExactTokensForTokensCall {
            amountIn: amount_in,
            amountOutMin: amount_out_min,
            routes: path.routes(),
            to: recipient,
        },
    )
}

/// Expected output of the last hop for `amount_in`, as priced by the router.
pub async fn quote<R: ChainRpc + ?Sized>(
    rpc: &R,
    router: Address,
    path: &SwapRoute,
    amount_in: U256,
) -> Result<U256> {
    let amounts = view(
        rpc,
        router,
        &getAmountsOutCall {
            amountIn: amount_in,
            routes: path.routes(),
        },
    )
    .await?
    .amounts;
    amounts
        .last()
        .copied()
        .ok_or_else(|| EvmError::Abi("getAmountsOut returned no amounts".to_string()))
}
