use std::time::Duration;

use alloy_core::primitives::aliases::{U160, U24};
use alloy_core::primitives::{Address, U256};
use alloy_core::sol;
use onchain_common::get_current_timestamp;

use crate::error::Result;
use crate::rpc::ChainRpc;

use super::{decode, simulate, ContractCall};

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(20 * 60);

sol! {
    #[derive(Debug)]
    struct ExactInputSingleParams {
        address tokenIn;
        address tokenOut;
        uint24 fee;
        address recipient;
        uint256 deadline;
        uint256 amountIn;
        uint256 amountOutMinimum;
        uint160 sqrtPriceLimitX96;
    }

    #[derive(Debug)]
    function exactInputSingle(ExactInputSingleParams calldata params)
        external payable returns (uint256 amountOut);
}

/// A single-pool exact-input swap on a V3 router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExactInput {
    pub token_in: Address,
    pub token_out: Address,
    /// Pool fee tier in hundredths of a bip, e.g. 3000 for 0.3%.
    pub fee: u32,
    pub recipient: Address,
    pub deadline: u64,
    pub amount_in: U256,
}

impl ExactInput {
    fn params(&self, amount_out_minimum: U256) -> ExactInputSingleParams {
        ExactInputSingleParams {
            tokenIn: self.token_in,
            tokenOut: self.token_out,
            fee: U24::from(self.fee),
            recipient: self.recipient,
            deadline: U256::from(self.deadline),
            amountIn: self.amount_in,
            amountOutMinimum: amount_out_minimum,
            sqrtPriceLimitX96: U160::ZERO,
        }
    }
}

/// Unix timestamp `offset` from now.
pub fn deadline_after(offset: Duration) -> u64 {
    get_current_timestamp() + offset.as_secs()
}

pub fn exact_input_single(router: Address, swap: &ExactInput, amount_out_minimum: U256) -> ContractCall {
    ContractCall::new(
        router,
        &exactInputSingleCall {
            params: swap.params(amount_out_minimum),
        },
    )
}

/// Simulates the swap from `sender` with no output floor and returns the output amount.
///
/// The simulation executes the real transfer path, so the sender needs the
/// balance and allowance for `amount_in` at the time of the call.
pub async fn quote<R: ChainRpc + ?Sized>(
    rpc: &R,
    router: Address,
    sender: Address,
    swap: &ExactInput,
) -> Result<U256> {
    let output = simulate(rpc, Some(sender), &exact_input_single(router, swap, U256::ZERO)).await?;
    Ok(decode::<exactInputSingleCall>(&output)?.amountOut)
}
