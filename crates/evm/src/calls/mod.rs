use alloy_core::primitives::{Address, Bytes, U256};
use alloy_core::sol_types::SolCall;
use alloy_network::TransactionBuilder;
use alloy_rpc_types::TransactionRequest;

use crate::error::{EvmError, Result};
use crate::rpc::ChainRpc;

pub mod erc20;
pub mod reward_pool;
pub mod solidly;
pub mod v3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// The target contract address
    pub to: Address,
    /// The native value to send with the call
    pub value: U256,
    /// The calldata for the transaction
    pub data: Bytes,
}

impl ContractCall {
    pub fn new<C: SolCall>(to: Address, call: &C) -> Self {
        Self {
            to,
            value: U256::ZERO,
            data: call.abi_encode().into(),
        }
    }

    /// A plain transfer of the native coin.
    pub fn native_transfer(to: Address, value: U256) -> Self {
        Self {
            to,
            value,
            data: Bytes::new(),
        }
    }
}

/// Runs `call` against `to` with `eth_call` and decodes its return values.
pub async fn view<R, C>(rpc: &R, to: Address, call: &C) -> Result<C::Return>
where
    R: ChainRpc + ?Sized,
    C: SolCall + Sync,
{
    simulate(rpc, None, &ContractCall::new(to, call)).await.and_then(|output| decode::<C>(&output))
}

/// `eth_call` for an arbitrary call, optionally on behalf of `from`.
pub async fn simulate<R: ChainRpc + ?Sized>(
    rpc: &R,
    from: Option<Address>,
    call: &ContractCall,
) -> Result<Bytes> {
    let mut tx = TransactionRequest::default()
        .with_to(call.to)
        .with_value(call.value)
        .with_input(call.data.clone());
    if let Some(from) = from {
        tx = tx.with_from(from);
    }
    rpc.call(&tx).await
}

pub fn decode<C: SolCall>(output: &[u8]) -> Result<C::Return> {
    C::abi_decode_returns(output, true)
        .map_err(|e| EvmError::Abi(format!("cannot decode {} output: {}", C::SIGNATURE, e)))
}
