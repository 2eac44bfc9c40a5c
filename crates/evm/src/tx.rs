use alloy_core::primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_network::TransactionBuilder as _;
use alloy_rpc_types::TransactionRequest;
use serde::Serialize;
use tracing::{debug, info};

use crate::calls::ContractCall;
use crate::chains::FeeMode;
use crate::error::{EvmError, Result};
use crate::fees::{resolve_gas_limit, resolve_pricing, GasLimitPolicy, GasPricing};
use crate::rpc::ChainRpc;

/// A fully parameterized, unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxRequest {
    pub sender: Address,
    pub to: Address,
    pub value: U256,
    pub input: Bytes,
    pub nonce: u64,
    pub chain_id: u64,
    pub pricing: GasPricing,
    pub gas_limit: u64,
}

impl TxRequest {
    pub fn to_alloy(&self) -> TransactionRequest {
        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_to(self.to)
            .with_value(self.value)
            .with_input(self.input.clone())
            .with_nonce(self.nonce)
            .with_chain_id(self.chain_id)
            .with_gas_limit(self.gas_limit);

        match self.pricing {
            GasPricing::Legacy { gas_price } => tx.with_gas_price(gas_price),
            GasPricing::Eip1559 { max_fee_per_gas, max_priority_fee_per_gas } => tx
                .with_max_fee_per_gas(max_fee_per_gas)
                .with_max_priority_fee_per_gas(max_priority_fee_per_gas),
        }
    }

    /// Worst-case fee in wei: gas limit times the per-gas cap.
    pub fn max_fee_cost(&self) -> U256 {
        U256::from(self.gas_limit) * U256::from(self.pricing.max_price_per_gas())
    }
}

/// A signed transaction ready for broadcast. Consumed by submission.
#[derive(Debug, Clone)]
pub struct SignedTx {
    request: TxRequest,
    raw: Bytes,
    hash: B256,
}

impl SignedTx {
    pub(crate) fn new(request: TxRequest, raw: Bytes) -> Self {
        let hash = keccak256(&raw);
        Self { request, raw, hash }
    }

    pub fn request(&self) -> &TxRequest {
        &self.request
    }

    /// EIP-2718 encoded bytes as sent with `eth_sendRawTransaction`.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn hash(&self) -> B256 {
        self.hash
    }
}

/// Assembles [`TxRequest`]s for one sender on one chain.
///
/// The nonce is always the account's current transaction count, read last so
/// it is as fresh as possible. Two builders for the same account must not run
/// concurrently.
pub struct TransactionBuilder<'a, R: ChainRpc + ?Sized> {
    rpc: &'a R,
    chain_id: Option<u64>,
    fee_mode: FeeMode,
}

impl<'a, R: ChainRpc + ?Sized> TransactionBuilder<'a, R> {
    pub fn new(rpc: &'a R, chain_id: Option<u64>, fee_mode: FeeMode) -> Self {
        Self { rpc, chain_id, fee_mode }
    }

    pub async fn build(
        &self,
        sender: Address,
        call: &ContractCall,
        gas_policy: GasLimitPolicy,
    ) -> Result<TxRequest> {
        let chain_id = self
            .chain_id
            .ok_or_else(|| EvmError::InvalidConfig("chain id is not set".to_string()))?;

        let pricing = resolve_pricing(self.rpc, self.fee_mode).await?;

        let probe = TransactionRequest::default()
            .with_from(sender)
            .with_to(call.to)
            .with_value(call.value)
            .with_input(call.data.clone());
        let gas_limit = resolve_gas_limit(self.rpc, &probe, gas_policy).await?;

        let nonce = self.rpc.transaction_count(sender).await?;
        debug!("[TransactionBuilder] nonce for {}: {}", sender, nonce);

        let request = TxRequest {
            sender,
            to: call.to,
            value: call.value,
            input: call.data.clone(),
            nonce,
            chain_id,
            pricing,
            gas_limit,
        };
        info!(
            "[TransactionBuilder] built tx to {} (nonce {}, gas limit {}, chain {})",
            request.to, request.nonce, request.gas_limit, request.chain_id
        );
        Ok(request)
    }
}
