use alloy_core::primitives::{Address, Bytes, B256, U256};
use alloy_rpc_types::TransactionRequest;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tx::SignedTx;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub status: TxStatus,
    pub block_number: Option<u64>,
    pub tx_hash: B256,
    pub gas_used: u128,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status == TxStatus::Success
    }
}

/// The JSON-RPC surface the pipeline needs from a node.
///
/// Every method is a single request; nothing here retries.
#[async_trait::async_trait]
pub trait ChainRpc: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;
    async fn balance(&self, address: Address) -> Result<U256>;
    /// The account's current transaction count, used as the next nonce.
    async fn transaction_count(&self, address: Address) -> Result<u64>;
    async fn gas_price(&self) -> Result<u128>;
    /// `baseFeePerGas` of the latest block, `None` on chains without EIP-1559.
    async fn base_fee(&self) -> Result<Option<u128>>;
    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64>;
    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes>;
    async fn send_transaction(&self, tx: &SignedTx) -> Result<B256>;
    async fn receipt(&self, tx_hash: B256) -> Result<Option<Receipt>>;
}
