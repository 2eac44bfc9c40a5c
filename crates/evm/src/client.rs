use alloy_core::primitives::{Address, Bytes, B256, U256};
use alloy_provider::{Provider, ProviderBuilder, RootProvider};
use alloy_rpc_types::{BlockNumberOrTag, BlockTransactionsKind, Transaction, TransactionRequest};
use alloy_transport_http::Http;
use tracing::{debug, info};

use crate::chains::ChainConfig;
use crate::error::{EvmError, Result};
use crate::rpc::{ChainRpc, Receipt, TxStatus};
use crate::tx::SignedTx;

/// HTTP JSON-RPC connection to one chain.
pub struct EvmClient {
    provider: RootProvider<Http<reqwest::Client>>,
    rpc_url: String,
    chain_id: u64,
}

impl std::fmt::Debug for EvmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmClient")
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

impl EvmClient {
    /// Opens the connection and fails fast when the node does not answer or
    /// reports a different chain than configured.
    pub async fn connect(config: &ChainConfig) -> Result<Self> {
        let expected = config.require_chain_id()?;
        let url: reqwest::Url = config.rpc_url.parse().map_err(|e| EvmError::Connection {
            url: config.rpc_url.clone(),
            reason: format!("invalid URL: {}", e),
        })?;
        let provider = ProviderBuilder::new().on_http(url);

        let chain_id = provider.get_chain_id().await.map_err(|e| EvmError::Connection {
            url: config.rpc_url.clone(),
            reason: e.to_string(),
        })?;
        if chain_id != expected {
            return Err(EvmError::InvalidConfig(format!(
                "{} reports chain id {}, expected {} for {}",
                config.rpc_url, chain_id, expected, config.name
            )));
        }

        info!("[EvmClient] connected to {} (chain id {})", config.name, chain_id);
        Ok(Self {
            provider,
            rpc_url: config.rpc_url.clone(),
            chain_id,
        })
    }

    pub async fn get_transaction(&self, tx_hash: B256) -> Result<Option<Transaction>> {
        self.provider
            .get_transaction_by_hash(tx_hash)
            .await
            .map_err(|e| EvmError::Rpc(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ChainRpc for EvmClient {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| EvmError::Rpc(e.to_string()))
    }

    async fn transaction_count(&self, address: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(address)
            .await
            .map_err(|e| EvmError::Rpc(e.to_string()))
    }

    async fn gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| EvmError::Rpc(e.to_string()))
    }

    async fn base_fee(&self) -> Result<Option<u128>> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest, BlockTransactionsKind::Hashes)
            .await
            .map_err(|e| EvmError::Rpc(e.to_string()))?
            .ok_or_else(|| EvmError::Rpc("node returned no latest block".to_string()))?;
        Ok(block.header.base_fee_per_gas.map(u128::from))
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64> {
        self.provider
            .estimate_gas(tx)
            .await
            .map_err(|e| EvmError::Estimation(e.to_string()))
    }

    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes> {
        self.provider
            .call(tx)
            .await
            .map_err(|e| EvmError::Rpc(e.to_string()))
    }

    async fn send_transaction(&self, tx: &SignedTx) -> Result<B256> {
        let pending = self
            .provider
            .send_raw_transaction(tx.raw())
            .await
            .map_err(|e| EvmError::Submission(e.to_string()))?;
        debug!("[EvmClient] broadcast {}", pending.tx_hash());
        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, tx_hash: B256) -> Result<Option<Receipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| EvmError::Rpc(e.to_string()))?;

        Ok(receipt.map(|r| Receipt {
            status: if r.status() { TxStatus::Success } else { TxStatus::Failure },
            block_number: r.block_number,
            tx_hash: r.transaction_hash,
            gas_used: u128::from(r.gas_used),
        }))
    }
}
