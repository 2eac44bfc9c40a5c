use alloy_core::primitives::{Address, B256};
use tracing::{error, info};

use crate::calls::ContractCall;
use crate::chains::ChainConfig;
use crate::error::{EvmError, Result};
use crate::fees::GasLimitPolicy;
use crate::receipt::ReceiptWaiter;
use crate::rpc::{ChainRpc, Receipt};
use crate::tx::{SignedTx, TransactionBuilder};
use crate::wallet::LocalWallet;

/// Runs build, sign, submit and wait for one wallet on one chain.
pub struct TxExecutor<R: ChainRpc> {
    rpc: R,
    wallet: LocalWallet,
    chain: ChainConfig,
}

impl<R: ChainRpc> TxExecutor<R> {
    pub fn new(rpc: R, wallet: LocalWallet, chain: ChainConfig) -> Self {
        Self { rpc, wallet, chain }
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    pub fn sender(&self) -> Address {
        self.wallet.eth_address()
    }

    pub fn builder(&self) -> TransactionBuilder<'_, R> {
        TransactionBuilder::new(&self.rpc, self.chain.chain_id, self.chain.fee_mode)
    }

    pub fn waiter(&self) -> ReceiptWaiter {
        ReceiptWaiter::new(self.chain.receipt_timeout, self.chain.receipt_poll_interval)
    }

    pub async fn prepare(&self, call: &ContractCall, gas_policy: GasLimitPolicy) -> Result<SignedTx> {
        let request = self.builder().build(self.sender(), call, gas_policy).await?;
        self.wallet.sign(request).await
    }

    pub async fn send(&self, signed: SignedTx) -> Result<B256> {
        let tx_hash = self.rpc.send_transaction(&signed).await?;
        if tx_hash != signed.hash() {
            return Err(EvmError::Submission(format!(
                "node returned hash {} for signed transaction {}",
                tx_hash,
                signed.hash()
            )));
        }
        info!("[TxExecutor] sent {} (nonce {})", tx_hash, signed.request().nonce);
        Ok(tx_hash)
    }

    /// Builds, signs and broadcasts without waiting for inclusion.
    pub async fn submit(&self, call: &ContractCall, gas_policy: GasLimitPolicy) -> Result<B256> {
        let signed = self.prepare(call, gas_policy).await?;
        self.send(signed).await
    }

    /// Waits for the receipt; a mined transaction with failure status is an error.
    pub async fn confirm(&self, tx_hash: B256) -> Result<Receipt> {
        let receipt = self.waiter().wait(&self.rpc, tx_hash).await?;
        if !receipt.succeeded() {
            error!("[TxExecutor] {} reverted in block {:?}", tx_hash, receipt.block_number);
            return Err(EvmError::Reverted {
                tx_hash,
                block_number: receipt.block_number,
            });
        }
        info!(
            "[TxExecutor] {} confirmed in block {:?}, gas used {}",
            tx_hash, receipt.block_number, receipt.gas_used
        );
        Ok(receipt)
    }

    pub async fn execute(&self, call: &ContractCall, gas_policy: GasLimitPolicy) -> Result<Receipt> {
        let tx_hash = self.submit(call, gas_policy).await?;
        self.confirm(tx_hash).await
    }
}
