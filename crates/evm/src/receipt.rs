use std::time::Duration;

use alloy_core::primitives::B256;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::error::{ErrorKind, EvmError, Result};
use crate::rpc::{ChainRpc, Receipt};

/// Polls for a receipt until it appears or the timeout elapses.
///
/// A transient failure of a single poll does not end the wait: the transaction
/// is already broadcast and may still be mined.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptWaiter {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl ReceiptWaiter {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self { timeout, poll_interval }
    }

    pub async fn wait<R: ChainRpc + ?Sized>(&self, rpc: &R, tx_hash: B256) -> Result<Receipt> {
        let started = Instant::now();
        loop {
            match rpc.receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    info!(
                        "[ReceiptWaiter] {} mined in block {:?} with status {:?}",
                        tx_hash, receipt.block_number, receipt.status
                    );
                    return Ok(receipt);
                }
                Ok(None) => {}
                Err(e) if e.kind() == ErrorKind::Transient => {
                    warn!("[ReceiptWaiter] receipt lookup for {} failed, retrying: {}", tx_hash, e);
                }
                Err(e) => return Err(e),
            }

            let elapsed = started.elapsed();
            if elapsed >= self.timeout {
                return Err(EvmError::ReceiptTimeout {
                    tx_hash,
                    waited_secs: elapsed.as_secs(),
                });
            }
            debug!("[ReceiptWaiter] {} pending after {:?}", tx_hash, elapsed);
            sleep(self.poll_interval.min(self.timeout - elapsed)).await;
        }
    }
}
