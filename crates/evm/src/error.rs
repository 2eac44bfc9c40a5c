use alloy_core::primitives::{B256, U256};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EvmError>;

#[derive(Debug, Error)]
pub enum EvmError {
    #[error("cannot reach RPC endpoint {url}: {reason}")]
    Connection { url: String, reason: String },
    #[error("missing credential: {0}")]
    MissingCredential(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("estimation failed: {0}")]
    Estimation(String),
    #[error("node rejected transaction: {0}")]
    Submission(String),
    #[error("no receipt for {tx_hash} after {waited_secs}s")]
    ReceiptTimeout { tx_hash: B256, waited_secs: u64 },
    #[error("transaction {tx_hash} reverted in block {block_number:?}")]
    Reverted { tx_hash: B256, block_number: Option<u64> },
    #[error("allowance {allowance} is below the required {required}")]
    InsufficientAllowance { allowance: U256, required: U256 },
    #[error("ABI decode error: {0}")]
    Abi(String),
    #[error("amount error: {0}")]
    Amount(String),
}

/// Coarse classification so callers can tell configuration problems from
/// flaky transport from outcomes that are final on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Nothing will succeed until the configuration or credentials change.
    Fatal,
    /// RPC-level failure; the same request may succeed later.
    Transient,
    /// The chain (or a simulated call against it) said no.
    OnChain,
}

impl EvmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvmError::Connection { .. }
            | EvmError::MissingCredential(_)
            | EvmError::InvalidConfig(_)
            | EvmError::Amount(_) => ErrorKind::Fatal,
            EvmError::Rpc(_) | EvmError::ReceiptTimeout { .. } | EvmError::Submission(_) => {
                ErrorKind::Transient
            }
            EvmError::Estimation(_)
            | EvmError::Reverted { .. }
            | EvmError::InsufficientAllowance { .. }
            | EvmError::Abi(_) => ErrorKind::OnChain,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_configuration_errors_as_fatal() {
        assert!(EvmError::MissingCredential("PRIVATE_KEY".into()).is_fatal());
        assert!(EvmError::InvalidConfig("chain id is not set".into()).is_fatal());
        assert!(!EvmError::Rpc("timeout".into()).is_fatal());
    }

    #[test]
    fn separates_reverts_from_transport_failures() {
        let reverted = EvmError::Reverted { tx_hash: B256::ZERO, block_number: Some(7) };
        assert_eq!(reverted.kind(), ErrorKind::OnChain);
        assert_eq!(EvmError::Rpc("connection reset".into()).kind(), ErrorKind::Transient);
        let timeout = EvmError::ReceiptTimeout { tx_hash: B256::ZERO, waited_secs: 120 };
        assert_eq!(timeout.kind(), ErrorKind::Transient);
        let short = EvmError::InsufficientAllowance { allowance: U256::ZERO, required: U256::from(100u64) };
        assert_eq!(short.kind(), ErrorKind::OnChain);
    }
}
