pub mod addresses;
pub mod amount;
pub mod calls;
pub mod chains;
pub mod claim;
mod client;
pub mod env;
pub mod error;
mod executor;
pub mod fees;
mod receipt;
mod rpc;
pub mod snapshot;
mod sourced;
pub mod swap;
mod tx;
mod wallet;

pub use amount::{format_units, parse_to_raw, to_human, to_raw, to_wei, TokenAmount};
pub use chains::{ChainConfig, FeeMode};
pub use client::EvmClient;
pub use env::EvmEnv;
pub use error::{ErrorKind, EvmError, Result};
pub use executor::TxExecutor;
pub use fees::{GasLimitPolicy, GasPricing};
pub use receipt::ReceiptWaiter;
pub use rpc::{ChainRpc, Receipt, TxStatus};
pub use sourced::Sourced;
pub use tx::{SignedTx, TransactionBuilder, TxRequest};
pub use wallet::LocalWallet;

pub use alloy_core::primitives::{Address, Bytes, B256, U256};
