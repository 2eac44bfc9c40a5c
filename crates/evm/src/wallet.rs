use alloy_core::primitives::Address;
use alloy_eips::eip2718::Encodable2718;
use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_signer_local::PrivateKeySigner;

use crate::error::{EvmError, Result};
use crate::tx::{SignedTx, TxRequest};

/// The locally held signing key for one script run.
#[derive(Clone)]
pub struct LocalWallet {
    wallet: PrivateKeySigner,
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.eth_address())
            .finish()
    }
}

impl LocalWallet {
    pub fn from_private_key(private_key: &[u8; 32]) -> Result<Self> {
        let wallet = PrivateKeySigner::from_slice(private_key)
            .map_err(|e| EvmError::MissingCredential(format!("invalid private key: {}", e)))?;
        Ok(Self { wallet })
    }

    /// Parses a hex private key, with or without the `0x` prefix.
    pub fn from_hex(private_key: &str) -> Result<Self> {
        let trimmed = private_key.trim();
        let hex_key = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes: [u8; 32] = alloy_core::primitives::hex::decode(hex_key)
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| {
                EvmError::MissingCredential("private key must be 32 bytes of hex".to_string())
            })?;
        Self::from_private_key(&bytes)
    }

    pub fn into_alloy_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.wallet.clone())
    }

    pub fn eth_address(&self) -> Address {
        self.wallet.address()
    }

    /// Rejects a configured `USER_ADDRESS` that does not belong to this key.
    pub fn ensure_address(&self, expected: Option<Address>) -> Result<()> {
        match expected {
            Some(address) if address != self.eth_address() => Err(EvmError::InvalidConfig(format!(
                "USER_ADDRESS {} does not match the signing key's address {}",
                address,
                self.eth_address()
            ))),
            _ => Ok(()),
        }
    }

    pub async fn sign(&self, request: TxRequest) -> Result<SignedTx> {
        if request.sender != self.eth_address() {
            return Err(EvmError::InvalidConfig(format!(
                "transaction sender {} is not the wallet address {}",
                request.sender,
                self.eth_address()
            )));
        }

        let envelope = request
            .to_alloy()
            .build(&self.into_alloy_wallet())
            .await
            .map_err(|e| EvmError::InvalidConfig(format!("cannot sign transaction: {}", e)))?;

        Ok(SignedTx::new(request, envelope.encoded_2718().into()))
    }
}
