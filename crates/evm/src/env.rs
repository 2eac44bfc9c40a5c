use std::str::FromStr;

use alloy_core::primitives::Address;
use onchain_common::{optional_env_var, EnvVars};

use crate::error::EvmError;

pub const PRIVATE_KEY: &str = "PRIVATE_KEY";
pub const USER_ADDRESS: &str = "USER_ADDRESS";
pub const RPC_URL: &str = "RPC_URL";

/// Signing credentials and per-run overrides read from the process environment.
pub struct EvmEnv {
    private_key: String,
    pub user_address: Option<Address>,
    pub rpc_url: Option<String>,
}

impl std::fmt::Debug for EvmEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmEnv")
            .field("private_key", &"<redacted>")
            .field("user_address", &self.user_address)
            .field("rpc_url", &self.rpc_url)
            .finish()
    }
}

impl EvmEnv {
    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl EnvVars for EvmEnv {
    type Error = EvmError;

    fn load() -> Result<Self, EvmError> {
        let private_key = optional_env_var(PRIVATE_KEY).ok_or_else(|| {
            EvmError::MissingCredential(format!("{} is not set", PRIVATE_KEY))
        })?;

        let user_address = optional_env_var(USER_ADDRESS)
            .map(|raw| {
                Address::from_str(&raw).map_err(|e| {
                    EvmError::InvalidConfig(format!("{} is not an address: {}", USER_ADDRESS, e))
                })
            })
            .transpose()?;

        Ok(Self {
            private_key,
            user_address,
            rpc_url: optional_env_var(RPC_URL),
        })
    }

    fn get_env_var(&self, key: &str) -> Option<String> {
        match key {
            PRIVATE_KEY => Some(self.private_key.clone()),
            USER_ADDRESS => self.user_address.map(|a| a.to_checksum(None)),
            RPC_URL => self.rpc_url.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Process environment is shared across test threads; keep every mutation in one test.
    #[test]
    fn load_requires_private_key_and_validates_user_address() {
        std::env::remove_var(PRIVATE_KEY);
        std::env::remove_var(USER_ADDRESS);
        let err = EvmEnv::load().unwrap_err();
        assert!(matches!(err, EvmError::MissingCredential(_)));

        std::env::set_var(PRIVATE_KEY, "0x01");
        std::env::set_var(USER_ADDRESS, "not-an-address");
        assert!(matches!(EvmEnv::load(), Err(EvmError::InvalidConfig(_))));

        std::env::set_var(USER_ADDRESS, "0x22209F34ad54D6D9572B4984e97f4B31Fa558F45");
        let env = EvmEnv::load().unwrap();
        assert_eq!(env.private_key(), "0x01");
        assert!(env.user_address.is_some());
        assert!(!format!("{:?}", env).contains("0x01"));
        assert_eq!(env.get_env_var("UNKNOWN"), None);

        std::env::remove_var(PRIVATE_KEY);
        std::env::remove_var(USER_ADDRESS);
    }
}
