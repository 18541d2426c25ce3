//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the CLI.
//! All types derive Serde traits for (de)serialization from the TOML file.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::blockchain::erc20;
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::blockchain::wallet::{Wallet, PRIVATE_KEY_ENV_VAR};

/// Root configuration for the CLI.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// RPC endpoint and transaction policy.
    pub blockchain: BlockchainConfig,

    /// Account credential.
    pub wallet: WalletConfig,

    /// The ERC-20 stablecoin used for payments.
    pub token: TokenConfig,

    /// Testnet faucet.
    pub faucet: FaucetConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

impl CliConfig {
    /// Load the signing key.
    ///
    /// `BUDDYEVENTS_PRIVATE_KEY` wins over the file. A key from the file must
    /// agree with the address stored beside it.
    pub fn credential(&self) -> BlockchainResult<Wallet> {
        if std::env::var_os(PRIVATE_KEY_ENV_VAR).is_some() {
            tracing::debug!("Using private key from {}", PRIVATE_KEY_ENV_VAR);
            return Wallet::from_env();
        }

        if self.wallet.private_key.trim().is_empty() {
            return Err(BlockchainError::Wallet(
                "no wallet configured. Run: buddyevents wallet setup".to_string(),
            ));
        }

        Wallet::from_credential(&self.wallet.private_key, &self.wallet.address)
    }

    /// The account address, without needing the key when only the address is stored.
    pub fn wallet_address(&self) -> BlockchainResult<Address> {
        if std::env::var_os(PRIVATE_KEY_ENV_VAR).is_some() || self.wallet.address.trim().is_empty() {
            return self.credential().map(|wallet| wallet.address());
        }

        erc20::parse_address(self.wallet.address.trim())
            .map_err(|e| BlockchainError::Wallet(format!("stored wallet address: {e}")))
    }

    pub fn has_wallet(&self) -> bool {
        !self.wallet.private_key.trim().is_empty()
    }
}

/// Blockchain RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Per-request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Deadline for a whole send (all RPC steps together), in seconds.
    pub send_timeout_secs: u64,

    /// When set, refuse to sign for any other chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_chain_id: Option<u64>,

    /// Maximum gas price in gwei (protection against spikes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_gas_price_gwei: Option<u64>,

    /// Ticker of the chain's native asset.
    pub native_symbol: String,

    pub native_decimals: u8,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://testnet-rpc.monad.xyz".to_string(),
            rpc_timeout_secs: 30,
            send_timeout_secs: 60,
            expected_chain_id: None,
            max_gas_price_gwei: None,
            native_symbol: "MON".to_string(),
            native_decimals: 18,
        }
    }
}

/// Stored account credential.
#[derive(Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct WalletConfig {
    /// Checksummed address derived from `private_key`.
    pub address: String,

    /// Hex private key. Never printed or logged.
    pub private_key: String,
}

impl std::fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConfig")
            .field("address", &self.address)
            .field(
                "private_key",
                &if self.private_key.is_empty() { "" } else { "<redacted>" },
            )
            .finish()
    }
}

/// ERC-20 token configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TokenConfig {
    pub symbol: String,

    /// Contract address.
    pub address: String,

    pub decimals: u8,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            symbol: "USDC".to_string(),
            address: "0x534b2f3A21130d7a60830c2Df862319e593943A3".to_string(),
            decimals: 6,
        }
    }
}

/// Faucet configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FaucetConfig {
    pub url: String,

    /// Chain id sent in the faucet request body.
    pub chain_id: u64,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            url: "https://agents.devnads.com/v1/faucet".to_string(),
            chain_id: 10143,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_logs: false,
        }
    }
}
