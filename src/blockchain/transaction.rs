//! Transaction building, signing and submission.
//!
//! # Pipeline
//! ```text
//! TransferIntent
//!     → validate (address, amount, asset)       no network yet
//!     → eth_chainId                             ChainResolution
//!     → eth_getTransactionCount(addr, pending)  NonceResolution
//!     → eth_gasPrice                            GasPriceResolution
//!     → UnsignedTransaction (native | ERC-20)
//!     → sign (EIP-155, chain-bound)
//!     → eth_sendRawTransaction                  Submission
//! ```
//!
//! The first failure aborts the send. Nothing reaches the network until the
//! final call, so an aborted send leaves no state behind.
//!
//! The nonce is the *pending* transaction count: back-to-back sends from
//! one process queue correctly, but another process sending from the same
//! key at the same time can race for the nonce. The node then rejects the
//! loser and the error surfaces as `Submission(Remote)`.

use std::time::Duration;

use alloy::primitives::{Address, B256, U256};

use crate::blockchain::client::{BlockTag, BlockchainClient, RpcTransport};
use crate::blockchain::erc20;
use crate::blockchain::types::{
    Asset, BlockchainError, BlockchainResult, TransferIntent, UnsignedTransaction, ValidatedIntent,
};
use crate::blockchain::units;
use crate::blockchain::wallet::Wallet;
use crate::config::schema::CliConfig;

/// Gas limit for a plain native-asset transfer.
pub const NATIVE_TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Gas limit for an ERC-20 `transfer` call.
pub const TOKEN_TRANSFER_GAS_LIMIT: u64 = 100_000;

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Symbols the wallet can send, with their on-chain identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRegistry {
    entries: Vec<(String, Asset)>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register `symbol`. Lookups ignore case.
    pub fn with_asset(mut self, symbol: &str, asset: Asset) -> Self {
        self.entries.push((symbol.to_ascii_lowercase(), asset));
        self
    }

    /// Native asset plus the configured token. A token whose contract
    /// address does not parse is left out, so selecting it fails validation.
    pub fn from_config(config: &CliConfig) -> Self {
        let registry = Self::new().with_asset(
            &config.blockchain.native_symbol,
            Asset::Native {
                decimals: config.blockchain.native_decimals,
            },
        );

        match erc20::parse_address(&config.token.address) {
            Ok(contract) => registry.with_asset(
                &config.token.symbol,
                Asset::Token {
                    contract,
                    decimals: config.token.decimals,
                },
            ),
            Err(e) => {
                tracing::warn!(symbol = %config.token.symbol, error = %e, "Token contract not usable");
                registry
            }
        }
    }

    pub fn resolve(&self, symbol: &str) -> Option<Asset> {
        let symbol = symbol.trim().to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(known, _)| *known == symbol)
            .map(|(_, asset)| *asset)
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.entries.iter().map(|(symbol, _)| symbol.as_str()).collect()
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferIntent {
    /// Check the intent before any network call.
    pub fn validate(&self, assets: &AssetRegistry) -> BlockchainResult<ValidatedIntent> {
        let recipient = erc20::parse_address(&self.recipient)
            .map_err(|e| BlockchainError::InvalidIntent(format!("--to: {e}")))?;

        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(BlockchainError::InvalidIntent("amount must be > 0".to_string()));
        }

        let asset = assets.resolve(&self.token).ok_or_else(|| {
            BlockchainError::InvalidIntent(format!(
                "unsupported token {:?} (use {})",
                self.token,
                assets.symbols().join("|")
            ))
        })?;

        let units = units::to_fixed_point_units(self.amount, asset.decimals())?;

        Ok(ValidatedIntent {
            recipient,
            units,
            asset,
        })
    }
}

/// Fee and ordering fields gathered from the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainState {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: u128,
}

/// Build the unsigned record for a validated intent.
///
/// Native sends carry the amount as `value` with no call data. Token sends
/// go to the contract with `value = 0` and `transfer(recipient, units)`.
pub fn build_unsigned(intent: &ValidatedIntent, state: ChainState) -> UnsignedTransaction {
    match intent.asset {
        Asset::Native { .. } => UnsignedTransaction {
            chain_id: state.chain_id,
            nonce: state.nonce,
            to: intent.recipient,
            value: intent.units,
            gas_limit: NATIVE_TRANSFER_GAS_LIMIT,
            gas_price: state.gas_price,
            data: Default::default(),
        },
        Asset::Token { contract, .. } => UnsignedTransaction {
            chain_id: state.chain_id,
            nonce: state.nonce,
            to: contract,
            value: U256::ZERO,
            gas_limit: TOKEN_TRANSFER_GAS_LIMIT,
            gas_price: state.gas_price,
            data: erc20::transfer_calldata(&intent.recipient, intent.units),
        },
    }
}

/// Transaction builder for wallet transfers.
pub struct TxBuilder<'a, T> {
    client: &'a BlockchainClient<T>,
    wallet: &'a Wallet,
    assets: AssetRegistry,
    expected_chain_id: Option<u64>,
    max_gas_price_gwei: Option<u64>,
}

impl<'a, T: RpcTransport> TxBuilder<'a, T> {
    pub fn new(client: &'a BlockchainClient<T>, wallet: &'a Wallet, assets: AssetRegistry) -> Self {
        Self {
            client,
            wallet,
            assets,
            expected_chain_id: None,
            max_gas_price_gwei: None,
        }
    }

    /// Abort when the node reports a different chain.
    pub fn with_expected_chain_id(mut self, chain_id: Option<u64>) -> Self {
        self.expected_chain_id = chain_id;
        self
    }

    /// Abort when the node's gas price is above this ceiling.
    pub fn with_max_gas_price_gwei(mut self, max_gwei: Option<u64>) -> Self {
        self.max_gas_price_gwei = max_gwei;
        self
    }

    /// Validate the intent and gather everything needed to sign it.
    pub async fn prepare(&self, intent: &TransferIntent) -> BlockchainResult<UnsignedTransaction> {
        let intent = intent.validate(&self.assets)?;
        let state = self.resolve_chain_state().await?;
        let tx = build_unsigned(&intent, state);

        tracing::debug!(
            to = %tx.to,
            value = %tx.value,
            gas_limit = tx.gas_limit,
            data_len = tx.data.len(),
            "Built unsigned transaction"
        );

        Ok(tx)
    }

    async fn resolve_chain_state(&self) -> BlockchainResult<ChainState> {
        let chain_id = self
            .client
            .get_chain_id()
            .await
            .map_err(BlockchainError::ChainResolution)?
            .0;

        if let Some(expected) = self.expected_chain_id {
            if expected != chain_id {
                return Err(BlockchainError::ChainMismatch {
                    expected,
                    actual: chain_id,
                });
            }
        }

        let nonce = self
            .client
            .get_transaction_count(self.wallet.address(), BlockTag::Pending)
            .await
            .map_err(BlockchainError::NonceResolution)?;

        let gas_price = self
            .client
            .get_gas_price()
            .await
            .map_err(BlockchainError::GasPriceResolution)?;

        if let Some(max_gwei) = self.max_gas_price_gwei {
            let current_gwei = gas_price / WEI_PER_GWEI;
            if current_gwei > u128::from(max_gwei) {
                return Err(BlockchainError::GasPriceTooHigh {
                    current_gwei: u64::try_from(current_gwei).unwrap_or(u64::MAX),
                    max_gwei,
                });
            }
        }

        tracing::debug!(chain_id, nonce, gas_price, "Resolved chain state");

        Ok(ChainState {
            chain_id,
            nonce,
            gas_price,
        })
    }

    /// Validate, build, sign and broadcast. Returns the transaction hash.
    pub async fn send_transfer(&self, intent: &TransferIntent) -> BlockchainResult<B256> {
        let tx = self.prepare(intent).await?;
        let envelope = self.wallet.sign_transaction(&tx)?;

        let tx_hash = self
            .client
            .send_raw_transaction(envelope.raw)
            .await
            .map_err(BlockchainError::Submission)?;

        if tx_hash != envelope.hash {
            tracing::warn!(
                local = %envelope.hash,
                remote = %tx_hash,
                "Node returned a different transaction hash"
            );
        }

        tracing::info!(
            tx_hash = %tx_hash,
            nonce = tx.nonce,
            token = %intent.token,
            "Transaction submitted"
        );

        Ok(tx_hash)
    }

    /// Get the wallet address.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }
}

/// Send over HTTP to the endpoint in `config`.
///
/// The whole operation is abandoned after `send_timeout_secs`; nothing is
/// retried.
pub async fn send_transfer(
    intent: &TransferIntent,
    wallet: &Wallet,
    config: &CliConfig,
) -> BlockchainResult<B256> {
    let client = BlockchainClient::from_config(&config.blockchain).map_err(BlockchainError::Endpoint)?;
    let builder = TxBuilder::new(&client, wallet, AssetRegistry::from_config(config))
        .with_expected_chain_id(config.blockchain.expected_chain_id)
        .with_max_gas_price_gwei(config.blockchain.max_gas_price_gwei);

    let deadline = config.blockchain.send_timeout_secs;
    match tokio::time::timeout(Duration::from_secs(deadline), builder.send_transfer(intent)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(timeout_secs = deadline, "Send abandoned");
            Err(BlockchainError::Timeout(deadline))
        }
    }
}
