//! Wallet management and transaction signing.
//!
//! # Security
//! - The private key comes from the config file or `BUDDYEVENTS_PRIVATE_KEY`
//! - Keys are never logged; `Debug` only shows the address
//! - The stored address must always be the derivation of the stored key

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::hex;
use alloy::primitives::{Address, TxKind};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::blockchain::erc20;
use crate::blockchain::types::{BlockchainError, BlockchainResult, SignedEnvelope, UnsignedTransaction};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "BUDDYEVENTS_PRIVATE_KEY";

/// Account credential: a secp256k1 signing key and its derived address.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::debug!(address = %signer.address(), "Wallet loaded");

        Ok(Self { signer })
    }

    /// Load a key and check it against the address stored next to it.
    ///
    /// An empty `stored_address` is accepted and filled by derivation.
    pub fn from_credential(private_key_hex: &str, stored_address: &str) -> BlockchainResult<Self> {
        let wallet = Self::from_private_key(private_key_hex)?;

        if !stored_address.trim().is_empty() {
            let stored = erc20::parse_address(stored_address.trim())
                .map_err(|e| BlockchainError::Wallet(format!("stored wallet address: {e}")))?;
            if stored != wallet.address() {
                return Err(BlockchainError::Wallet(format!(
                    "stored address {} does not match private key (derives {})",
                    stored,
                    wallet.address()
                )));
            }
        }

        Ok(wallet)
    }

    /// Load wallet from environment variable.
    ///
    /// Reads `BUDDYEVENTS_PRIVATE_KEY` from environment.
    pub fn from_env() -> BlockchainResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            BlockchainError::Wallet(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key)
    }

    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let signer = PrivateKeySigner::random();
        tracing::info!(address = %signer.address(), "Generated new wallet");
        Self { signer }
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// `0x`-prefixed private key, for persisting to the config file only.
    pub fn private_key_hex(&self) -> String {
        hex::encode_prefixed(self.signer.to_bytes())
    }

    /// Sign a legacy transaction with EIP-155 replay protection and
    /// encode it for `eth_sendRawTransaction`.
    pub fn sign_transaction(&self, tx: &UnsignedTransaction) -> BlockchainResult<SignedEnvelope> {
        let legacy = TxLegacy {
            chain_id: Some(tx.chain_id),
            nonce: tx.nonce,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            to: TxKind::Call(tx.to),
            value: tx.value,
            input: tx.data.clone(),
        };

        let signature = self
            .signer
            .sign_hash_sync(&legacy.signature_hash())
            .map_err(|e| BlockchainError::Signing(e.to_string()))?;

        let signed = legacy.into_signed(signature);
        let hash = *signed.hash();
        let raw = TxEnvelope::from(signed).encoded_2718();

        Ok(SignedEnvelope {
            raw: raw.into(),
            hash,
        })
    }
}
