//! Chain-specific types and error definitions.

use alloy::primitives::{Address, Bytes, B256, U256};
use thiserror::Error;

pub use crate::config::schema::BlockchainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Failures of the numeric and call-data encoding layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// Recipient or contract is not a 20-byte hex address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Amount is non-finite, non-positive, or truncates to zero units.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A hex quantity contained non-hex characters or overflowed.
    #[error("malformed hex: {0}")]
    MalformedHex(String),
}

/// Failures of a single JSON-RPC call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// Connection, timeout, or HTTP-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with an `error` object.
    #[error("RPC error: {message}")]
    Remote { code: Option<i64>, message: String },

    /// The body was not JSON, or carried neither `result` nor `error`.
    #[error("malformed RPC response: {0}")]
    MalformedResponse(String),
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Bad user input, caught before any network call.
    #[error("invalid transfer: {0}")]
    InvalidIntent(String),

    /// The RPC endpoint could not be set up.
    #[error("RPC endpoint: {0}")]
    Endpoint(#[source] RpcError),

    #[error("failed to fetch chain id: {0}")]
    ChainResolution(#[source] RpcError),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    #[error("failed to fetch nonce: {0}")]
    NonceResolution(#[source] RpcError),

    #[error("failed to fetch gas price: {0}")]
    GasPriceResolution(#[source] RpcError),

    /// Gas price exceeded maximum allowed.
    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    #[error("failed to send transaction: {0}")]
    Submission(#[source] RpcError),

    #[error("failed to query balance: {0}")]
    BalanceQuery(#[source] RpcError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("failed to sign transaction: {0}")]
    Signing(String),

    /// The whole operation exceeded its deadline.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    #[error("faucet error: {0}")]
    Faucet(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// What is being sent: the chain's native asset or an ERC-20 token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    Native { decimals: u8 },
    Token { contract: Address, decimals: u8 },
}

impl Asset {
    pub fn decimals(&self) -> u8 {
        match self {
            Asset::Native { decimals } | Asset::Token { decimals, .. } => *decimals,
        }
    }
}

/// A user's request to move funds, as received from the command layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferIntent {
    /// Recipient address, `0x` prefix optional.
    pub recipient: String,
    /// Amount in whole token units (e.g. `1.5` MON).
    pub amount: f64,
    /// Asset symbol, matched case-insensitively (`mon`, `usdc`).
    pub token: String,
}

/// An intent that passed validation. Immutable from here on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedIntent {
    pub recipient: Address,
    /// Amount already scaled to the asset's base units.
    pub units: U256,
    pub asset: Asset,
}

/// Legacy (EIP-155) transaction fields before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub to: Address,
    /// Zero for token transfers.
    pub value: U256,
    pub gas_limit: u64,
    pub gas_price: u128,
    /// Empty for native transfers.
    pub data: Bytes,
}

/// Wire-encoded signed transaction and its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub raw: Bytes,
    pub hash: B256,
}
