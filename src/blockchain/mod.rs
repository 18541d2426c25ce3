//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Config file / BUDDYEVENTS_PRIVATE_KEY
//!     → wallet.rs (key loading, signing)
//!     → client.rs (JSON-RPC over HTTP with timeouts)
//!     → transaction.rs (validate, build, sign, broadcast)
//!          ├─ units.rs (decimal amount → base units)
//!          └─ erc20.rs (transfer call data)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Nothing is broadcast until every earlier step has succeeded

pub mod client;
pub mod erc20;
pub mod faucet;
pub mod transaction;
pub mod types;
pub mod units;
pub mod wallet;

pub use client::{BlockchainClient, HttpTransport, RpcTransport};
pub use transaction::{AssetRegistry, TxBuilder};
pub use types::{BlockchainConfig, BlockchainError, ChainId, TransferIntent};
pub use wallet::Wallet;
