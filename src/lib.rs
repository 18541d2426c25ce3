//! BuddyEvents wallet client library.
//!
//! Turns "send N of token T to address A" into a signed, nonce-ordered
//! transaction broadcast over JSON-RPC, paying in the native asset or an
//! ERC-20 stablecoin.

pub mod blockchain;
pub mod config;
pub mod observability;

pub use blockchain::transaction::send_transfer;
pub use blockchain::{BlockchainError, TransferIntent, Wallet};
pub use config::CliConfig;
