//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! ~/.buddyevents/config.toml (or --config)
//!     → loader.rs (parse & deserialize; missing file → defaults)
//!     → validation.rs (semantic checks)
//!     → CliConfig (validated, passed explicitly to each command)
//!
//! wallet setup:
//!     CliConfig + new credential
//!     → validation.rs
//!     → loader.rs writes the file (0600)
//! ```
//!
//! # Design Decisions
//! - No global config: each command receives the value it needs
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, save_config, ConfigError};
pub use schema::{BlockchainConfig, CliConfig, FaucetConfig, ObservabilityConfig, TokenConfig, WalletConfig};
pub use validation::{validate_config, ValidationError};
