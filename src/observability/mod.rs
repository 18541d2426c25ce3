//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! blockchain/, config/ emit tracing events
//!     → logging.rs (EnvFilter + fmt or JSON layer)
//!     → stderr
//! ```
//!
//! # Design Decisions
//! - Structured fields (tx_hash, nonce, chain_id) rather than formatted text
//! - Quiet by default (`warn`); `-v` or `RUST_LOG` turn it up

pub mod logging;

pub use logging::init_logging;
