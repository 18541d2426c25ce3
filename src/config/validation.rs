//! Configuration validation.
//!
//! Serde handles syntax; this module checks meaning: URLs parse, timeouts
//! are non-zero, addresses are well formed, and a stored key agrees with
//! its stored address. Every violation is reported, not just the first.

use crate::blockchain::erc20;
use crate::blockchain::units::MAX_DECIMALS;
use crate::blockchain::wallet::Wallet;
use crate::config::schema::CliConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending key, e.g. `token.address`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_http_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL '{value}': {e}"))),
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &CliConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_http_url("blockchain.rpc_url", &config.blockchain.rpc_url, &mut errors);
    check_http_url("faucet.url", &config.faucet.url, &mut errors);

    if config.blockchain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be > 0"));
    }
    if config.blockchain.send_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.send_timeout_secs", "must be > 0"));
    }
    if config.blockchain.native_decimals > MAX_DECIMALS {
        errors.push(ValidationError::new(
            "blockchain.native_decimals",
            format!("must be <= {MAX_DECIMALS}"),
        ));
    }
    if config.blockchain.native_symbol.trim().is_empty() {
        errors.push(ValidationError::new("blockchain.native_symbol", "must not be empty"));
    }

    if let Err(e) = erc20::parse_address(&config.token.address) {
        errors.push(ValidationError::new("token.address", e.to_string()));
    }
    if config.token.decimals > MAX_DECIMALS {
        errors.push(ValidationError::new("token.decimals", format!("must be <= {MAX_DECIMALS}")));
    }
    if config.token.symbol.trim().is_empty() {
        errors.push(ValidationError::new("token.symbol", "must not be empty"));
    } else if config.token.symbol.eq_ignore_ascii_case(&config.blockchain.native_symbol) {
        errors.push(ValidationError::new(
            "token.symbol",
            "must differ from blockchain.native_symbol",
        ));
    }

    let stored_address = config.wallet.address.trim();
    if !stored_address.is_empty() {
        if let Err(e) = erc20::parse_address(stored_address) {
            errors.push(ValidationError::new("wallet.address", e.to_string()));
        }
    }
    if config.has_wallet() {
        match Wallet::from_credential(&config.wallet.private_key, stored_address) {
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::new("wallet.private_key", e.to_string())),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&CliConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_problem() {
        let mut config = CliConfig::default();
        config.blockchain.rpc_url = "ftp://node".into();
        config.blockchain.rpc_timeout_secs = 0;
        config.token.address = "0x1234".into();
        config.token.decimals = 80;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "blockchain.rpc_url",
                "blockchain.rpc_timeout_secs",
                "token.address",
                "token.decimals"
            ]
        );
    }

    #[test]
    fn test_key_and_address_must_agree() {
        let mut config = CliConfig::default();
        config.wallet.private_key =
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".into();
        config.wallet.address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".into();
        assert!(validate_config(&config).is_ok());

        config.wallet.address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "wallet.private_key");
    }

    #[test]
    fn test_garbage_key_is_rejected() {
        let mut config = CliConfig::default();
        config.wallet.private_key = "not-a-key".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "wallet.private_key");
    }

    #[test]
    fn test_doubled_hex_prefix_is_rejected() {
        let mut config = CliConfig::default();
        config.token.address = format!("0x0x{}", "ab".repeat(19));
        config.wallet.address = format!("0x0x{}", "cd".repeat(19));

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["token.address", "wallet.address"]);
    }

    #[test]
    fn test_symbols_must_be_distinct() {
        let mut config = CliConfig::default();
        config.token.symbol = "mon".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "token.symbol");
    }

    #[test]
    fn test_display() {
        let err = ValidationError::new("faucet.url", "invalid URL");
        assert_eq!(err.to_string(), "faucet.url: invalid URL");
    }
}
