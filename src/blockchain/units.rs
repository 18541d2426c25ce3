//! Conversions between human-readable decimal amounts and integer base units.
//!
//! Amounts typed by a user arrive as `f64`. They are rendered to their
//! shortest round-trip decimal form and then parsed digit by digit into a
//! `U256`, so `1.5` MON becomes exactly `1_500_000_000_000_000_000` wei.
//! Digits beyond the token's precision are truncated, never rounded.

use alloy::primitives::U256;

use crate::blockchain::types::EncodingError;

/// Largest power of ten that fits in a uint256.
pub const MAX_DECIMALS: u8 = 77;

fn pow10(exp: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exp.min(MAX_DECIMALS)))
}

/// Parses a decimal string such as `"2.5"` into base units at `decimals`
/// precision, truncating any excess fractional digits.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, EncodingError> {
    if decimals > MAX_DECIMALS {
        return Err(EncodingError::InvalidAmount(format!(
            "{decimals} decimals exceeds uint256 range"
        )));
    }

    let amount = amount.trim();
    if amount.starts_with('-') {
        return Err(EncodingError::InvalidAmount("amount must be > 0".into()));
    }

    let (int_part, frac_part) = match amount.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (amount, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(EncodingError::InvalidAmount(format!(
            "'{amount}' is not a decimal number"
        )));
    }

    let precision = usize::from(decimals);
    let kept_frac = &frac_part[..frac_part.len().min(precision)];

    let mut digits = String::with_capacity(int_part.len() + precision);
    digits.push_str(int_part);
    digits.push_str(kept_frac);
    digits.extend(std::iter::repeat('0').take(precision - kept_frac.len()));

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        let had_value = int_part.bytes().chain(frac_part.bytes()).any(|b| b != b'0');
        return Err(EncodingError::InvalidAmount(if had_value {
            format!("amount too small for {decimals} decimals")
        } else {
            "amount must be > 0".into()
        }));
    }

    U256::from_str_radix(significant, 10)
        .map_err(|_| EncodingError::InvalidAmount(format!("'{amount}' exceeds uint256 range")))
}

/// Converts a positive, finite amount into integer units: `floor(amount * 10^decimals)`.
pub fn to_fixed_point_units(amount: f64, decimals: u8) -> Result<U256, EncodingError> {
    if !amount.is_finite() {
        return Err(EncodingError::InvalidAmount("amount must be finite".into()));
    }
    if amount <= 0.0 {
        return Err(EncodingError::InvalidAmount("amount must be > 0".into()));
    }

    // f64 Display never uses exponent notation and is the shortest string
    // that parses back to the same float.
    parse_units(&amount.to_string(), decimals)
}

/// Parses an RPC hex quantity, with or without the `0x` prefix.
pub fn hex_to_integer(hex: &str) -> Result<U256, EncodingError> {
    let digits = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex);

    if digits.is_empty() {
        return Err(EncodingError::MalformedHex("empty hex string".into()));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(EncodingError::MalformedHex(format!("'{hex}' contains non-hex characters")));
    }

    U256::from_str_radix(digits, 16)
        .map_err(|_| EncodingError::MalformedHex(format!("'{hex}' exceeds uint256 range")))
}

/// Like [`hex_to_integer`] but for quantities that must fit a `u64`
/// (chain ids, nonces).
pub fn hex_to_u64(hex: &str) -> Result<u64, EncodingError> {
    let value = hex_to_integer(hex)?;
    u64::try_from(value).map_err(|_| EncodingError::MalformedHex(format!("'{hex}' exceeds u64")))
}

/// Like [`hex_to_integer`] but for quantities that must fit a `u128` (gas prices).
pub fn hex_to_u128(hex: &str) -> Result<u128, EncodingError> {
    let value = hex_to_integer(hex)?;
    u128::try_from(value).map_err(|_| EncodingError::MalformedHex(format!("'{hex}' exceeds u128")))
}

/// Renders base units as a decimal string with exactly `precision`
/// fractional digits, rounding half up.
///
/// `decimals` and `precision` above [`MAX_DECIMALS`] are clamped.
pub fn format_units(value: U256, decimals: u8, precision: u8) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    let precision = precision.min(MAX_DECIMALS);

    let (int_part, frac_part) = if precision <= decimals {
        let divisor = pow10(decimals - precision);
        let mut scaled = value / divisor;
        let remainder = value % divisor;
        if remainder != U256::ZERO && remainder >= divisor - remainder {
            scaled += U256::from(1u64);
        }
        let unit = pow10(precision);
        (scaled / unit, scaled % unit)
    } else {
        let unit = pow10(decimals);
        (value / unit, (value % unit) * pow10(precision - decimals))
    };

    if precision == 0 {
        int_part.to_string()
    } else {
        format!(
            "{}.{:0>width$}",
            int_part,
            frac_part.to_string(),
            width = usize::from(precision)
        )
    }
}
