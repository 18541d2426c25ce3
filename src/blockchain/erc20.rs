//! ERC-20 call-data encoding.
//!
//! Only the two calls the wallet needs: `transfer(address,uint256)` for
//! token sends and `balanceOf(address)` for balance queries.

use alloy::hex;
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::types::EncodingError;

sol! {
    /// ERC-20 token transfer.
    function transfer(address to, uint256 amount) returns (bool);

    /// ERC-20 balance lookup.
    function balanceOf(address owner) returns (uint256);
}

/// Function selector for `transfer(address,uint256)`: `0xa9059cbb`.
pub const TRANSFER_SELECTOR: [u8; 4] = transferCall::SELECTOR;

/// Function selector for `balanceOf(address)`: `0x70a08231`.
pub const BALANCE_OF_SELECTOR: [u8; 4] = balanceOfCall::SELECTOR;

const WORD: usize = 32;

/// Parses a 20-byte hex address. The `0x` prefix is optional and case
/// is ignored (no EIP-55 checksum enforcement).
pub fn parse_address(address: &str) -> Result<Address, EncodingError> {
    let hex_str = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);

    if hex_str.len() != 40 {
        return Err(EncodingError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_str.len()
        )));
    }

    // The hex decoder strips its own `0x`, so a doubled prefix must be caught here.
    if let Some(bad) = hex_str.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(EncodingError::InvalidAddress(format!(
            "invalid hex character '{bad}' in '{address}'"
        )));
    }

    hex_str
        .parse::<Address>()
        .map_err(|e| EncodingError::InvalidAddress(format!("invalid hex in '{address}': {e}")))
}

/// Builds `transfer(address,uint256)` call data for an already-parsed recipient.
pub fn transfer_calldata(recipient: &Address, amount: U256) -> Bytes {
    transferCall {
        to: *recipient,
        amount,
    }
    .abi_encode()
    .into()
}

/// Encodes an ERC-20 `transfer(address,uint256)` call.
///
/// Output is always 68 bytes: selector, padded recipient, padded amount.
pub fn encode_transfer_call(recipient: &str, amount: U256) -> Result<Bytes, EncodingError> {
    let recipient = parse_address(recipient)?;
    Ok(transfer_calldata(&recipient, amount))
}

/// Encodes an ERC-20 `balanceOf(address)` call (36 bytes).
pub fn encode_balance_of(owner: &Address) -> Bytes {
    balanceOfCall { owner: *owner }.abi_encode().into()
}

/// Decodes the single uint256 returned by `balanceOf` from an `eth_call`
/// hex result. Bytes past the first word are ignored.
pub fn decode_uint256(result: &str) -> Result<U256, EncodingError> {
    let bytes = hex::decode(result)
        .map_err(|e| EncodingError::MalformedHex(format!("'{result}': {e}")))?;

    if bytes.len() < WORD {
        return Err(EncodingError::MalformedHex(format!(
            "expected at least {WORD} bytes for uint256, got {}",
            bytes.len()
        )));
    }

    balanceOfCall::abi_decode_returns(&bytes[..WORD])
        .map_err(|e| EncodingError::MalformedHex(format!("'{result}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPIENT: &str = "0x000000000000000000000000000000000000dEaD";

    #[test]
    fn transfer_call_layout() {
        let data = encode_transfer_call(RECIPIENT, U256::from(100u64)).unwrap();

        assert_eq!(data.len(), 4 + 32 + 32);
        assert_eq!(&data[..4], &TRANSFER_SELECTOR);
        // Address is left-padded to 32 bytes starting at offset 4.
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(data[34], 0xde);
        assert_eq!(data[35], 0xad);
        assert_eq!(&data[36..67], &[0u8; 31]);
        assert_eq!(data[67], 0x64);
    }

    #[test]
    fn transfer_call_matches_known_vector() {
        let data = encode_transfer_call(
            "0x534b2f3A21130d7a60830c2Df862319e593943A3",
            U256::from(2_500_000u64),
        )
        .unwrap();

        assert_eq!(
            hex::encode(&data),
            concat!(
                "a9059cbb",
                "000000000000000000000000534b2f3a21130d7a60830c2df862319e593943a3",
                "00000000000000000000000000000000000000000000000000000000002625a0",
            )
        );
    }

    #[test]
    fn transfer_call_is_deterministic() {
        let a = encode_transfer_call(RECIPIENT, U256::MAX).unwrap();
        let b = encode_transfer_call(RECIPIENT, U256::MAX).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[36..], &[0xffu8; 32]);
    }

    #[test]
    fn address_prefix_and_case_are_optional() {
        let lower = encode_transfer_call("000000000000000000000000000000000000dead", U256::from(1u64));
        let upper = encode_transfer_call("0X000000000000000000000000000000000000DEAD", U256::from(1u64));
        assert_eq!(lower.unwrap(), upper.unwrap());
    }

    #[test]
    fn wrong_length_recipient_fails() {
        let nineteen = format!("0x{}", "ab".repeat(19));
        let twenty_one = format!("0x{}", "ab".repeat(21));

        assert!(matches!(
            encode_transfer_call(&nineteen, U256::from(1u64)),
            Err(EncodingError::InvalidAddress(_))
        ));
        assert!(matches!(
            encode_transfer_call(&twenty_one, U256::from(1u64)),
            Err(EncodingError::InvalidAddress(_))
        ));
    }

    #[test]
    fn doubled_prefix_recipient_fails() {
        // 38 hex digits behind "0x0x" still add up to 40 characters after one strip.
        let doubled = format!("0x0x{}", "ab".repeat(19));

        assert!(matches!(parse_address(&doubled), Err(EncodingError::InvalidAddress(_))));
        assert!(matches!(
            encode_transfer_call(&doubled, U256::from(1u64)),
            Err(EncodingError::InvalidAddress(_))
        ));
    }

    #[test]
    fn selectors_match_signatures() {
        assert_eq!(hex::encode(TRANSFER_SELECTOR), "a9059cbb");
        assert_eq!(hex::encode(BALANCE_OF_SELECTOR), "70a08231");
    }

    #[test]
    fn non_hex_recipient_fails() {
        let result = encode_transfer_call(&format!("0x{}", "zz".repeat(20)), U256::from(1u64));
        assert!(matches!(result, Err(EncodingError::InvalidAddress(_))));
    }

    #[test]
    fn balance_of_layout() {
        let owner = parse_address(RECIPIENT).unwrap();
        let data = encode_balance_of(&owner);

        assert_eq!(data.len(), 36);
        assert_eq!(&data[..4], &BALANCE_OF_SELECTOR);
        assert_eq!(&data[16..], owner.as_slice());
    }

    #[test]
    fn decode_uint256_reads_first_word() {
        let result = format!("0x{:064x}{:064x}", 42, 99);
        assert_eq!(decode_uint256(&result).unwrap(), U256::from(42u64));
    }

    #[test]
    fn decode_uint256_rejects_short_or_bad_input() {
        assert!(decode_uint256("0x").is_err());
        assert!(decode_uint256("0x1234").is_err());
        assert!(decode_uint256("0xnothex").is_err());
    }
}
