//! Utility functions for the migration core
//!
//! Address handling and decimal scaling shared by the session, indexer and transfer code.

use crate::shared::constants::{ADDRESS_LENGTH, MSG_INVALID_AMOUNT, TOKEN_ID_SIZE};
use crate::shared::error::MigrationError;
use ethers::types::{Address as EthAddress, H256, U256};

/// Validate Ethereum address format
pub fn validate_ethereum_address(address: &str) -> Result<(), MigrationError> {
    if !address.starts_with("0x") {
        return Err(MigrationError::validation("Address must start with 0x"));
    }

    if address.len() != ADDRESS_LENGTH {
        return Err(MigrationError::validation("Address must be 42 characters long"));
    }

    // Check if all characters after 0x are valid hex
    if !address[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(MigrationError::validation("Address contains invalid hex characters"));
    }

    Ok(())
}

/// Lower-case an address for keys and indexer queries
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Case-insensitive address comparison
pub fn addresses_equal(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

pub fn parse_address(address: &str) -> Result<EthAddress, MigrationError> {
    validate_ethereum_address(address)?;
    address
        .parse::<EthAddress>()
        .map_err(|e| MigrationError::validation(format!("Invalid address {}: {}", address, e)))
}

/// Parse a 0x-prefixed 32-byte token id
pub fn parse_token_id(token_id: &str) -> Result<H256, MigrationError> {
    let bytes = hex_to_bytes(token_id)?;
    if bytes.len() != TOKEN_ID_SIZE {
        return Err(MigrationError::validation(format!(
            "Token id must be {} bytes, got {}",
            TOKEN_ID_SIZE,
            bytes.len()
        )));
    }
    Ok(H256::from_slice(&bytes))
}

/// Parse a hex quantity such as an `eth_chainId` result
pub fn parse_hex_quantity(quantity: &str) -> Result<u64, MigrationError> {
    let digits = quantity.trim().trim_start_matches("0x");
    u64::from_str_radix(digits, 16)
        .map_err(|_| MigrationError::validation(format!("Invalid hex quantity: {}", quantity)))
}

/// Convert hex string to bytes
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, MigrationError> {
    let hex = hex.trim_start_matches("0x");
    hex::decode(hex).map_err(|e| MigrationError::validation(format!("Invalid hex string: {}", e)))
}

/// Convert bytes to hex string
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Scale a raw integer amount down by `decimals`, dropping trailing fractional zeros
pub fn format_amount(raw: U256, decimals: u8) -> String {
    let digits = raw.to_string();
    if decimals == 0 {
        return digits;
    }

    let decimals = decimals as usize;
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };

    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Parse a human amount into its raw integer form scaled by `decimals`.
///
/// Fractional digits beyond `decimals` are rejected unless they are all zero.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, MigrationError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(MigrationError::validation(MSG_INVALID_AMOUNT));
    }

    let parts: Vec<&str> = amount.split('.').collect();
    let (whole, fraction) = match parts.as_slice() {
        [whole] => (*whole, ""),
        [whole, fraction] => (*whole, *fraction),
        _ => return Err(MigrationError::validation(MSG_INVALID_AMOUNT)),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(MigrationError::validation(MSG_INVALID_AMOUNT));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(MigrationError::validation(MSG_INVALID_AMOUNT));
    }

    let decimals = decimals as usize;
    let mut digits = if whole.is_empty() { "0".to_string() } else { whole.to_string() };
    if fraction.len() > decimals {
        let (kept, excess) = fraction.split_at(decimals);
        if excess.chars().any(|c| c != '0') {
            return Err(MigrationError::validation(MSG_INVALID_AMOUNT));
        }
        digits.push_str(kept);
    } else {
        digits.push_str(fraction);
        digits.push_str(&"0".repeat(decimals - fraction.len()));
    }

    U256::from_dec_str(&digits).map_err(|_| MigrationError::validation(MSG_INVALID_AMOUNT))
}
