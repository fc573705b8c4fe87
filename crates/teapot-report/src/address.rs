//! Address text encoding.
//!
//! Reports render instruction addresses as `0x`-prefixed lowercase hex.
//! Older reports keyed their maps with decimal integers, so keys accept both.

use crate::result::{ReportError, ReportResult};

/// An instruction or data address
pub type Address = u64;

/// Render an address as `0x`-prefixed lowercase hex
#[must_use]
pub fn format_hex(address: Address) -> String {
    format!("{address:#x}")
}

/// Parse hex text, with or without a `0x` prefix, ignoring surrounding whitespace
pub fn parse_hex(text: &str) -> ReportResult<Address> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(ReportError::invalid_address(text));
    }
    Address::from_str_radix(digits, 16).map_err(|_| ReportError::invalid_address(text))
}

/// Parse a report map key: `0x`-prefixed hex, otherwise decimal
pub fn parse_key(text: &str) -> ReportResult<Address> {
    let trimmed = text.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        parse_hex(trimmed)
    } else {
        trimmed
            .parse()
            .map_err(|_| ReportError::invalid_address(text))
    }
}
