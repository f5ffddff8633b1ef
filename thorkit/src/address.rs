//! Syntactic address validation.
//!
//! Addresses are `0x`-prefixed, 40 hexadecimal digits, case-insensitive.
//! Checksums are not enforced.

use alloy::primitives::Address;

/// Number of hex digits in an address body.
const ADDRESS_HEX_LEN: usize = 40;

/// Check whether `s` is a well-formed chain address.
///
/// Never panics; any input that is not `0x` followed by exactly forty hex
/// digits returns `false`.
#[must_use]
pub fn is_valid_address(s: &str) -> bool {
    strip_hex_prefix(s).is_some_and(|body| {
        body.len() == ADDRESS_HEX_LEN && body.bytes().all(|b| b.is_ascii_hexdigit())
    })
}

/// Parse a well-formed address into its typed form.
#[must_use]
pub fn parse_address(s: &str) -> Option<Address> {
    if !is_valid_address(s) {
        return None;
    }
    // `0X` is not understood by the hex decoder, so hand it the bare digits.
    strip_hex_prefix(s)?.parse::<Address>().ok()
}

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}
