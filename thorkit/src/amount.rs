//! Decimal amount parsing and formatting.
//!
//! Human input such as `"10.5"` is scaled to integer base units. Both the
//! native coin and the token use 18 decimals.
//!
//! Parsing is lenient while the user is typing: empty or non-numeric text is
//! read as zero instead of failing. Fractional digits beyond the precision
//! are truncated, never rounded.

use alloy::primitives::U256;
use alloy::primitives::utils as units;
use tracing::debug;

use crate::error::AmountError;

/// Decimal precision of the native coin and the default token.
pub const DECIMALS: u8 = 18;

/// Parse a decimal string into base units with [`DECIMALS`] precision.
///
/// # Errors
///
/// Returns [`AmountError::Negative`] for a numeric input with a leading `-`
/// and [`AmountError::Overflow`] when the scaled value exceeds 256 bits.
pub fn parse_amount(s: &str) -> Result<U256, AmountError> {
    parse_units(s, DECIMALS)
}

/// Parse a decimal string into base units with the given precision.
///
/// # Errors
///
/// See [`parse_amount`]. A precision above 77 decimals also reports
/// [`AmountError::Overflow`].
pub fn parse_units(s: &str, decimals: u8) -> Result<U256, AmountError> {
    let text = s.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let (int, frac) = body.split_once('.').unwrap_or((body, ""));
    let numeric = !(int.is_empty() && frac.is_empty())
        && int.bytes().all(|b| b.is_ascii_digit())
        && frac.bytes().all(|b| b.is_ascii_digit());

    if !numeric {
        if !text.is_empty() {
            debug!(input = %text, "non-numeric amount read as zero");
        }
        return Ok(U256::ZERO);
    }
    if negative {
        return Err(AmountError::Negative);
    }

    if frac.len() > usize::from(decimals) {
        debug!(
            input = %text,
            dropped = frac.len() - usize::from(decimals),
            "truncating excess fractional digits"
        );
    }

    // A leading zero keeps the integer part non-empty once every fractional
    // digit has been truncated away (".9" at zero decimals).
    units::parse_units(&format!("0{body}"), decimals)
        .map(<U256 as From<_>>::from)
        .map_err(|e| {
            debug!(input = %text, error = %e, "amount out of range");
            AmountError::Overflow
        })
}

/// Render base units with [`DECIMALS`] precision as a decimal string.
#[must_use]
pub fn format_amount(value: U256) -> String {
    format_units(value, DECIMALS)
}

/// Render base units as a decimal string with trailing zeros trimmed.
///
/// At least one fractional digit is always shown (`"0.0"`, `"10.0"`,
/// `"0.25"`). Precisions above 77 decimals are not representable and
/// fall back to the raw base-unit count.
#[must_use]
pub fn format_units(value: U256, decimals: u8) -> String {
    let formatted = match units::format_units(value, decimals) {
        Ok(formatted) => formatted,
        Err(e) => {
            debug!(decimals, error = %e, "unsupported precision, showing base units");
            return value.to_string();
        }
    };
    let (int, frac) = formatted.split_once('.').unwrap_or((formatted.as_str(), ""));
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{int}.0")
    } else {
        format!("{int}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
    }

    #[test]
    fn test_parse_whole_and_fractional() {
        assert_eq!(parse_amount("10").unwrap(), ether(10));
        assert_eq!(parse_amount("0.5").unwrap(), ether(1) / U256::from(2u8));
        assert_eq!(parse_amount(".5").unwrap(), ether(1) / U256::from(2u8));
        assert_eq!(parse_amount("1.").unwrap(), ether(1));
        assert_eq!(parse_amount("  3 ").unwrap(), ether(3));
        assert_eq!(parse_amount("0.000000000000000001").unwrap(), U256::from(1u8));
    }

    #[test]
    fn test_empty_and_non_numeric_read_as_zero() {
        for input in ["", "   ", "abc", "1e18", "1.2.3", ".", "-", "0x10", "+1"] {
            assert_eq!(parse_amount(input).unwrap(), U256::ZERO, "{input:?}");
        }
    }

    #[test]
    fn test_negative_rejected() {
        assert_eq!(parse_amount("-1"), Err(AmountError::Negative));
        assert_eq!(parse_amount("-0.5"), Err(AmountError::Negative));
    }

    #[test]
    fn test_excess_precision_truncated() {
        // 19th fractional digit is dropped, not rounded up.
        assert_eq!(parse_amount("0.0000000000000000019").unwrap(), U256::from(1u8));
        assert_eq!(parse_amount("1.9999999999999999999").unwrap(), ether(2) - U256::from(1u8));
    }

    #[test]
    fn test_overflow() {
        let huge = "1".repeat(80);
        assert_eq!(parse_amount(&huge), Err(AmountError::Overflow));
        assert!(parse_units(&"9".repeat(77), 0).is_ok());
    }

    #[test]
    fn test_custom_precision() {
        assert_eq!(parse_units("1.5", 6).unwrap(), U256::from(1_500_000u64));
        assert_eq!(parse_units("7", 0).unwrap(), U256::from(7u8));
        assert_eq!(parse_units("7.9", 0).unwrap(), U256::from(7u8));
        assert_eq!(parse_units(".9", 0).unwrap(), U256::ZERO);
        assert_eq!(parse_units("1", 78), Err(AmountError::Overflow));
    }

    #[test]
    fn test_agrees_with_alloy_units() {
        for input in ["10", "0.5", "1.25", "0.000000000000000001", "1.9999999999999999999"] {
            let expected: U256 = units::parse_units(input, DECIMALS).unwrap().into();
            assert_eq!(parse_amount(input).unwrap(), expected, "{input:?}");
        }
        assert_eq!(format_amount(units::parse_ether("1.5").unwrap()), "1.5");
    }

    #[test]
    fn test_format() {
        assert_eq!(format_amount(U256::ZERO), "0.0");
        assert_eq!(format_amount(ether(10)), "10.0");
        assert_eq!(format_amount(ether(1) / U256::from(4u8)), "0.25");
        assert_eq!(format_amount(U256::from(1u8)), "0.000000000000000001");
        assert_eq!(format_units(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_units(U256::from(42u8), 0), "42.0");
        assert_eq!(format_units(U256::from(42u8), 78), "42");
    }
}
