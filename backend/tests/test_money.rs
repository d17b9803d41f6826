//! Tests for amount parsing and formatting
//!
//! CRITICAL: All money values are i64 (cents)

use stac_ledger_core::core::money::parse_username;
use stac_ledger_core::{format_cents, format_signed, parse_amount, AmountError, MAX_AMOUNT};

#[test]
fn test_parse_whole_and_fractional_amounts() {
    assert_eq!(parse_amount("0"), Ok(0));
    assert_eq!(parse_amount("150"), Ok(15_000));
    assert_eq!(parse_amount("150.5"), Ok(15_050));
    assert_eq!(parse_amount("150.05"), Ok(15_005));
    assert_eq!(parse_amount(".5"), Ok(50));
    assert_eq!(parse_amount("+20"), Ok(2_000));
    assert_eq!(parse_amount("  42  "), Ok(4_200));
}

#[test]
fn test_parse_rejects_bad_input() {
    assert_eq!(parse_amount(""), Err(AmountError::Empty));
    assert_eq!(parse_amount("   "), Err(AmountError::Empty));
    assert_eq!(parse_amount("-5"), Err(AmountError::Negative("-5".to_string())));
    assert_eq!(parse_amount("abc"), Err(AmountError::Malformed("abc".to_string())));
    assert_eq!(parse_amount("1,000"), Err(AmountError::Malformed("1,000".to_string())));
    assert_eq!(parse_amount("5."), Err(AmountError::Malformed("5.".to_string())));
    assert_eq!(parse_amount("."), Err(AmountError::Malformed(".".to_string())));
    assert_eq!(parse_amount("1.2.3"), Err(AmountError::Malformed("1.2.3".to_string())));
    assert_eq!(parse_amount("1e3"), Err(AmountError::Malformed("1e3".to_string())));
    assert_eq!(parse_amount("0.001"), Err(AmountError::TooPrecise("0.001".to_string())));
}

#[test]
fn test_parse_overflow() {
    assert_eq!(
        parse_amount("92233720368547759"),
        Err(AmountError::Overflow("92233720368547759".to_string()))
    );
    assert!(parse_amount("99999999999999999999999").is_err());
}

#[test]
fn test_parse_caps_amounts_at_limit() {
    assert_eq!(parse_amount("10000000000"), Ok(MAX_AMOUNT));
    assert_eq!(
        parse_amount("10000000000.01"),
        Err(AmountError::Overflow("10000000000.01".to_string()))
    );
    // Fits in i64 cents but would let two cash-outs overflow a room total
    assert_eq!(
        parse_amount("92233720368547758"),
        Err(AmountError::Overflow("92233720368547758".to_string()))
    );
}

#[test]
fn test_format_cents() {
    assert_eq!(format_cents(0), "0.00");
    assert_eq!(format_cents(5), "0.05");
    assert_eq!(format_cents(15_000), "150.00");
    assert_eq!(format_cents(123_456_789), "1,234,567.89");
    assert_eq!(format_cents(-2_050), "-20.50");
}

#[test]
fn test_format_signed() {
    assert_eq!(format_signed(5_000), "+50.00");
    assert_eq!(format_signed(0), "+0.00");
    assert_eq!(format_signed(-5_000), "-50.00");
}

#[test]
fn test_format_then_parse_plain_values() {
    for cents in [0, 1, 99, 100, 12_345] {
        assert_eq!(parse_amount(&format_cents(cents)), Ok(cents));
    }
}

#[test]
fn test_parse_username() {
    assert_eq!(parse_username("@alice"), "alice");
    assert_eq!(parse_username("bob"), "bob");
    assert_eq!(parse_username(" @carol "), "carol");
}
