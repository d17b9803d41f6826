//! Money handling in integer minor units
//!
//! Chat input arrives as decimal text ("150", "42.5", "19.99") and reports
//! are rendered back as two-decimal strings. Everything in between is i64
//! cents so that settlement never compares floating point values.
//!
//! CRITICAL: All money values are i64 (cents)

use thiserror::Error;

/// Number of minor units in one major unit
pub const CENTS_PER_UNIT: i64 = 100;

/// Largest single amount accepted anywhere (10 billion units, in cents)
///
/// Per-player buy-ins and cash-outs are capped here so that room totals of
/// up to ~9 million players still fit in i64 without overflow.
pub const MAX_AMOUNT: i64 = 10_000_000_000 * CENTS_PER_UNIT;

/// Errors that can occur while parsing an amount
#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("Amount must be a non-negative number, got '{0}'")]
    Negative(String),

    #[error("Amount '{0}' is not a valid number")]
    Malformed(String),

    #[error("Amount '{0}' has more than two decimal places")]
    TooPrecise(String),

    #[error("Amount '{0}' is too large")]
    Overflow(String),
}

/// Parse a decimal amount into cents
///
/// Accepts an optional leading `+`, an integer part and up to two fraction
/// digits. Negative values and values above [`MAX_AMOUNT`] are rejected;
/// callers decide separately whether zero is acceptable (cash-outs allow it,
/// buy-ins do not).
///
/// # Example
/// ```
/// use stac_ledger_core::core::money::parse_amount;
///
/// assert_eq!(parse_amount("150").unwrap(), 15_000);
/// assert_eq!(parse_amount("42.5").unwrap(), 4_250);
/// assert_eq!(parse_amount("0.07").unwrap(), 7);
/// assert!(parse_amount("-10").is_err());
/// ```
pub fn parse_amount(raw: &str) -> Result<i64, AmountError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(AmountError::Empty);
    }
    if text.starts_with('-') {
        return Err(AmountError::Negative(text.to_string()));
    }
    let unsigned = text.strip_prefix('+').unwrap_or(text);

    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (unsigned, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(AmountError::Malformed(text.to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(AmountError::Malformed(text.to_string()));
    }
    if unsigned.contains('.') && fraction.is_empty() {
        return Err(AmountError::Malformed(text.to_string()));
    }
    if fraction.len() > 2 {
        return Err(AmountError::TooPrecise(text.to_string()));
    }

    let overflow = || AmountError::Overflow(text.to_string());

    let units: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| overflow())? * 10,
        _ => fraction.parse().map_err(|_| overflow())?,
    };

    units
        .checked_mul(CENTS_PER_UNIT)
        .and_then(|value| value.checked_add(cents))
        .filter(|value| *value <= MAX_AMOUNT)
        .ok_or_else(overflow)
}

/// Format cents as a two-decimal string with thousands separators
///
/// # Example
/// ```
/// use stac_ledger_core::core::money::format_cents;
///
/// assert_eq!(format_cents(123_450), "1,234.50");
/// assert_eq!(format_cents(-5_000), "-50.00");
/// assert_eq!(format_cents(7), "0.07");
/// ```
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let magnitude = cents.unsigned_abs();
    let units = magnitude / CENTS_PER_UNIT as u64;
    let fraction = magnitude % CENTS_PER_UNIT as u64;
    format!("{}{}.{:02}", sign, group_thousands(units), fraction)
}

/// Format a profit/loss figure with an explicit sign
///
/// Zero renders as `+0.00`, matching how break-even players are shown.
pub fn format_signed(cents: i64) -> String {
    if cents < 0 {
        format_cents(cents)
    } else {
        format!("+{}", format_cents(cents))
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Strip a leading `@` from a chat username
pub fn parse_username(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed)
}
