use std::str::FromStr;

use rust_decimal::Decimal;

use crate::types::errors::AmountError;

const DECIMAL_PLACES: usize = 2;

/// Parses a user supplied amount such as `150`, `+150.00` or `-23.5`.
///
/// At most two fractional digits are accepted; the result is rescaled to exactly two.
pub fn parse_amount(value: &str) -> Result<Decimal, AmountError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(AmountError::InvalidFormat("Value is an empty string".to_string()));
    }

    let mut parts = value.split('.');
    let integer = parts.next().unwrap_or_default();
    let fraction = parts.next();

    if parts.next().is_some() {
        return Err(AmountError::InvalidFormat("Value has more than one decimal point".to_string()));
    }

    let digits = integer.trim_start_matches(['+', '-']);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(AmountError::InvalidFormat(format!("Value has an invalid integer part: [{integer}]")));
    }

    if let Some(fraction) = fraction {
        if fraction.len() > DECIMAL_PLACES {
            return Err(AmountError::TooPrecise(value.to_string()));
        }

        if !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(AmountError::InvalidFormat(format!("Value has an invalid fraction part: [{fraction}]")));
        }
    }

    let normalized = value.trim_start_matches('+').trim_end_matches('.');
    let mut amount = Decimal::from_str(normalized)
        .map_err(|error| AmountError::InvalidFormat(error.to_string()))?;

    amount.rescale(DECIMAL_PLACES as u32);

    Ok(amount)
}

/// Absolute value without trailing zeros (`100`, `23.5`), the form searched by the ledger filter.
pub fn plain_amount(amount: Decimal) -> String {
    amount.abs().normalize().to_string()
}

/// `$1,234.50`, with a leading `-` for negative values.
pub fn format_currency(amount: Decimal) -> String {
    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    let fixed = amount.abs().round_dp(DECIMAL_PLACES as u32);
    let text = format!("{:.width$}", fixed, width = DECIMAL_PLACES);
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);

    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{fraction}")
}

/// `+$150.00` for credits and `-$23.50` for debits.
pub fn signed_amount(amount: Decimal) -> String {
    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "+" };
    format!("{sign}{}", format_currency(amount.abs()))
}
