//! Price parsing and display formatting.
//!
//! Service documents are written by more than one client, so the stored
//! amount is either a JSON number or a numeric string. Everything the UI
//! shows goes through [`format_price`], which fails loudly on malformed data
//! instead of printing garbage.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a stored price cannot be read as an amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price '{0}' is not a number")]
    NotNumeric(String),
    #[error("price is missing")]
    Missing,
    #[error("price is not a finite number")]
    NotFinite,
    #[error("price must not be negative")]
    Negative,
    #[error("price {0} is too large")]
    OutOfRange(String),
}

/// Largest magnitude an `f64` holds without losing whole units.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// A price as stored in a service document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(serde_json::Number),
    Text(String),
    /// Anything else a document might hold (booleans, objects, ...).
    Other(serde_json::Value),
}

impl Price {
    /// Create a price from a whole amount.
    pub fn whole(amount: i64) -> Self {
        Self::Number(amount.into())
    }

    /// The amount in whole currency units, rounded to the nearest unit.
    ///
    /// # Errors
    /// Returns [`PriceError`] if the stored value is not a finite number or
    /// does not fit in whole units.
    pub fn amount(&self) -> Result<i64, PriceError> {
        match self {
            Self::Number(number) => {
                if let Some(whole) = number.as_i64() {
                    Ok(whole)
                } else if number.is_u64() {
                    Err(PriceError::OutOfRange(number.to_string()))
                } else {
                    to_whole_units(number.as_f64().ok_or(PriceError::NotFinite)?)
                }
            }
            Self::Text(text) => parse_amount(text),
            Self::Other(value) => Err(PriceError::NotNumeric(value.to_string())),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => write!(f, "{text}"),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

/// Format a price with `.` thousands separators and a currency suffix.
///
/// ```text
/// 1000    -> "1.000 VND"
/// 1234567 -> "1.234.567 VND"
/// ```
///
/// # Errors
/// Returns [`PriceError`] if the stored value is not numeric.
pub fn format_price(price: &Price, currency: &str) -> Result<String, PriceError> {
    Ok(format!("{} {currency}", group_thousands(price.amount()?)))
}

/// Parse a price typed by a user into a non-negative whole amount.
///
/// # Errors
/// Returns [`PriceError`] if the input is empty, not numeric, negative or
/// too large to hold in whole units.
pub fn parse_price_input(input: &str) -> Result<i64, PriceError> {
    let amount = parse_amount(input)?;
    if amount < 0 {
        return Err(PriceError::Negative);
    }
    Ok(amount)
}

fn parse_amount(text: &str) -> Result<i64, PriceError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(PriceError::Missing);
    }
    if let Ok(whole) = trimmed.parse::<i64>() {
        return Ok(whole);
    }
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| PriceError::NotNumeric(trimmed.to_string()))?;
    to_whole_units(value)
}

#[allow(clippy::cast_possible_truncation)]
fn to_whole_units(value: f64) -> Result<i64, PriceError> {
    if !value.is_finite() {
        return Err(PriceError::NotFinite);
    }
    let rounded = value.round();
    if rounded.abs() > MAX_EXACT_FLOAT {
        return Err(PriceError::OutOfRange(value.to_string()));
    }
    Ok(rounded as i64)
}

fn group_thousands(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}
