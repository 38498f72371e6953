//! Money Conversion Module
//!
//! Amounts cross the API as decimals in major units (e.g. `1500.00` INR) while
//! the payment gateway expects integers in the currency's minor unit
//! (paise, cents). All conversions go through this module.
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use stayline::money::to_minor_units;
//!
//! let amount = Decimal::new(150000, 2); // 1500.00
//! assert_eq!(to_minor_units(amount, 100).unwrap(), 150_000);
//! ```

use rust_decimal::prelude::*;
use thiserror::Error;

/// Default minor-unit factor (two decimal places)
pub const DEFAULT_MINOR_UNIT_FACTOR: u32 = 100;

/// Factors whose minor unit fits the two decimal places of `payments.amount`
pub const SUPPORTED_MINOR_UNIT_FACTORS: [u32; 3] = [1, 10, 100];

/// Money conversion errors
#[derive(Debug, Error, PartialEq)]
pub enum MoneyError {
    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Precision overflow: {amount} cannot be expressed in units of 1/{factor}")]
    PrecisionOverflow { amount: Decimal, factor: u32 },

    #[error("Amount too large, would overflow")]
    Overflow,

    #[error("Invalid currency code: '{0}' (expected three uppercase letters)")]
    InvalidCurrency(String),
}

/// Convert a positive major-unit amount into gateway minor units.
///
/// # Errors
/// * `InvalidAmount` - zero or negative amount
/// * `PrecisionOverflow` - amount has finer precision than the minor unit
/// * `Overflow` - result does not fit in `i64`
pub fn to_minor_units(amount: Decimal, factor: u32) -> Result<i64, MoneyError> {
    if amount <= Decimal::ZERO {
        return Err(MoneyError::InvalidAmount);
    }

    let scaled = amount
        .checked_mul(Decimal::from(factor))
        .ok_or(MoneyError::Overflow)?;

    // No silent truncation: 10.005 INR is rejected, not rounded
    if scaled.fract() != Decimal::ZERO {
        return Err(MoneyError::PrecisionOverflow { amount, factor });
    }

    scaled.to_i64().ok_or(MoneyError::Overflow)
}

/// Normalize and validate an ISO-4217 style currency code.
pub fn normalize_currency(code: &str) -> Result<String, MoneyError> {
    let code = code.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(MoneyError::InvalidCurrency(code));
    }
    Ok(code)
}
