//! Field-level parsers for raw CSV cells
//!
//! Amounts follow the Brazilian locale: `.` is the thousands separator and
//! `,` is the decimal separator (`1.500,50` -> 1500.50). That convention is
//! load-bearing for uploaded files and must not change.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Date pattern accepted by [`parse_date`]
pub const DATE_PATTERN: &str = "dd/MM/yyyy";

/// Failure modes of the individual field parsers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("malformed {field} value: \"{value}\"")]
    Malformed { field: String, value: String },

    #[error("invalid date \"{value}\", expected format {DATE_PATTERN}")]
    InvalidDate { value: String },

    #[error("invalid monetary amount: \"{value}\"")]
    InvalidAmount { value: String },

    #[error("missing required field: {field}")]
    MissingRequired { field: String },
}

/// Parse a base-10 integer cell
pub fn parse_int(raw: &str, field: &str) -> Result<i32, FieldError> {
    raw.trim().parse::<i32>().map_err(|_| FieldError::Malformed {
        field: field.to_string(),
        value: raw.trim().to_string(),
    })
}

/// Parse a `dd/MM/yyyy` date cell.
///
/// The pattern is strict: two-digit day and month, four-digit year.
pub fn parse_date(raw: &str) -> Result<NaiveDate, FieldError> {
    let trimmed = raw.trim();
    let bytes = trimmed.as_bytes();
    let shaped = bytes.len() == 10 && bytes[2] == b'/' && bytes[5] == b'/';
    if !shaped {
        return Err(FieldError::InvalidDate {
            value: trimmed.to_string(),
        });
    }
    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").map_err(|_| FieldError::InvalidDate {
        value: trimmed.to_string(),
    })
}

/// Parse a Brazilian-locale currency cell; blank input is zero, not an error.
pub fn parse_currency(raw: &str) -> Result<Decimal, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let normalized = trimmed.replace('.', "").replace(',', ".");
    normalized
        .parse::<Decimal>()
        .map_err(|_| FieldError::InvalidAmount {
            value: trimmed.to_string(),
        })
}

/// Parse an optional currency cell; blank input stays absent.
pub fn parse_optional_currency(raw: &str) -> Result<Option<Decimal>, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_currency(trimmed).map(Some)
}

/// Trim a required text cell, rejecting blank content
pub fn required_text(raw: &str, field: &str) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::MissingRequired {
            field: field.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text cell; blank content becomes `None`
pub fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
