//! Input validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Regex for validating e-mail addresses
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Regex for validating hex color codes (#rgb or #rrggbb)
static HEX_COLOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());

/// Validate an e-mail address
pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= 255 && EMAIL_REGEX.is_match(email)
}

/// Validate a hex color code
pub fn validate_hex_color(color: &str) -> bool {
    HEX_COLOR_REGEX.is_match(color)
}

/// Strip everything but digits from a CPF/CNPJ document string
pub fn normalize_document(document: &str) -> String {
    document.chars().filter(|c| c.is_ascii_digit()).collect()
}
