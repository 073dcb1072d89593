use lazy_static::lazy_static;
use regex::Regex;

use crate::core::error::{AppError, Result};

lazy_static! {
    /// Ids are opaque to the client and URL-encoded as path segments; only
    /// empty ids and control characters are refused here
    /// - Valid: "-NxA3kLq9", "r1", "report.2024", "user@example.com", "a b"
    /// - Invalid: "", "line\nbreak", "tab\tid"
    pub static ref RECORD_ID_REGEX: Regex = Regex::new(r"^[^\x00-\x1f\x7f]{1,512}$").unwrap();
}

/// Reject identifiers that cannot name a single path segment
pub fn ensure_record_id(kind: &str, id: &str) -> Result<()> {
    if id == "." || id == ".." || !RECORD_ID_REGEX.is_match(id) {
        return Err(AppError::Validation(format!("Invalid {} id: {:?}", kind, id)));
    }
    Ok(())
}

/// Accept heights written with a decimal comma ("1,5"), as entered in forms
pub fn parse_height(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    let value = normalized.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}
