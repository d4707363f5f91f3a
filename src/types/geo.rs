//! Location types for geocoding results.

use serde::{Deserialize, Serialize};

/// Postal area resolved from coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalArea {
    /// 5-digit US postal code.
    pub postal_code: String,

    /// ISO country code (e.g. "US").
    pub country_code: String,
}

/// Whether a string is a well-formed 5-digit US postal code.
pub fn is_valid_postal_code(code: &str) -> bool {
    code.len() == 5 && code.bytes().all(|b| b.is_ascii_digit())
}
