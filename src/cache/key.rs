//! Cache key construction.
//!
//! Keys are pure functions of their inputs: identical queries produce
//! identical keys irrespective of how the UI ordered or cased the type
//! filter, so cache hits do not depend on selection order.
//!
//! Layout (all string keys):
//!
//! - `search_{postal}_{typesKey}` — search results
//! - `pet_details_{id}` — single pet records
//! - `ai_rec_{postal}_{typesKey}` — recommendations

use crate::types::PetType;

/// Namespace for cached search results.
pub const SEARCH_NS: &str = "search";

/// Namespace for cached single pet records.
pub const PET_DETAILS_NS: &str = "pet_details";

/// Namespace for cached recommendations.
pub const RECOMMENDATION_NS: &str = "ai_rec";

/// Normalize a type filter for fan-out and prompting.
///
/// Parses each element (case-insensitive, singular or plural), drops
/// unknowns silently, sorts, and deduplicates.
pub fn normalize_types<S: AsRef<str>>(types: &[S]) -> Vec<PetType> {
    let mut parsed: Vec<PetType> = types
        .iter()
        .filter_map(|t| PetType::parse(t.as_ref()))
        .collect();
    parsed.sort_unstable();
    parsed.dedup();
    parsed
}

/// The type segment of a cache key: canonical names, sorted, `-`-joined.
///
/// An empty or all-unknown filter yields an empty segment.
pub fn types_key<S: AsRef<str>>(types: &[S]) -> String {
    let keys: Vec<&'static str> = normalize_types(types)
        .into_iter()
        .map(|t| t.as_str())
        .collect();
    keys.join("-")
}

/// Key for a search-results entry.
pub fn search_key<S: AsRef<str>>(postal_code: &str, types: &[S]) -> String {
    format!("{SEARCH_NS}_{postal_code}_{}", types_key(types))
}

/// Key for a recommendation entry.
pub fn recommendation_key<S: AsRef<str>>(postal_code: &str, types: &[S]) -> String {
    format!("{RECOMMENDATION_NS}_{postal_code}_{}", types_key(types))
}

/// Key for a single pet record. No type component.
pub fn detail_key(id: &str) -> String {
    format!("{PET_DETAILS_NS}_{id}")
}
