//! Pet types: the semantic pet-type enum, provider records, and the
//! candidate projection consumed by the recommender.

use serde::{Deserialize, Serialize};

/// The three pet types the system knows about.
///
/// Input is canonicalized to singular lower-case; plural forms are
/// accepted. Unknown values are dropped silently (`parse` returns `None`),
/// never an error — an unrecognized filter selection must not break a
/// search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetType {
    Cat,
    Dog,
    Rabbit,
}

impl PetType {
    /// All known types, in canonical (lexicographic) order.
    pub const ALL: [PetType; 3] = [PetType::Cat, PetType::Dog, PetType::Rabbit];

    /// Parse a user- or provider-supplied type string.
    ///
    /// Case-insensitive, whitespace-trimmed, singular or plural.
    /// Returns `None` for anything else.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "dog" | "dogs" => Some(PetType::Dog),
            "cat" | "cats" => Some(PetType::Cat),
            "rabbit" | "rabbits" => Some(PetType::Rabbit),
            _ => None,
        }
    }

    /// Canonical singular lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PetType::Cat => "cat",
            PetType::Dog => "dog",
            PetType::Rabbit => "rabbit",
        }
    }
}

impl AsRef<str> for PetType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for PetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pet listing as consumed from the listings provider.
///
/// Optional fields reflect the provider's sparse records; display defaults
/// are applied at the [`CandidatePet`] projection, not here, so cached
/// records stay faithful to the provider payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetRecord {
    /// Provider identifier, stringified.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Provider type label (e.g. "Dog").
    pub kind: String,

    /// Primary breed, when the provider knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed_primary: Option<String>,

    /// Age bracket (e.g. "Young", "Adult").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,

    /// Size bracket (e.g. "Small", "Medium").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Gender label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    /// Free-text description from the listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Primary photo URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    /// Distance in miles from the searched location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    /// Short descriptive tags (e.g. "Friendly", "House-trained").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Listing page URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Results of a listings search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Deduplicated listings, sorted by distance.
    pub animals: Vec<PetRecord>,

    /// Provider-reported total across all requested types.
    ///
    /// Sum of per-type totals; a pet listed under more than one requested
    /// type may be counted twice here even though `animals` is deduplicated.
    pub total_count: u64,
}

/// Projection of a [`PetRecord`] handed to the recommender.
///
/// Read-only snapshot for a single recommendation request; never cached.
/// Missing provider fields are filled with display defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePet {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub breed_primary: String,
    pub age: String,
    pub size: String,
    pub gender: String,
    /// Short descriptors, in listing order.
    pub traits: Vec<String>,
}

impl CandidatePet {
    /// Project a provider record, substituting display defaults.
    pub fn from_record(record: &PetRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            kind: record.kind.clone(),
            breed_primary: record
                .breed_primary
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            age: record.age.clone().unwrap_or_else(|| "Unknown".to_string()),
            size: record.size.clone().unwrap_or_else(|| "Medium".to_string()),
            gender: record
                .gender
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            traits: record.tags.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_singular_and_plural() {
        assert_eq!(PetType::parse("dog"), Some(PetType::Dog));
        assert_eq!(PetType::parse("Dogs"), Some(PetType::Dog));
        assert_eq!(PetType::parse("  CATS "), Some(PetType::Cat));
        assert_eq!(PetType::parse("rabbit"), Some(PetType::Rabbit));
    }

    #[test]
    fn parse_drops_unknown_types() {
        assert_eq!(PetType::parse("hamster"), None);
        assert_eq!(PetType::parse(""), None);
        assert_eq!(PetType::parse("dog "), Some(PetType::Dog));
    }

    #[test]
    fn candidate_projection_fills_defaults() {
        let record = PetRecord {
            id: "42".into(),
            name: "Bella".into(),
            kind: "Dog".into(),
            breed_primary: None,
            age: None,
            size: None,
            gender: None,
            description: None,
            photo_url: None,
            distance: None,
            tags: vec!["Friendly".into()],
            url: None,
        };

        let candidate = CandidatePet::from_record(&record);
        assert_eq!(candidate.breed_primary, "Unknown");
        assert_eq!(candidate.age, "Unknown");
        assert_eq!(candidate.size, "Medium");
        assert_eq!(candidate.gender, "Unknown");
        assert_eq!(candidate.traits, vec!["Friendly".to_string()]);
    }
}
