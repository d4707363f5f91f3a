//! The structured recommendation produced from free-form generated text.

use serde::{Deserialize, Serialize};

/// Maximum number of stats carried on a recommendation.
pub const MAX_STATS: usize = 3;

/// A single labelled match percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    /// Short label (e.g. "Playfulness").
    pub label: String,

    /// Percentage in `[0, 100]`.
    pub value: u8,
}

impl Stat {
    pub fn new(label: impl Into<String>, value: u8) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// A recommendation for one pet out of a candidate list.
///
/// Always best-effort: the parser guarantees `pet_id` references a real
/// candidate whenever any candidate exists, `match_reason` is non-empty
/// whenever a pet was named, and `stats` holds at most [`MAX_STATS`]
/// entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Resolved candidate id; `None` only when the candidate list was empty.
    pub pet_id: Option<String>,

    /// Display name of the recommended pet.
    pub pet_name: String,

    /// 1–3 sentence justification, or the templated fallback.
    pub match_reason: String,

    /// Up to [`MAX_STATS`] labelled percentages, in order of appearance.
    pub stats: Vec<Stat>,
}

impl Recommendation {
    /// The fixed stat triple substituted when no stats could be extracted.
    pub fn default_stats() -> Vec<Stat> {
        vec![
            Stat::new("Compatibility", 85),
            Stat::new("Adaptability", 80),
            Stat::new("Care Level", 75),
        ]
    }

    /// Templated justification used when no reason could be extracted.
    pub fn fallback_reason(pet_name: &str) -> String {
        format!("{pet_name} could be a wonderful addition to your home.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_triple() {
        let stats = Recommendation::default_stats();
        assert_eq!(stats.len(), MAX_STATS);
        assert_eq!(stats[0], Stat::new("Compatibility", 85));
        assert_eq!(stats[1], Stat::new("Adaptability", 80));
        assert_eq!(stats[2], Stat::new("Care Level", 75));
    }

    #[test]
    fn fallback_reason_names_the_pet() {
        assert!(Recommendation::fallback_reason("Rex").contains("Rex"));
    }
}
