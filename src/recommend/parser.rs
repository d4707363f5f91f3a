//! Free-text recommendation parser.
//!
//! The completion service returns prose, not structured data. This module
//! deterministically extracts a [`Recommendation`] from it: a pet name, a
//! short justification, and up to three "Label: NN%" stats. Every stage is
//! a total function returning an optional value, composed with fallback
//! chains; `parse` never fails and always names a real candidate whenever
//! any candidate exists.
//!
//! The cutoff heuristics in [`extract_reason`] are tuned to the prompt
//! style in [`prompt`](super::prompt). Different phrasing from the
//! completion service can truncate or overrun the justification; that is
//! an accepted approximation, the result is still bounded and usable.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{CandidatePet, MAX_STATS, Recommendation, Stat};

/// "I recommend {name}." — name runs to the first period on the line.
static STATED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bI recommend\s+([^.\n]+)\.").unwrap());

/// A labelled percentage: "Playfulness: 80%".
static STAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Za-z][A-Za-z ]*):\s*(\d{1,3})\s*%").unwrap());

/// A stat line starting after a line break; marks the end of prose.
static STAT_AFTER_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*[A-Za-z][A-Za-z ]*:\s*\d{1,3}\s*%").unwrap());

/// A stat immediately following a sentence-ending period.
static STAT_AFTER_PERIOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\s*[A-Za-z][A-Za-z ]*:\s*\d{1,3}\s*%").unwrap());

/// A bare percentage with no label.
static BARE_PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,3}\s*%").unwrap());

/// Lines longer than this cannot be a bare pet-name mention.
const NAME_LINE_MAX_CHARS: usize = 30;

/// Extract a structured recommendation from raw generated text.
///
/// Name resolution falls back in order: the stated "I recommend …"
/// sentence, a short line mentioning a candidate, the first candidate.
/// Whenever `candidates` is non-empty the result's `pet_id` is guaranteed
/// to be one of their ids and `pet_name` the matching candidate's name.
pub fn parse(raw_text: &str, candidates: &[CandidatePet]) -> Recommendation {
    let extracted = extract_stated_name(raw_text)
        .or_else(|| extract_name_from_lines(raw_text, candidates))
        .or_else(|| candidates.first().map(|c| c.name.clone()));

    let (pet_id, pet_name) = match extracted {
        Some(name) => match resolve_candidate(&name, candidates).or(candidates.first()) {
            Some(candidate) => (Some(candidate.id.clone()), candidate.name.clone()),
            None => (None, name),
        },
        None => (None, String::new()),
    };

    let match_reason = if pet_name.is_empty() {
        String::new()
    } else {
        extract_reason(raw_text, &pet_name)
            .unwrap_or_else(|| Recommendation::fallback_reason(&pet_name))
    };

    let mut stats = extract_stats(raw_text);
    if stats.is_empty() {
        stats = Recommendation::default_stats();
    } else {
        stats.truncate(MAX_STATS);
    }

    Recommendation {
        pet_id,
        pet_name,
        match_reason,
        stats,
    }
}

/// Step 1: the explicit "I recommend {name}." sentence.
fn extract_stated_name(raw: &str) -> Option<String> {
    STATED_NAME
        .captures(raw)
        .map(|cap| cap[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Step 2: a short standalone line mentioning a candidate by name.
///
/// Returns the candidate's exact name, not the line's casing.
fn extract_name_from_lines(raw: &str, candidates: &[CandidatePet]) -> Option<String> {
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.chars().count() >= NAME_LINE_MAX_CHARS {
            continue;
        }
        if starts_with_ci(line, "i recommend") {
            continue;
        }
        for candidate in candidates {
            if !candidate.name.is_empty() && find_ci(line, &candidate.name).is_some() {
                return Some(candidate.name.clone());
            }
        }
    }
    None
}

/// Match a resolved name back to a candidate, exact match preferred,
/// then substring containment in either direction.
fn resolve_candidate<'a>(name: &str, candidates: &'a [CandidatePet]) -> Option<&'a CandidatePet> {
    candidates
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
        .or_else(|| {
            candidates.iter().find(|c| {
                !c.name.is_empty()
                    && (find_ci(name, &c.name).is_some() || find_ci(&c.name, name).is_some())
            })
        })
}

/// Extract the justification following the first mention of `name`.
///
/// The text after the name (leading punctuation stripped) runs up to the
/// earliest of: a stat line after a line break, a stat after a sentence
/// period, or a blank line. A bare percentage inside the remainder
/// truncates it further. `None` when the name never appears or nothing
/// readable remains.
fn extract_reason(raw: &str, name: &str) -> Option<String> {
    let idx = find_ci(raw, name)?;
    let after = raw[idx + name.len()..].trim_start_matches(|c: char| !is_word_char(c));

    let mut cutoff = after.len();
    if let Some(m) = STAT_AFTER_BREAK.find(after) {
        cutoff = cutoff.min(m.start());
    }
    if let Some(m) = STAT_AFTER_PERIOD.find(after) {
        cutoff = cutoff.min(m.start() + 1); // keep the period, trimmed below
    }
    if let Some(p) = after.find("\n\n") {
        cutoff = cutoff.min(p);
    }

    let mut reason = trim_non_word(&after[..cutoff]);
    if let Some(m) = BARE_PERCENT.find(reason) {
        reason = trim_non_word(&reason[..m.start()]);
    }

    if reason.is_empty() {
        None
    } else {
        Some(reason.to_string())
    }
}

/// Step 7: every "Label: NN%" in the whole text, in order, no dedup.
/// Values are clamped to 100.
fn extract_stats(raw: &str) -> Vec<Stat> {
    STAT.captures_iter(raw)
        .map(|cap| {
            let value = cap[2].parse::<u32>().unwrap_or(0).min(100) as u8;
            Stat::new(cap[1].trim(), value)
        })
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn trim_non_word(s: &str) -> &str {
    s.trim_matches(|c: char| !is_word_char(c))
}

/// Byte offset of the first ASCII-case-insensitive occurrence of
/// `needle` in `haystack`.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

fn starts_with_ci(haystack: &str, prefix: &str) -> bool {
    haystack.len() >= prefix.len()
        && haystack.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stated_name_is_case_insensitive() {
        assert_eq!(
            extract_stated_name("Well, i RECOMMEND Luna. She is calm."),
            Some("Luna".to_string())
        );
    }

    #[test]
    fn stated_name_requires_terminating_period() {
        assert_eq!(extract_stated_name("I recommend Luna"), None);
    }

    #[test]
    fn stated_name_stops_at_line_end() {
        assert_eq!(extract_stated_name("I recommend\nLuna. Great cat."), None);
    }

    #[test]
    fn stat_values_clamp_at_100() {
        let stats = extract_stats("Energy: 140%");
        assert_eq!(stats, vec![Stat::new("Energy", 100)]);
    }

    #[test]
    fn stats_keep_order_and_duplicates() {
        let stats = extract_stats("A: 10%\nB: 20%\nA: 10%");
        assert_eq!(
            stats,
            vec![
                Stat::new("A", 10),
                Stat::new("B", 20),
                Stat::new("A", 10),
            ]
        );
    }

    #[test]
    fn reason_stops_at_blank_line() {
        let reason = extract_reason("Milo.\n\nMilo loves naps\n\nUnrelated trailer", "Milo");
        assert_eq!(reason, Some("Milo loves naps".to_string()));
    }

    #[test]
    fn reason_truncates_at_bare_percent() {
        let reason = extract_reason("Milo is 90% fluff and all heart", "Milo");
        assert_eq!(reason, Some("is".to_string()));
    }

    #[test]
    fn find_ci_returns_byte_offset() {
        assert_eq!(find_ci("say BELLA twice", "bella"), Some(4));
        assert_eq!(find_ci("nothing here", "bella"), None);
    }
}
