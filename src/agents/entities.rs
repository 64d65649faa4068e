//! Entity Extractor - rig/well names, basins and time windows in query text

use crate::types::EntityMap;
use regex::Regex;
use std::sync::OnceLock;

/// Basins recognised by name.
pub const KNOWN_BASINS: &[&str] = &["Permian", "Eagle Ford", "Bakken", "Marcellus"];

/// Time-window phrases recognised verbatim.
pub const KNOWN_TIME_PERIODS: &[&str] =
    &["30-day", "weekly", "monthly", "daily", "last week", "last month"];

static RIG_PATTERN: OnceLock<Regex> = OnceLock::new();
static WELL_PATTERN: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)]
fn rig_pattern() -> &'static Regex {
    RIG_PATTERN.get_or_init(|| Regex::new(r"(?i)rig\s+[A-Za-z0-9-]+").expect("rig pattern is valid"))
}

#[allow(clippy::expect_used)]
fn well_pattern() -> &'static Regex {
    WELL_PATTERN
        .get_or_init(|| Regex::new(r"(?i)well\s+[A-Za-z0-9-]+").expect("well pattern is valid"))
}

fn find_all(pattern: &Regex, query: &str) -> Vec<String> {
    pattern
        .find_iter(query)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Known phrases contained in `query`, in list order, using the canonical spelling.
fn known_terms(query_lower: &str, terms: &[&str]) -> Vec<String> {
    terms
        .iter()
        .filter(|t| query_lower.contains(&t.to_lowercase()))
        .map(|t| (*t).to_string())
        .collect()
}

/// Extract entities from `query`.
///
/// Rig and well matches keep the query's spelling and order, duplicates
/// included. Sensors have no extraction rule and are always empty.
pub fn extract(query: &str) -> EntityMap {
    let lower = query.to_lowercase();
    EntityMap {
        rigs: find_all(rig_pattern(), query),
        wells: find_all(well_pattern(), query),
        sensors: Vec::new(),
        basins: known_terms(&lower, KNOWN_BASINS),
        time_periods: known_terms(&lower, KNOWN_TIME_PERIODS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rig_and_well_names() {
        let entities = extract("Compare Rig Alpha and rig B-12 against Well W-12");
        assert_eq!(entities.rigs, vec!["Rig Alpha", "rig B-12"]);
        assert_eq!(entities.wells, vec!["Well W-12"]);
        assert!(entities.sensors.is_empty());
    }

    #[test]
    fn test_punctuation_ends_name() {
        let entities = extract("Why is production dropping at Rig Alpha?");
        assert_eq!(entities.rigs, vec!["Rig Alpha"]);
    }

    #[test]
    fn test_duplicates_preserved_in_order() {
        let entities = extract("Rig Alpha vs Rig Bravo vs Rig Alpha");
        assert_eq!(entities.rigs, vec!["Rig Alpha", "Rig Bravo", "Rig Alpha"]);
    }

    #[test]
    fn test_basins_and_periods_canonical_spelling() {
        let entities = extract("monthly output for the eagle ford and PERMIAN over the last week");
        assert_eq!(entities.basins, vec!["Permian", "Eagle Ford"]);
        assert_eq!(entities.time_periods, vec!["monthly", "last week"]);
    }

    #[test]
    fn test_no_matches_gives_empty_lists() {
        let entities = extract("general status please");
        assert!(entities.is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let query = "Rig Alpha well 7 in Bakken, 30-day daily view, Rig Alpha again";
        assert_eq!(extract(query), extract(query));
    }
}
