//! Intent Classifier - keyword rules mapping a query to one intent label
//!
//! Rules are evaluated in a fixed order and the first match wins:
//!
//! | Order | Keywords      | Intent                                          |
//! |-------|---------------|-------------------------------------------------|
//! | 1     | production    | `production_analysis` if a trend keyword is also present, else `production_query` |
//! | 2     | safety        | `safety_analysis`                               |
//! | 3     | maintenance   | `maintenance_query`                             |
//! | 4     | relationship  | `relationship_analysis`                         |
//! | -     | (none)        | `general_query`                                 |
//!
//! Matching is case-insensitive substring matching, so "rate" also matches
//! "flow-rate" and "accelerate".

use crate::types::Intent;

pub const PRODUCTION_KEYWORDS: &[&str] = &["production", "output", "yield", "rate", "volume"];
pub const TREND_KEYWORDS: &[&str] = &["trend", "average", "dropping", "increasing", "below", "above"];
pub const SAFETY_KEYWORDS: &[&str] = &["safety", "incident", "hse", "accident", "injury"];
pub const MAINTENANCE_KEYWORDS: &[&str] = &["maintenance", "repair", "downtime", "service"];
pub const RELATIONSHIP_KEYWORDS: &[&str] = &["linked", "connected", "affected", "related", "caused"];

fn mentions(query: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| query.contains(kw))
}

/// Classify `query`. Always returns a label.
pub fn classify(query: &str) -> Intent {
    let query = query.to_lowercase();

    if mentions(&query, PRODUCTION_KEYWORDS) {
        if mentions(&query, TREND_KEYWORDS) {
            return Intent::ProductionAnalysis;
        }
        return Intent::ProductionQuery;
    }

    if mentions(&query, SAFETY_KEYWORDS) {
        return Intent::SafetyAnalysis;
    }

    if mentions(&query, MAINTENANCE_KEYWORDS) {
        return Intent::MaintenanceQuery;
    }

    if mentions(&query, RELATIONSHIP_KEYWORDS) {
        return Intent::RelationshipAnalysis;
    }

    Intent::GeneralQuery
}
