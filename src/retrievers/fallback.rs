//! Canned datasets served when a backend is unavailable.
//!
//! Each function mirrors the field set of the live operation it stands in for,
//! so callers can render either without special-casing. Adapters always flag
//! these batches `degraded`.

use crate::types::RetrievalRecord;
use serde_json::json;

// ============================================================================
// Tabular
// ============================================================================

pub fn production_trends(_rig: &str) -> Vec<RetrievalRecord> {
    vec![
        RetrievalRecord::new()
            .with("timestamp", "2024-12-30 10:00:00")
            .with("production_rate", 850.5)
            .with("moving_avg", 1000.0)
            .with("pressure", 2500)
            .with("temperature", 180),
        RetrievalRecord::new()
            .with("timestamp", "2024-12-29 10:00:00")
            .with("production_rate", 900.0)
            .with("moving_avg", 1000.0)
            .with("pressure", 2550)
            .with("temperature", 182),
    ]
}

pub fn wells_below_average(_basin: &str) -> Vec<RetrievalRecord> {
    vec![RetrievalRecord::new()
        .with("well_name", "Well W-12")
        .with("current_rate", 450.0)
        .with("avg_rate", 600.0)
        .with("deviation_pct", -25.0)]
}

pub fn maintenance_overdue() -> Vec<RetrievalRecord> {
    vec![RetrievalRecord::new()
        .with("equipment_id", "PUMP-45")
        .with("equipment_type", "Pump")
        .with("last_maintenance_date", "2024-10-15")
        .with("next_maintenance_due", "2024-12-15")
        .with("days_overdue", 15)]
}

// ============================================================================
// Graph
// ============================================================================

pub fn faulty_equipment(rig: &str) -> Vec<RetrievalRecord> {
    vec![RetrievalRecord::new()
        .with("rig", rig)
        .with("well", "Well W-12")
        .with("sensor", "G-40")
        .with("type", "Pressure Gauge")
        .with("reading", 1850.5)
        .with("status", "FAULTY")]
}

pub fn affected_assets(equipment_id: &str) -> Vec<RetrievalRecord> {
    vec![RetrievalRecord::new()
        .with("asset_name", "Rig Alpha")
        .with("asset_type", "Rig")
        .with("hops", 2)
        .with("path_nodes", json!([equipment_id, "Well W-12", "Rig Alpha"]))]
}

pub fn equipment_by_basin(_basin: &str) -> Vec<RetrievalRecord> {
    vec![RetrievalRecord::new()
        .with("rig", "Rig Alpha")
        .with("well", "Well W-12")
        .with("sensor", "G-40")
        .with("type", "Pressure Gauge")
        .with("status", "OPERATIONAL")]
}

pub fn incident_correlations() -> Vec<RetrievalRecord> {
    vec![RetrievalRecord::new()
        .with("incident", "INC-2024-045")
        .with("severity", "HIGH")
        .with("well", "Well W-12")
        .with("sensor", "G-40")
        .with("type", "Pressure Gauge")
        .with("incident_time", "2024-12-20 14:30:00")
        .with("anomaly_time", "2024-12-20 10:15:00")]
}

// ============================================================================
// Document
// ============================================================================

/// The HSE store has no canned reports; degraded searches return nothing.
pub fn search_reports(_text: &str) -> Vec<RetrievalRecord> {
    Vec::new()
}
