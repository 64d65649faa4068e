//! Parse-stage types: intent labels, extracted entities and execution plans.

use serde::{Deserialize, Serialize};

// ============================================================================
// Intent
// ============================================================================

/// Coarse classification of what kind of question is being asked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ProductionAnalysis,
    ProductionQuery,
    SafetyAnalysis,
    MaintenanceQuery,
    RelationshipAnalysis,
    #[default]
    GeneralQuery,
}

impl Intent {
    /// Wire label, identical to the serde representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProductionAnalysis => "production_analysis",
            Self::ProductionQuery => "production_query",
            Self::SafetyAnalysis => "safety_analysis",
            Self::MaintenanceQuery => "maintenance_query",
            Self::RelationshipAnalysis => "relationship_analysis",
            Self::GeneralQuery => "general_query",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Entities
// ============================================================================

/// Named entities extracted from the query text.
///
/// All five categories are always present in the serialized form, even when
/// empty. `sensors` has no extraction rule and stays empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityMap {
    pub rigs: Vec<String>,
    pub wells: Vec<String>,
    pub sensors: Vec<String>,
    pub basins: Vec<String>,
    pub time_periods: Vec<String>,
}

impl EntityMap {
    /// First extracted rig name, the only entity the orchestrator parameterizes
    /// retrieval steps with.
    pub fn primary_rig(&self) -> Option<&str> {
        self.rigs.first().map(String::as_str)
    }

    /// Whether at least one rig or well was mentioned.
    pub fn has_assets(&self) -> bool {
        !self.rigs.is_empty() || !self.wells.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.rigs.is_empty()
            && self.wells.is_empty()
            && self.sensors.is_empty()
            && self.basins.is_empty()
            && self.time_periods.is_empty()
    }
}

// ============================================================================
// Execution plan
// ============================================================================

/// One step of an execution plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepTag {
    TabularRetriever,
    GraphRetriever,
    DocumentRetriever,
    Synthesis,
}

impl StepTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TabularRetriever => "tabular_retriever",
            Self::GraphRetriever => "graph_retriever",
            Self::DocumentRetriever => "document_retriever",
            Self::Synthesis => "synthesis",
        }
    }

    pub const fn is_retrieval(self) -> bool {
        !matches!(self, Self::Synthesis)
    }
}

impl std::fmt::Display for StepTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the parse stage. Read-only once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseResult {
    pub query: String,
    pub intent: Intent,
    pub entities: EntityMap,
    pub plan: Vec<StepTag>,
}
