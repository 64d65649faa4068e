//! Plan Builder - maps (intent, entities) to an ordered list of steps
//!
//! | Intent                  | Retrieval steps                                    |
//! |-------------------------|----------------------------------------------------|
//! | `production_analysis`   | tabular, + graph when a rig or well was named      |
//! | `safety_analysis`       | document, graph                                    |
//! | `maintenance_query`     | tabular, graph                                     |
//! | `relationship_analysis` | graph, tabular                                     |
//! | anything else           | tabular, graph                                     |
//!
//! `synthesis` is always the final step. The plan is advisory: the
//! orchestrator decides which retrieval steps it can actually parameterize.

use crate::types::{EntityMap, Intent, StepTag};

pub fn build_plan(intent: Intent, entities: &EntityMap) -> Vec<StepTag> {
    let mut plan = match intent {
        Intent::ProductionAnalysis => {
            let mut steps = vec![StepTag::TabularRetriever];
            if entities.has_assets() {
                steps.push(StepTag::GraphRetriever);
            }
            steps
        }
        Intent::SafetyAnalysis => vec![StepTag::DocumentRetriever, StepTag::GraphRetriever],
        Intent::MaintenanceQuery => vec![StepTag::TabularRetriever, StepTag::GraphRetriever],
        // Graph first: relationships are the primary signal for this intent
        Intent::RelationshipAnalysis => vec![StepTag::GraphRetriever, StepTag::TabularRetriever],
        Intent::ProductionQuery | Intent::GeneralQuery => {
            vec![StepTag::TabularRetriever, StepTag::GraphRetriever]
        }
    };

    plan.push(StepTag::Synthesis);
    plan
}
