//! Query Parser - intent, entities and execution plan in one pass

use super::{entities, intent, planner};
use crate::types::ParseResult;
use tracing::{debug, info};

/// Stateless facade over the classifier, extractor and plan builder.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParser;

impl QueryParser {
    pub const fn new() -> Self {
        Self
    }

    pub fn parse(&self, query: &str) -> ParseResult {
        let intent = intent::classify(query);
        let entities = entities::extract(query);
        let plan = planner::build_plan(intent, &entities);

        info!(
            intent = %intent,
            rigs = entities.rigs.len(),
            wells = entities.wells.len(),
            plan_len = plan.len(),
            "Query parsed"
        );
        debug!(entities = ?entities, plan = ?plan, "Parse detail");

        ParseResult {
            query: query.to_string(),
            intent,
            entities,
            plan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Intent, StepTag};

    #[test]
    fn test_rig_alpha_scenario() {
        let parsed = QueryParser::new().parse("Why is production dropping at Rig Alpha?");
        assert_eq!(parsed.intent, Intent::ProductionAnalysis);
        assert_eq!(parsed.entities.rigs, vec!["Rig Alpha"]);
        assert_eq!(
            parsed.plan,
            vec![
                StepTag::TabularRetriever,
                StepTag::GraphRetriever,
                StepTag::Synthesis
            ]
        );
        assert_eq!(parsed.query, "Why is production dropping at Rig Alpha?");
    }
}
