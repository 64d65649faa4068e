//! Orchestrator - runs one query from parse to synthesized answer
//!
//! Each query moves through a fixed sequence of phases with no branching back:
//!
//! ```text
//! received → parsed → retrieving → synthesized → done
//! ```
//!
//! Retriever and synthesis failures are absorbed by their own fallbacks, so
//! the only way a run fails is an internal inconsistency, reported as
//! [`OrchestrationError`] and never as a partial response.
//!
//! ## Execution policy
//!
//! The plan is advisory. A retrieval step runs only when its parameters are
//! available: tabular and graph steps need a rig name and use the first one
//! extracted. Document steps are planned but not executed. Steps run one at a
//! time in plan order. The plan and the steps that actually ran are both
//! reported in the response.

use super::parser::QueryParser;
use super::synthesizer::{SynthesisInputs, Synthesizer};
use crate::retrievers::Retrievers;
use crate::types::{
    ParseResult, QueryResponse, ReasoningTrace, RecordBatch, ResponseData, StepTag,
};
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

/// Graph record fields that make up the reported asset path.
const GRAPH_PATH_FIELDS: [&str; 3] = ["rig", "well", "sensor"];

// ============================================================================
// Phases
// ============================================================================

/// Lifecycle phase of a single query run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Received,
    Parsed,
    Retrieving,
    Synthesized,
    Done,
}

impl QueryPhase {
    /// The only phase reachable from this one.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Received => Some(Self::Parsed),
            Self::Parsed => Some(Self::Retrieving),
            Self::Retrieving => Some(Self::Synthesized),
            Self::Synthesized => Some(Self::Done),
            Self::Done => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Parsed => "parsed",
            Self::Retrieving => "retrieving",
            Self::Synthesized => "synthesized",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for QueryPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure not covered by retriever or synthesis fallbacks.
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    #[error("invalid phase transition {from} -> {to}")]
    InvalidTransition { from: QueryPhase, to: QueryPhase },

    #[error("internal orchestration error: {0}")]
    Internal(String),
}

/// Forward-only phase tracker for one run.
#[derive(Debug)]
struct PhaseTracker {
    phase: QueryPhase,
}

impl PhaseTracker {
    const fn new() -> Self {
        Self {
            phase: QueryPhase::Received,
        }
    }

    fn advance(&mut self, to: QueryPhase) -> Result<(), OrchestrationError> {
        if self.phase.next() != Some(to) {
            return Err(OrchestrationError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        debug!(from = %self.phase, to = %to, "Phase transition");
        self.phase = to;
        Ok(())
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Long-lived dependency bundle. Holds no per-query state, so one instance
/// serves concurrent queries without locking.
#[derive(Clone)]
pub struct Orchestrator {
    parser: QueryParser,
    retrievers: Retrievers,
    synthesizer: Synthesizer,
}

/// Retrieval results for one run.
#[derive(Default)]
struct Retrieved {
    tabular: Option<RecordBatch>,
    graph: Option<RecordBatch>,
    executed: Vec<StepTag>,
}

impl Orchestrator {
    pub fn new(retrievers: Retrievers, synthesizer: Synthesizer) -> Self {
        Self {
            parser: QueryParser::new(),
            retrievers,
            synthesizer,
        }
    }

    pub fn retrievers(&self) -> &Retrievers {
        &self.retrievers
    }

    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    /// Process one query end to end.
    pub async fn run(&self, query: &str) -> Result<QueryResponse, OrchestrationError> {
        let query_id = Uuid::new_v4();
        self.run_inner(query)
            .instrument(info_span!("query", id = %query_id))
            .await
    }

    async fn run_inner(&self, query: &str) -> Result<QueryResponse, OrchestrationError> {
        info!(query = %query, "Processing query");
        let mut phase = PhaseTracker::new();
        let mut trace = ReasoningTrace::new();

        let parsed = self.parser.parse(query);
        phase.advance(QueryPhase::Parsed)?;
        trace.push(
            "Parser",
            "Query decomposition",
            format!("Intent: {}", parsed.intent),
        );

        phase.advance(QueryPhase::Retrieving)?;
        let retrieved = self.retrieve(&parsed, &mut trace).await;

        let synthesis = self
            .synthesizer
            .synthesize(
                query,
                SynthesisInputs {
                    tabular: retrieved.tabular.as_ref(),
                    graph: retrieved.graph.as_ref(),
                    document: None,
                },
            )
            .await;
        phase.advance(QueryPhase::Synthesized)?;
        trace.push(
            "Synthesizer",
            "Synthesized final answer",
            format!("Confidence: {:.2}", synthesis.confidence),
        );

        let expected_steps = retrieved.executed.len() + 2;
        if trace.len() != expected_steps {
            return Err(OrchestrationError::Internal(format!(
                "reasoning trace has {} steps, expected {expected_steps}",
                trace.len()
            )));
        }

        let graph_path = retrieved.graph.as_ref().and_then(graph_path);

        phase.advance(QueryPhase::Done)?;
        info!(
            intent = %parsed.intent,
            executed = retrieved.executed.len(),
            method = %synthesis.method,
            confidence = synthesis.confidence,
            "Query complete"
        );

        Ok(QueryResponse {
            answer: synthesis.answer,
            reasoning_trace: trace.into_steps(),
            graph_path,
            confidence: synthesis.confidence,
            data: Some(ResponseData {
                intent: parsed.intent,
                plan: parsed.plan,
                executed_steps: retrieved.executed,
                tabular_results: retrieved.tabular,
                graph_results: retrieved.graph,
                synthesis_method: synthesis.method,
                supporting_data: synthesis.supporting_data,
            }),
        })
    }

    /// Run the retrieval steps of the plan, sequentially and in order.
    async fn retrieve(&self, parsed: &ParseResult, trace: &mut ReasoningTrace) -> Retrieved {
        let mut out = Retrieved::default();
        let rig = parsed.entities.primary_rig();

        for step in &parsed.plan {
            match (step, rig) {
                (StepTag::TabularRetriever, Some(rig)) => {
                    let batch = self.retrievers.tabular.production_trends(rig).await;
                    trace.push(
                        "Tabular",
                        format!("Queried production trends for {rig}"),
                        format!("Retrieved {} records", batch.len()),
                    );
                    out.tabular = Some(batch);
                    out.executed.push(*step);
                }
                (StepTag::GraphRetriever, Some(rig)) => {
                    let batch = self.retrievers.graph.faulty_equipment(rig).await;
                    trace.push(
                        "Graph",
                        format!("Searched for faulty equipment at {rig}"),
                        format!("Found {} items", batch.len()),
                    );
                    out.graph = Some(batch);
                    out.executed.push(*step);
                }
                (StepTag::Synthesis, _) => {}
                (step, _) => debug!(step = %step, "Planned step not executed"),
            }
        }

        out
    }
}

/// Rig, well and sensor of the first graph record. Missing fields are empty.
fn graph_path(batch: &RecordBatch) -> Option<Vec<String>> {
    let first = batch.first()?;
    Some(
        GRAPH_PATH_FIELDS
            .iter()
            .map(|field| first.get_str(field).unwrap_or_default())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::retrievers::{BackendResult, DocumentStore, GraphStore, TabularStore};
    use crate::types::{Intent, RetrievalRecord, SynthesisMethod};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Store that answers every call with no rows.
    struct EmptyStore;

    #[async_trait]
    impl TabularStore for EmptyStore {
        async fn production_trends(&self, _: &str, _: u32, _: u32) -> BackendResult<Vec<RetrievalRecord>> {
            Ok(Vec::new())
        }
        async fn wells_below_average(&self, _: &str, _: u32) -> BackendResult<Vec<RetrievalRecord>> {
            Ok(Vec::new())
        }
        async fn maintenance_overdue(&self) -> BackendResult<Vec<RetrievalRecord>> {
            Ok(Vec::new())
        }
        async fn ping(&self) -> BackendResult<()> {
            Ok(())
        }
        fn backend_name(&self) -> &'static str {
            "empty"
        }
    }

    #[async_trait]
    impl GraphStore for EmptyStore {
        async fn faulty_equipment(&self, _: &str) -> BackendResult<Vec<RetrievalRecord>> {
            Ok(Vec::new())
        }
        async fn affected_assets(&self, _: &str, _: u32) -> BackendResult<Vec<RetrievalRecord>> {
            Ok(Vec::new())
        }
        async fn equipment_by_basin(&self, _: &str) -> BackendResult<Vec<RetrievalRecord>> {
            Ok(Vec::new())
        }
        async fn incident_correlations(&self, _: u32) -> BackendResult<Vec<RetrievalRecord>> {
            Ok(Vec::new())
        }
        async fn ping(&self) -> BackendResult<()> {
            Ok(())
        }
        fn backend_name(&self) -> &'static str {
            "empty"
        }
    }

    #[async_trait]
    impl DocumentStore for EmptyStore {
        async fn search_reports(&self, _: &str, _: u32) -> BackendResult<Vec<RetrievalRecord>> {
            Ok(Vec::new())
        }
        async fn ping(&self) -> BackendResult<()> {
            Ok(())
        }
        fn backend_name(&self) -> &'static str {
            "empty"
        }
    }

    fn degraded_orchestrator() -> Orchestrator {
        Orchestrator::new(
            Retrievers::degraded(&AppConfig::default()),
            Synthesizer::rule_based(),
        )
    }

    fn empty_orchestrator() -> Orchestrator {
        let store = Arc::new(EmptyStore);
        Orchestrator::new(
            Retrievers::from_stores(
                store.clone(),
                store.clone(),
                store,
                &AppConfig::default().retrieval,
            ),
            Synthesizer::rule_based(),
        )
    }

    #[test]
    fn test_phases_only_move_forward() {
        let mut tracker = PhaseTracker::new();
        assert!(tracker.advance(QueryPhase::Retrieving).is_err());
        tracker.advance(QueryPhase::Parsed).unwrap();
        tracker.advance(QueryPhase::Retrieving).unwrap();
        assert!(matches!(
            tracker.advance(QueryPhase::Parsed),
            Err(OrchestrationError::InvalidTransition {
                from: QueryPhase::Retrieving,
                to: QueryPhase::Parsed
            })
        ));
        tracker.advance(QueryPhase::Synthesized).unwrap();
        tracker.advance(QueryPhase::Done).unwrap();
        assert_eq!(QueryPhase::Done.next(), None);
    }

    #[tokio::test]
    async fn test_rig_alpha_with_degraded_backends() {
        let response = degraded_orchestrator()
            .run("Why is production dropping at Rig Alpha?")
            .await
            .unwrap();

        assert!(!response.answer.is_empty());
        assert!((0.7..=1.0).contains(&response.confidence));
        assert_eq!(response.reasoning_trace.len(), 4);

        let agents: Vec<&str> = response
            .reasoning_trace
            .iter()
            .map(|s| s.agent.as_str())
            .collect();
        assert_eq!(agents, vec!["Parser", "Tabular", "Graph", "Synthesizer"]);
        let numbers: Vec<u32> = response.reasoning_trace.iter().map(|s| s.step).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(response.reasoning_trace[0].result, "Intent: production_analysis");

        assert_eq!(
            response.graph_path,
            Some(vec![
                "Rig Alpha".to_string(),
                "Well W-12".to_string(),
                "G-40".to_string()
            ])
        );

        let data = response.data.unwrap();
        assert_eq!(data.intent, Intent::ProductionAnalysis);
        assert_eq!(
            data.executed_steps,
            vec![StepTag::TabularRetriever, StepTag::GraphRetriever]
        );
        assert!(data.tabular_results.unwrap().degraded);
        assert!(data.graph_results.unwrap().degraded);
        assert_eq!(data.synthesis_method, SynthesisMethod::RuleBased);
    }

    #[tokio::test]
    async fn test_no_rig_means_no_retrieval() {
        let response = degraded_orchestrator()
            .run("safety incident report")
            .await
            .unwrap();

        assert_eq!(response.reasoning_trace.len(), 2);
        assert_eq!(response.answer, crate::agents::synthesizer::NO_DATA_ANSWER);
        assert_eq!(response.confidence, 0.3);
        assert_eq!(response.graph_path, None);

        let data = response.data.unwrap();
        assert_eq!(data.intent, Intent::SafetyAnalysis);
        assert_eq!(
            data.plan,
            vec![StepTag::DocumentRetriever, StepTag::GraphRetriever, StepTag::Synthesis]
        );
        assert!(data.executed_steps.is_empty());
        assert_eq!(data.synthesis_method.as_str(), "rule_based_synthesis");
    }

    #[tokio::test]
    async fn test_relationship_intent_runs_graph_first() {
        let response = degraded_orchestrator()
            .run("Which wells are connected to Rig Bravo?")
            .await
            .unwrap();

        let data = response.data.unwrap();
        assert_eq!(data.intent, Intent::RelationshipAnalysis);
        assert_eq!(
            data.executed_steps,
            vec![StepTag::GraphRetriever, StepTag::TabularRetriever]
        );
        assert_eq!(response.reasoning_trace[1].agent, "Graph");
        assert_eq!(response.reasoning_trace[2].agent, "Tabular");
    }

    #[tokio::test]
    async fn test_empty_results_give_no_data_answer_and_no_path() {
        let response = empty_orchestrator()
            .run("Why is production dropping at Rig Alpha?")
            .await
            .unwrap();

        assert_eq!(response.answer, crate::agents::synthesizer::NO_DATA_ANSWER);
        assert_eq!(response.confidence, 0.3);
        assert_eq!(response.graph_path, None);
        assert_eq!(response.reasoning_trace.len(), 4);
        assert_eq!(response.reasoning_trace[1].result, "Retrieved 0 records");

        let data = response.data.unwrap();
        assert!(!data.tabular_results.unwrap().degraded);
    }

    #[test]
    fn test_graph_path_missing_fields_are_empty() {
        let batch = RecordBatch::live(
            crate::types::RetrieverKind::Graph,
            vec![RetrievalRecord::new().with("rig", "Rig Alpha")],
        );
        assert_eq!(
            graph_path(&batch),
            Some(vec!["Rig Alpha".to_string(), String::new(), String::new()])
        );
        assert_eq!(graph_path(&RecordBatch::empty(crate::types::RetrieverKind::Graph)), None);
    }
}
