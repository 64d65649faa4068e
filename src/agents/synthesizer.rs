//! Synthesizer - merges retriever outputs into one answer with a confidence
//!
//! ## Strategies
//!
//! The strategy is chosen once at startup from the LLM capability probe:
//!
//! - **Generative**: one prompt embedding the query and every result list,
//!   answer returned verbatim with confidence 0.9. If the call fails, that
//!   call falls back to rule-based synthesis (no retry).
//! - **Rule-based**: confidence starts at 0.70 and gains 0.10 per non-empty
//!   result list, capped at 1.0. With no data at all the answer is a fixed
//!   sentence at confidence 0.30.

use crate::llm::LlmBackend;
use crate::types::{RecordBatch, SnapshotEntry, SupportingData, SynthesisMethod, SynthesisResult};
use std::sync::Arc;
use tracing::{info, warn};

/// Confidence reported for generated answers.
pub const GENERATIVE_CONFIDENCE: f64 = 0.9;

/// Answer used when no retriever produced anything.
pub const NO_DATA_ANSWER: &str = "No relevant data found to answer the query.";

// Confidence arithmetic is done in hundredths to keep values exact.
const RULE_BASE_CONFIDENCE: u32 = 70;
const RULE_STEP_CONFIDENCE: u32 = 10;
const RULE_MAX_CONFIDENCE: u32 = 100;
const NO_DATA_CONFIDENCE: u32 = 30;

const NO_TABULAR_PLACEHOLDER: &str = "No production data available";
const NO_GRAPH_PLACEHOLDER: &str = "No asset relationship data available";
const NO_DOCUMENT_PLACEHOLDER: &str = "No HSE reports available";

/// Synthesis strategy, fixed for the lifetime of the process.
#[derive(Clone)]
pub enum SynthesisStrategy {
    RuleBased,
    Generative(Arc<dyn LlmBackend>),
}

impl std::fmt::Debug for SynthesisStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RuleBased => write!(f, "RuleBased"),
            Self::Generative(b) => write!(f, "Generative({})", b.backend_name()),
        }
    }
}

/// Inputs to one synthesis call. `None` means the retriever was not run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SynthesisInputs<'a> {
    pub tabular: Option<&'a RecordBatch>,
    pub graph: Option<&'a RecordBatch>,
    pub document: Option<&'a RecordBatch>,
}

impl SynthesisInputs<'_> {
    fn non_empty(batch: Option<&RecordBatch>) -> Option<&RecordBatch> {
        batch.filter(|b| !b.is_empty())
    }

    /// Number of result lists with at least one record.
    pub fn non_empty_count(&self) -> u32 {
        let count = [self.tabular, self.graph, self.document]
            .into_iter()
            .filter(|b| Self::non_empty(*b).is_some())
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Clone)]
pub struct Synthesizer {
    strategy: SynthesisStrategy,
}

impl Synthesizer {
    pub fn new(strategy: SynthesisStrategy) -> Self {
        Self { strategy }
    }

    pub fn rule_based() -> Self {
        Self::new(SynthesisStrategy::RuleBased)
    }

    /// Strategy from the startup probe result.
    pub fn from_probe(backend: Option<Arc<dyn LlmBackend>>) -> Self {
        match backend {
            Some(b) => Self::new(SynthesisStrategy::Generative(b)),
            None => Self::rule_based(),
        }
    }

    /// Method this synthesizer attempts first.
    pub fn preferred_method(&self) -> SynthesisMethod {
        match self.strategy {
            SynthesisStrategy::RuleBased => SynthesisMethod::RuleBased,
            SynthesisStrategy::Generative(_) => SynthesisMethod::Generative,
        }
    }

    pub async fn synthesize(&self, query: &str, inputs: SynthesisInputs<'_>) -> SynthesisResult {
        info!(
            strategy = %self.preferred_method(),
            non_empty = inputs.non_empty_count(),
            "Synthesizing results"
        );

        match &self.strategy {
            SynthesisStrategy::RuleBased => rule_based_answer(inputs),
            SynthesisStrategy::Generative(backend) => {
                let supporting_data = prepare_context(inputs);
                let prompt = build_prompt(query, &supporting_data);
                match backend.generate(&prompt).await {
                    Ok(answer) => SynthesisResult {
                        answer,
                        confidence: GENERATIVE_CONFIDENCE,
                        method: SynthesisMethod::Generative,
                        supporting_data,
                    },
                    Err(e) => {
                        warn!(
                            backend = backend.backend_name(),
                            error = %e,
                            "Generative synthesis failed, falling back to rule-based"
                        );
                        rule_based_answer(inputs)
                    }
                }
            }
        }
    }
}

// ============================================================================
// Rule-based strategy
// ============================================================================

/// Formulaic summary of whatever data is present.
pub fn rule_based_answer(inputs: SynthesisInputs<'_>) -> SynthesisResult {
    let mut parts = Vec::new();
    let mut confidence = RULE_BASE_CONFIDENCE;

    if let Some(batch) = SynthesisInputs::non_empty(inputs.tabular) {
        parts.push(format!(
            "Production data shows {} records with relevant metrics.",
            batch.len()
        ));
        confidence += RULE_STEP_CONFIDENCE;
    }

    if let Some(batch) = SynthesisInputs::non_empty(inputs.graph) {
        parts.push(format!(
            "Asset analysis identified {} related equipment items.",
            batch.len()
        ));
        confidence += RULE_STEP_CONFIDENCE;
    }

    if let Some(batch) = SynthesisInputs::non_empty(inputs.document) {
        parts.push(format!("HSE reports contain {} relevant documents.", batch.len()));
        confidence += RULE_STEP_CONFIDENCE;
    }

    let (answer, confidence) = if parts.is_empty() {
        (NO_DATA_ANSWER.to_string(), NO_DATA_CONFIDENCE)
    } else {
        (parts.join(" "), confidence.min(RULE_MAX_CONFIDENCE))
    };

    SynthesisResult {
        answer,
        confidence: f64::from(confidence) / 100.0,
        method: SynthesisMethod::RuleBased,
        supporting_data: SupportingData {
            tabular: raw_snapshot(inputs.tabular),
            graph: raw_snapshot(inputs.graph),
            document: raw_snapshot(inputs.document),
        },
    }
}

fn raw_snapshot(batch: Option<&RecordBatch>) -> SnapshotEntry {
    SnapshotEntry::Records(batch.map(|b| b.records.clone()).unwrap_or_default())
}

// ============================================================================
// Generative strategy
// ============================================================================

fn render(batch: Option<&RecordBatch>, placeholder: &str) -> SnapshotEntry {
    match SynthesisInputs::non_empty(batch) {
        Some(b) => SnapshotEntry::Rendered(
            b.records
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        None => SnapshotEntry::Rendered(placeholder.to_string()),
    }
}

/// Textual rendering of each result list, or a placeholder when empty.
pub fn prepare_context(inputs: SynthesisInputs<'_>) -> SupportingData {
    SupportingData {
        tabular: render(inputs.tabular, NO_TABULAR_PLACEHOLDER),
        graph: render(inputs.graph, NO_GRAPH_PLACEHOLDER),
        document: render(inputs.document, NO_DOCUMENT_PLACEHOLDER),
    }
}

fn section(entry: &SnapshotEntry) -> String {
    match entry {
        SnapshotEntry::Rendered(text) => text.clone(),
        SnapshotEntry::Records(records) => records
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn build_prompt(query: &str, context: &SupportingData) -> String {
    format!(
        "Based on the following data, answer this question: {query}\n\n\
         Production Data:\n{}\n\n\
         Asset Relationships:\n{}\n\n\
         HSE Reports:\n{}\n\n\
         Provide a clear, concise answer with specific data points and confidence level.",
        section(&context.tabular),
        section(&context.graph),
        section(&context.document),
    )
}
