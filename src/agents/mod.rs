//! Query pipeline agents
//!
//! ## Parse stage
//!
//! - **Intent Classifier** (`intent`): keyword rules, first match wins
//! - **Entity Extractor** (`entities`): rig/well patterns, known basins and periods
//! - **Plan Builder** (`planner`): intent + entities to an ordered step list
//! - **Query Parser** (`parser`): runs the three above in one pass
//!
//! ## Answer stage
//!
//! - **Orchestrator** (`orchestrator`): drives one query through parse,
//!   retrieval and synthesis, building the reasoning trace
//! - **Synthesizer** (`synthesizer`): generative or rule-based answer with a
//!   confidence score

pub mod entities;
pub mod intent;
pub mod orchestrator;
pub mod parser;
pub mod planner;
pub mod synthesizer;

pub use orchestrator::{OrchestrationError, Orchestrator, QueryPhase};
pub use parser::QueryParser;
pub use synthesizer::{SynthesisInputs, SynthesisStrategy, Synthesizer};
