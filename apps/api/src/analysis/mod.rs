//! AI components built on the [`Completer`](crate::llm_client::Completer) seam.
//!
//! Each component only produces completion text; parsing lives next to it as a free function so
//! callers decide how to degrade.

pub mod match_evaluator;
pub mod optimizer;
pub mod prompts;
pub mod structured;

pub use match_evaluator::{parse_match_assessment, MatchAssessment, MatchEvaluator};
pub use optimizer::ResumeOptimizer;
pub use structured::{
    parse_structured_entities, EntityField, StructuredDataExtractor, StructuredEntities,
};
