//! Structured data extraction: contact details, skills, education, experience and projects,
//! one completion call per chunk.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::analysis::prompts::{STRUCTURED_PROMPT_TEMPLATE, STRUCTURED_SYSTEM};
use crate::extraction::split_text;
use crate::llm_client::prompts::EXTRACTION_TEMPERATURE;
use crate::llm_client::{strip_json_fences, Completer};

/// Chunk bound for entity extraction.
pub const STRUCTURED_CHUNK_CHARS: usize = 7000;

/// A list-or-string entity value, kept in whichever shape the model returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityField {
    List(Vec<Value>),
    Text(String),
}

impl EntityField {
    /// Column representation: lists as JSON text, strings verbatim.
    pub fn to_column(&self) -> String {
        match self {
            EntityField::List(items) => Value::Array(items.clone()).to_string(),
            EntityField::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredEntities {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Option<EntityField>,
    pub education: Option<EntityField>,
    pub work_experience: Option<EntityField>,
    pub projects: Option<EntityField>,
}

#[derive(Debug, Error)]
pub enum StructuredParseError {
    #[error("completion returned no entities")]
    Empty,

    #[error("entities are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("entities JSON is not an object")]
    NotAnObject,
}

#[derive(Clone)]
pub struct StructuredDataExtractor {
    completer: Arc<dyn Completer>,
}

impl StructuredDataExtractor {
    pub fn new(completer: Arc<dyn Completer>) -> Self {
        Self { completer }
    }

    /// Returns the model's entity JSON for one chunk (possibly empty).
    pub async fn extract(&self, chunk: &str) -> String {
        let prompt = STRUCTURED_PROMPT_TEMPLATE.replace("{chunk}", chunk);
        self.completer
            .complete(STRUCTURED_SYSTEM, &prompt, EXTRACTION_TEMPERATURE)
            .await
    }

    /// One call per chunk of `text`, results in chunk order.
    pub async fn extract_chunks(&self, text: &str) -> Vec<String> {
        let mut results = Vec::new();
        for chunk in split_text(text, STRUCTURED_CHUNK_CHARS) {
            results.push(self.extract(&chunk).await);
        }
        results
    }
}

/// Parses one chunk's entity JSON. Scalars other than strings are stringified; empty strings
/// and nulls become `None`.
pub fn parse_structured_entities(text: &str) -> Result<StructuredEntities, StructuredParseError> {
    let text = strip_json_fences(text);
    if text.is_empty() {
        return Err(StructuredParseError::Empty);
    }

    let value: Value = serde_json::from_str(text)?;
    let object = value.as_object().ok_or(StructuredParseError::NotAnObject)?;

    let text_field = |key: &str| match object.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(other) => Some(other.to_string()),
    };
    let entity_field = |key: &str| match object.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(EntityField::List(items.clone())),
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(EntityField::Text(s.clone())),
        Some(other) => Some(EntityField::Text(other.to_string())),
    };

    Ok(StructuredEntities {
        name: text_field("name"),
        email: text_field("email"),
        phone: text_field("phone"),
        skills: entity_field("skills"),
        education: entity_field("education"),
        work_experience: entity_field("work_experience"),
        projects: entity_field("projects"),
    })
}
