//! Resume optimization: rewrites extracted resume text into a markup document.

use std::sync::Arc;

use tracing::warn;

use crate::analysis::prompts::{
    EXPAND_PROMPT_TEMPLATE, EXPAND_SYSTEM, OPTIMIZE_PROMPT_TEMPLATE, OPTIMIZE_SYSTEM,
};
use crate::extraction::split_text;
use crate::llm_client::prompts::{fill_template, CREATIVE_TEMPERATURE, MARKUP_ONLY_INSTRUCTION};
use crate::llm_client::Completer;

/// Chunk bound for per-chunk rewriting.
pub const OPTIMIZE_CHUNK_CHARS: usize = 3000;

pub const DOCUMENT_OPEN: &str = "<html><head><meta charset='UTF-8'/><style>\
    body { font-family: Helvetica, sans-serif; font-size: 11pt; } \
    h1 { font-size: 20pt; } h2 { font-size: 14pt; }\
    </style></head><body>";

pub const DOCUMENT_CLOSE: &str = "</body></html>";

#[derive(Clone)]
pub struct ResumeOptimizer {
    completer: Arc<dyn Completer>,
}

impl ResumeOptimizer {
    pub fn new(completer: Arc<dyn Completer>) -> Self {
        Self { completer }
    }

    /// Rewrites the resume chunk by chunk and wraps the fragments, in chunk order, in a single
    /// document envelope. A chunk whose call degrades contributes an empty fragment.
    pub async fn optimize(&self, resume_text: &str) -> String {
        let chunks = split_text(resume_text, OPTIMIZE_CHUNK_CHARS);
        let mut html = String::from(DOCUMENT_OPEN);

        for (i, chunk) in chunks.iter().enumerate() {
            let prompt = OPTIMIZE_PROMPT_TEMPLATE.replace("{chunk}", chunk);
            let fragment = self
                .completer
                .complete(OPTIMIZE_SYSTEM, &prompt, CREATIVE_TEMPERATURE)
                .await;

            if fragment.is_empty() {
                warn!(
                    "Optimization of chunk {}/{} returned no markup, continuing without it",
                    i + 1,
                    chunks.len()
                );
            }
            html.push_str(strip_markup_fences(&fragment));
        }

        html.push_str(DOCUMENT_CLOSE);
        html
    }

    /// Single-call rewrite that covers the given skill gaps. Returns one full document
    /// (empty if the call degraded).
    pub async fn expand_for_weaknesses(&self, resume_text: &str, missing_skills: &[String]) -> String {
        let missing_skills = missing_skills.join(", ");
        let prompt = fill_template(
            EXPAND_PROMPT_TEMPLATE,
            &[
                ("missing_skills", missing_skills.as_str()),
                ("markup_only", MARKUP_ONLY_INSTRUCTION),
                ("resume_text", resume_text),
            ],
        );

        let html = self
            .completer
            .complete(EXPAND_SYSTEM, &prompt, CREATIVE_TEMPERATURE)
            .await;

        if html.is_empty() {
            warn!("Weakness-driven rewrite returned no markup");
        }
        strip_markup_fences(&html).to_string()
    }
}

/// Strips ```html / ```xhtml / ``` fences that models sometimes wrap markup in.
fn strip_markup_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest
        .strip_prefix("xhtml")
        .or_else(|| rest.strip_prefix("html"))
        .unwrap_or(rest)
        .trim_start();
    rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
}
