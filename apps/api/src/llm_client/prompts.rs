// Shared prompt constants.
// Each component that needs LLM calls defines its own prompts alongside it (see analysis::prompts).
// This file contains cross-cutting prompt fragments.

/// Appended to every JSON-producing prompt.
pub const JSON_ONLY_INSTRUCTION: &str =
    "⚠️ Only return valid JSON. Do NOT include any notes, explanations, or extra text outside the JSON.";

/// Appended to every markup-producing prompt.
pub const MARKUP_ONLY_INSTRUCTION: &str =
    "Return only the XHTML. Do NOT include any notes, explanations, or comments outside the resume content.";

/// Sampling temperature for deterministic extraction calls.
pub const EXTRACTION_TEMPERATURE: f32 = 0.0;

/// Sampling temperature for evaluation and rewriting calls.
pub const CREATIVE_TEMPERATURE: f32 = 0.7;

/// Fills `{key}` markers in one pass over the template. Substituted values are never rescanned,
/// and braces that do not name a key are kept as-is.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let hit = values.iter().find(|(key, _)| {
            tail.strip_prefix('{')
                .and_then(|t| t.strip_prefix(*key))
                .is_some_and(|t| t.starts_with('}'))
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
