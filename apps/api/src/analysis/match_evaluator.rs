//! Match evaluation: scores a resume against a job description, and compares two resumes.
//!
//! The evaluator only produces completion text. Parsing is a separate step so the coordinator
//! can decide how to degrade when the model returns something unusable.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::analysis::prompts::{
    COMPARE_PROMPT_TEMPLATE, COMPARE_SYSTEM, MATCH_PROMPT_TEMPLATE, MATCH_SYSTEM,
    NO_JOB_DESCRIPTION,
};
use crate::llm_client::prompts::{fill_template, CREATIVE_TEMPERATURE, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{strip_json_fences, Completer};

/// Structured result of a resume-vs-job-description evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchAssessment {
    pub match_score_percent: u8, // 0 – 100
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Error)]
pub enum AssessmentParseError {
    #[error("completion returned no assessment")]
    Empty,

    #[error("assessment is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("assessment has no match_score")]
    MissingScore,

    #[error("match_score {0} is not a whole percentage")]
    InvalidScore(String),
}

#[derive(Debug, Deserialize)]
struct RawAssessment {
    match_score: Option<Value>,
    summary: Option<String>,
    strengths: Option<Vec<String>>,
    weaknesses: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct MatchEvaluator {
    completer: Arc<dyn Completer>,
}

impl MatchEvaluator {
    pub fn new(completer: Arc<dyn Completer>) -> Self {
        Self { completer }
    }

    /// Returns the model's JSON assessment text (possibly empty). Parse with
    /// [`parse_match_assessment`].
    pub async fn evaluate_match(&self, resume_text: &str, job_description: &str) -> String {
        let prompt = fill_template(
            MATCH_PROMPT_TEMPLATE,
            &[
                ("resume_text", resume_text),
                ("job_description", job_description),
                ("json_only", JSON_ONLY_INSTRUCTION),
            ],
        );

        self.completer
            .complete(MATCH_SYSTEM, &prompt, CREATIVE_TEMPERATURE)
            .await
    }

    /// Returns the model's two-sided comparison JSON text (possibly empty).
    pub async fn compare_two_resumes(
        &self,
        resume_a: &str,
        resume_b: &str,
        job_description: Option<&str>,
    ) -> String {
        let job_description = job_description
            .filter(|jd| !jd.trim().is_empty())
            .unwrap_or(NO_JOB_DESCRIPTION);

        let prompt = fill_template(
            COMPARE_PROMPT_TEMPLATE,
            &[
                ("resume_a", resume_a),
                ("resume_b", resume_b),
                ("job_description", job_description),
                ("json_only", JSON_ONLY_INSTRUCTION),
            ],
        );

        self.completer
            .complete(COMPARE_SYSTEM, &prompt, CREATIVE_TEMPERATURE)
            .await
    }
}

/// Parses assessment JSON. `match_score` must be a string of the form `"NN%"` (or `"NN"`)
/// with NN in 0–100; bare JSON numbers and decimals are rejected.
pub fn parse_match_assessment(text: &str) -> Result<MatchAssessment, AssessmentParseError> {
    let text = strip_json_fences(text);
    if text.is_empty() {
        return Err(AssessmentParseError::Empty);
    }

    let raw: RawAssessment = serde_json::from_str(text)?;
    let match_score_percent = match raw.match_score {
        None | Some(Value::Null) => return Err(AssessmentParseError::MissingScore),
        Some(Value::String(s)) => parse_score_percent(&s)?,
        Some(other) => return Err(AssessmentParseError::InvalidScore(other.to_string())),
    };

    Ok(MatchAssessment {
        match_score_percent,
        summary: raw.summary.unwrap_or_default(),
        strengths: raw.strengths.unwrap_or_default(),
        weaknesses: raw.weaknesses.unwrap_or_default(),
    })
}

fn parse_score_percent(score: &str) -> Result<u8, AssessmentParseError> {
    let trimmed = score.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AssessmentParseError::InvalidScore(format!("{score:?}")));
    }
    digits
        .parse::<u8>()
        .ok()
        .filter(|n| *n <= 100)
        .ok_or_else(|| AssessmentParseError::InvalidScore(format!("{score:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedCompleter;

    const CANNED: &str = r#"{
        "match_score": "72%",
        "summary": "Solid Go background, no orchestration experience.",
        "strengths": ["Go"],
        "weaknesses": ["Kubernetes"]
    }"#;

    #[tokio::test]
    async fn test_evaluate_match_with_stub_yields_exact_assessment() {
        let stub = Arc::new(ScriptedCompleter::new(CANNED));
        let evaluator = MatchEvaluator::new(stub.clone());

        let text = evaluator
            .evaluate_match("Go developer", "Senior backend engineer, Go, Kubernetes")
            .await;
        let assessment = parse_match_assessment(&text).unwrap();

        assert_eq!(assessment.match_score_percent, 72);
        assert_eq!(assessment.strengths, vec!["Go"]);
        assert_eq!(assessment.weaknesses, vec!["Kubernetes"]);

        let calls = stub.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system_role, MATCH_SYSTEM);
        assert!(calls[0].user_prompt.contains("Go developer"));
        assert!(calls[0]
            .user_prompt
            .contains("Senior backend engineer, Go, Kubernetes"));
    }

    #[tokio::test]
    async fn test_compare_substitutes_none_for_missing_job_description() {
        let stub = Arc::new(ScriptedCompleter::new(r#"{"recommendation": "Resume 1"}"#));
        let evaluator = MatchEvaluator::new(stub.clone());

        let out = evaluator.compare_two_resumes("resume A", "resume B", None).await;
        assert_eq!(out, r#"{"recommendation": "Resume 1"}"#);

        let prompt = &stub.calls()[0].user_prompt;
        assert!(prompt.contains("Resume 1:\nresume A"));
        assert!(prompt.contains("Resume 2:\nresume B"));
        assert!(prompt.contains("Job Description:\nNone"));
    }

    #[tokio::test]
    async fn test_compare_passes_job_description_through() {
        let stub = Arc::new(ScriptedCompleter::new("{}"));
        let evaluator = MatchEvaluator::new(stub.clone());

        evaluator
            .compare_two_resumes("a", "b", Some("Rust engineer"))
            .await;
        assert!(stub.calls()[0]
            .user_prompt
            .contains("Job Description:\nRust engineer"));
    }

    #[test]
    fn test_percent_string_parses_to_integer() {
        let a = parse_match_assessment(r#"{"match_score": "85%"}"#).unwrap();
        assert_eq!(a.match_score_percent, 85);
        assert!(a.strengths.is_empty());
        assert!(a.weaknesses.is_empty());
    }

    #[test]
    fn test_score_without_percent_sign_is_accepted() {
        let a = parse_match_assessment(r#"{"match_score": " 40 "}"#).unwrap();
        assert_eq!(a.match_score_percent, 40);
    }

    #[test]
    fn test_non_numeric_score_is_parse_failure() {
        let err = parse_match_assessment(r#"{"match_score": "N/A"}"#).unwrap_err();
        assert!(matches!(err, AssessmentParseError::InvalidScore(_)));
    }

    #[test]
    fn test_bare_number_and_decimal_scores_are_rejected() {
        assert!(matches!(
            parse_match_assessment(r#"{"match_score": 85}"#),
            Err(AssessmentParseError::InvalidScore(_))
        ));
        assert!(matches!(
            parse_match_assessment(r#"{"match_score": "85.5%"}"#),
            Err(AssessmentParseError::InvalidScore(_))
        ));
    }

    #[test]
    fn test_signed_scores_are_rejected() {
        for score in ["+72%", "-5", "+0"] {
            let json = format!(r#"{{"match_score": "{score}"}}"#);
            assert!(
                matches!(
                    parse_match_assessment(&json),
                    Err(AssessmentParseError::InvalidScore(_))
                ),
                "accepted {score}"
            );
        }
    }

    #[tokio::test]
    async fn test_placeholders_in_resume_text_are_not_expanded() {
        let stub = Arc::new(ScriptedCompleter::new("{}"));
        let evaluator = MatchEvaluator::new(stub.clone());

        evaluator
            .compare_two_resumes("see {resume_b} and {job_description}", "SECOND", Some("JD-TEXT"))
            .await;
        let prompt = &stub.calls()[0].user_prompt;
        assert!(prompt.contains("Resume 1:\nsee {resume_b} and {job_description}"));
        assert_eq!(prompt.matches("SECOND").count(), 1);
        assert_eq!(prompt.matches("JD-TEXT").count(), 1);

        evaluator.evaluate_match("skills: {job_description}", "JD-TEXT").await;
        let prompt = &stub.calls()[1].user_prompt;
        assert!(prompt.contains("skills: {job_description}"));
        assert_eq!(prompt.matches("JD-TEXT").count(), 1);
    }

    #[test]
    fn test_score_above_hundred_is_rejected() {
        assert!(matches!(
            parse_match_assessment(r#"{"match_score": "140%"}"#),
            Err(AssessmentParseError::InvalidScore(_))
        ));
    }

    #[test]
    fn test_missing_score_and_empty_text() {
        assert!(matches!(
            parse_match_assessment(r#"{"summary": "ok"}"#),
            Err(AssessmentParseError::MissingScore)
        ));
        assert!(matches!(
            parse_match_assessment(""),
            Err(AssessmentParseError::Empty)
        ));
        assert!(matches!(
            parse_match_assessment("Sure! Here is the JSON"),
            Err(AssessmentParseError::Json(_))
        ));
    }

    #[test]
    fn test_fenced_json_is_accepted() {
        let a = parse_match_assessment("```json\n{\"match_score\": \"90%\", \"weaknesses\": [\"AWS\"]}\n```")
            .unwrap();
        assert_eq!(a.match_score_percent, 90);
        assert_eq!(a.weaknesses, vec!["AWS"]);
    }
}
