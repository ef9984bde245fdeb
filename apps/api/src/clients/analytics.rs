use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::AnalyticsSink;
use crate::analysis::MatchAssessment;

/// Payload sent to the analytics service after a scored ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub user_id: i64,
    pub resume_id: i64,
    pub filename: String,
    pub weak_skills: Vec<String>,
    pub strong_skills: Vec<String>,
    pub weak_skills_count: usize,
    pub good_skills_count: usize,
    pub match_score: u8,
    pub job_description: String,
    pub uploaded_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn from_assessment(
        user_id: i64,
        resume_id: i64,
        filename: &str,
        job_description: &str,
        uploaded_at: DateTime<Utc>,
        assessment: &MatchAssessment,
    ) -> Self {
        Self {
            user_id,
            resume_id,
            filename: filename.to_string(),
            weak_skills: assessment.weaknesses.clone(),
            strong_skills: assessment.strengths.clone(),
            weak_skills_count: assessment.weaknesses.len(),
            good_skills_count: assessment.strengths.len(),
            match_score: assessment.match_score_percent,
            job_description: job_description.to_string(),
            uploaded_at,
        }
    }
}

#[derive(Clone)]
pub struct HttpAnalyticsSink {
    client: Client,
    url: String,
}

impl HttpAnalyticsSink {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/analytics", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl AnalyticsSink for HttpAnalyticsSink {
    async fn emit(&self, event: &AnalyticsEvent) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .json(event)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event() -> AnalyticsEvent {
        AnalyticsEvent::from_assessment(
            3,
            17,
            "jane.pdf",
            "Senior backend engineer, Go, Kubernetes",
            Utc::now(),
            &MatchAssessment {
                match_score_percent: 72,
                summary: String::new(),
                strengths: vec!["Go".to_string()],
                weaknesses: vec!["Kubernetes".to_string()],
            },
        )
    }

    #[test]
    fn test_counts_follow_assessment() {
        let e = event();
        assert_eq!(e.weak_skills_count, 1);
        assert_eq!(e.good_skills_count, 1);
        assert_eq!(e.match_score, 72);
    }

    #[tokio::test]
    async fn test_emit_posts_camel_case_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analytics"))
            .and(body_partial_json(json!({
                "userId": 3,
                "resumeId": 17,
                "weakSkills": ["Kubernetes"],
                "strongSkills": ["Go"],
                "weakSkillsCount": 1,
                "goodSkillsCount": 1,
                "matchScore": 72
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        HttpAnalyticsSink::new(Client::new(), &server.uri())
            .emit(&event())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_emit_surfaces_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = HttpAnalyticsSink::new(Client::new(), &server.uri())
            .emit(&event())
            .await;
        assert!(result.is_err());
    }
}
