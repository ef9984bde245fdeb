use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::SearchIndex;
use crate::config::SearchConfig;

/// Search index entry for one resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    pub id: String,
    pub filename: String,
    pub file_type: String,
    pub content: String,
    pub url: String,
    pub uploaded_at: i64, // epoch millis
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: ResumeDocument,
}

/// Elasticsearch-compatible REST index.
#[derive(Clone)]
pub struct ElasticsearchIndex {
    client: Client,
    base_url: String,
    index: String,
}

impl ElasticsearchIndex {
    pub fn new(client: Client, config: &SearchConfig) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            index: config.index.clone(),
        }
    }

    fn doc_url(&self, id: &str) -> String {
        format!("{}/{}/_doc/{}", self.base_url, self.index, id)
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn upsert(&self, document: &ResumeDocument) -> anyhow::Result<()> {
        self.client
            .put(self.doc_url(&document.id))
            .json(document)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn query(&self, keyword: &str) -> anyhow::Result<Vec<ResumeDocument>> {
        let body = json!({
            "query": {
                "match": {
                    "content": { "query": keyword, "operator": "and" }
                }
            }
        });

        let response: SearchResponse = self
            .client
            .post(format!("{}/{}/_search", self.base_url, self.index))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.hits.hits.into_iter().map(|h| h.source).collect())
    }

    async fn delete_by_id(&self, id: &str) -> anyhow::Result<()> {
        let response = self.client.delete(self.doc_url(id)).send().await?;
        // Already gone is fine
        if response.status() != StatusCode::NOT_FOUND {
            response.error_for_status()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn index_for(server: &MockServer) -> ElasticsearchIndex {
        ElasticsearchIndex::new(
            Client::new(),
            &SearchConfig {
                url: server.uri(),
                index: "resumes".to_string(),
            },
        )
    }

    fn sample() -> ResumeDocument {
        ResumeDocument {
            id: "17".to_string(),
            filename: "jane.pdf".to_string(),
            file_type: "PDF".to_string(),
            content: "Jane Doe Rust engineer".to_string(),
            url: "http://minio:9000/resumes/optimized-x-jane.pdf".to_string(),
            uploaded_at: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn test_upsert_puts_camel_case_document() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/resumes/_doc/17"))
            .and(body_partial_json(json!({"fileType": "PDF", "uploadedAt": 1_700_000_000_000i64})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        index_for(&server).upsert(&sample()).await.unwrap();
    }

    #[tokio::test]
    async fn test_query_returns_sources() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/resumes/_search"))
            .and(body_partial_json(json!({
                "query": {"match": {"content": {"query": "rust", "operator": "and"}}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": {"hits": [{"_id": "17", "_source": sample()}]}
            })))
            .mount(&server)
            .await;

        let docs = index_for(&server).query("rust").await.unwrap();
        assert_eq!(docs, vec![sample()]);
    }

    #[tokio::test]
    async fn test_upsert_failure_is_error_and_missing_delete_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let index = index_for(&server);
        assert!(index.upsert(&sample()).await.is_err());
        assert!(index.delete_by_id("17").await.is_ok());
    }
}
