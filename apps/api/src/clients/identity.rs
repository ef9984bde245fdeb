use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use super::IdentityResolver;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity service unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity service rejected the credential (status {0})")]
    Rejected(u16),

    #[error("identity response has no usable user id")]
    MissingId,
}

/// Resolves users through the user service's `/api/users/me` endpoint.
#[derive(Clone)]
pub struct HttpIdentityResolver {
    client: Client,
    base_url: String,
}

impl HttpIdentityResolver {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl IdentityResolver for HttpIdentityResolver {
    async fn resolve_user_id(&self, credential: &str) -> Result<i64, IdentityError> {
        let response = self
            .client
            .get(format!("{}/api/users/me", self.base_url))
            .bearer_auth(credential)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(IdentityError::Rejected(status.as_u16()));
        }

        let body: Value = response.json().await?;
        match body.get("id") {
            Some(Value::Number(n)) => n.as_i64().ok_or(IdentityError::MissingId),
            Some(Value::String(s)) => s.trim().parse().map_err(|_| IdentityError::MissingId),
            _ => Err(IdentityError::MissingId),
        }
    }
}
