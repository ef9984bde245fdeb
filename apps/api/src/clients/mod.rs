//! Contracts for the collaborators the ingestion pipeline depends on, plus their HTTP/S3 adapters.
//!
//! `AppState` and the coordinator hold these as `Arc<dyn ...>` so tests can swap in stubs.

pub mod analytics;
pub mod identity;
pub mod object_store;
pub mod search;

use std::time::Duration;

use async_trait::async_trait;

pub use analytics::{AnalyticsEvent, HttpAnalyticsSink};
pub use identity::{HttpIdentityResolver, IdentityError};
pub use object_store::S3ObjectStore;
pub use search::{ElasticsearchIndex, ResumeDocument};

/// Resolves a bearer credential to the owning user's id.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_user_id(&self, credential: &str) -> Result<i64, IdentityError>;
}

/// Binary object storage for rendered artifacts.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, object_id: &str, bytes: Vec<u8>, content_type: &str) -> anyhow::Result<()>;

    /// Time-limited download link for an object.
    async fn access_link(&self, object_id: &str, ttl: Duration) -> anyhow::Result<String>;

    async fn delete(&self, object_id: &str) -> anyhow::Result<()>;

    /// Canonical (unsigned) location of an object.
    fn object_url(&self, object_id: &str) -> String;
}

/// Full-text index over resume content.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn upsert(&self, document: &ResumeDocument) -> anyhow::Result<()>;

    async fn query(&self, keyword: &str) -> anyhow::Result<Vec<ResumeDocument>>;

    async fn delete_by_id(&self, id: &str) -> anyhow::Result<()>;
}

/// Receiver of ingestion analytics events.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn emit(&self, event: &AnalyticsEvent) -> anyhow::Result<()>;
}
