mod analysis;
mod clients;
mod config;
mod db;
mod errors;
mod extraction;
mod ingestion;
mod llm_client;
mod models;
mod render;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::clients::{ElasticsearchIndex, HttpAnalyticsSink, HttpIdentityResolver, S3ObjectStore};
use crate::config::Config;
use crate::db::create_pool;
use crate::ingestion::{
    spawn_failure_logger, BackgroundTasks, Collaborators, IngestionCoordinator, ResumeLibrary,
};
use crate::llm_client::PromptClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgResumeStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL (migrations run on connect)
    let db = create_pool(&config.database_url).await?;

    // S3 / MinIO
    let objects = S3ObjectStore::connect(&config.storage).await;
    info!("S3 client initialized (bucket: {})", config.storage.bucket);

    // Completion endpoint
    let completer = PromptClient::new(&config.llm)?;
    info!(
        "LLM client initialized (deployment: {}, max retries: {})",
        config.llm.deployment, config.llm.max_retries
    );

    // Plain HTTP collaborators share one connection pool
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let services = Collaborators {
        identity: Arc::new(HttpIdentityResolver::new(http.clone(), &config.user_service_url)),
        store: Arc::new(PgResumeStore::new(db)),
        objects: Arc::new(objects),
        search: Arc::new(ElasticsearchIndex::new(http.clone(), &config.search)),
        analytics: Arc::new(HttpAnalyticsSink::new(http, &config.analytics_service_url)),
    };

    let (tasks, failures) = BackgroundTasks::new();
    spawn_failure_logger(failures);

    let state = AppState {
        coordinator: Arc::new(IngestionCoordinator::new(
            Arc::new(completer),
            services.clone(),
            tasks,
            config.download_link_ttl,
        )),
        library: Arc::new(ResumeLibrary::new(services, config.download_link_ttl)),
    };

    let app = build_router(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
