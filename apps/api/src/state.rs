use std::sync::Arc;

use crate::ingestion::{IngestionCoordinator, ResumeLibrary};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<IngestionCoordinator>,
    pub library: Arc<ResumeLibrary>,
}
