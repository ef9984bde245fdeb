pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::ingestion::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/resumes/upload", post(handlers::handle_upload))
        .route("/api/resumes/compare-resumes", post(handlers::handle_compare))
        .route("/api/resumes/user", get(handlers::handle_list_user_resumes))
        .route("/api/resumes/search", get(handlers::handle_search))
        .route("/api/resumes/:id/download", get(handlers::handle_download))
        .route("/api/resumes/:id", delete(handlers::handle_delete))
        .with_state(state)
}
