pub mod handlers;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/profile", post(handlers::handle_extract_profile))
        .route(
            "/api/v1/recommendations",
            post(handlers::handle_recommend),
        )
        .route(
            "/api/v1/recommendations/resume",
            post(handlers::handle_recommend_resume),
        )
        .route(
            "/api/v1/corpus",
            get(handlers::handle_corpus_status).put(handlers::handle_rebuild_corpus),
        )
        .with_state(state)
}
