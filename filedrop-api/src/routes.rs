//! API route configuration.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Files
        .route("/api/v1/files", post(handlers::register_file))
        .route("/api/v1/files/lookup", get(handlers::lookup_file))
        .route("/api/v1/files/search", get(handlers::search_files))
        .route("/api/v1/inline", get(handlers::inline_query))

        // Subscriptions
        .route(
            "/api/v1/subscriptions/:chat_id",
            get(handlers::get_subscription)
                .put(handlers::set_subscription)
                .delete(handlers::clear_subscription),
        )

        .route("/api/v1/stats", get(handlers::get_stats))

        .with_state(state)
}
