//! API route handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{debug, info};

use filedrop_core::types::SubscriberId;
use filedrop_search::InlineAnswer;

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

// ═══════════════════════════════════════════════════════════════════════════
// Files
// ═══════════════════════════════════════════════════════════════════════════

/// POST /api/v1/files
pub async fn register_file(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterFileRequest>,
) -> Result<Json<RegisterFileResponse>> {
    let registration = state
        .service
        .register(req.sender_id, &req.file_id, &req.file_name)
        .await?;

    info!(
        name = %registration.entry.name,
        notify = registration.notify.len(),
        "Registered file via API"
    );

    Ok(Json(RegisterFileResponse {
        file: FileDto::from(registration.entry),
        notify: registration.notify,
    }))
}

/// GET /api/v1/files/lookup?q=
pub async fn lookup_file(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupQuery>,
) -> Result<Json<FileDto>> {
    state
        .service
        .lookup(&params.q)
        .map(|entry| Json(FileDto::from(entry)))
        .ok_or_else(|| ApiError::not_found(format!("No file matches {:?}", params.q)))
}

/// GET /api/v1/files/search?q=&private=
pub async fn search_files(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    let names = state.service.search(&params.q, params.private)?;

    debug!(pattern = %params.q, count = names.len(), "Search via API");

    Ok(Json(SearchResponse {
        count: names.len(),
        names,
    }))
}

/// GET /api/v1/inline?query_id=&q=&offset=
pub async fn inline_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InlineParams>,
) -> Result<Json<InlineAnswer>> {
    let answer = state
        .service
        .inline(&params.query_id, &params.q, params.offset.as_deref())?;
    Ok(Json(answer))
}

// ═══════════════════════════════════════════════════════════════════════════
// Subscriptions
// ═══════════════════════════════════════════════════════════════════════════

/// GET /api/v1/subscriptions/:chat_id
pub async fn get_subscription(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<SubscriberId>,
) -> Result<Json<SubscriptionResponse>> {
    let pattern = state.service.subscriptions().get(chat_id)?;
    Ok(Json(SubscriptionResponse { chat_id, pattern }))
}

/// PUT /api/v1/subscriptions/:chat_id
pub async fn set_subscription(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<SubscriberId>,
    Json(req): Json<SetSubscriptionRequest>,
) -> Result<Json<SubscriptionReplyResponse>> {
    let reply = state.service.set_subscription(chat_id, &req.pattern).await?;
    Ok(Json(SubscriptionReplyResponse { reply }))
}

/// DELETE /api/v1/subscriptions/:chat_id
pub async fn clear_subscription(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<SubscriberId>,
) -> Result<Json<ClearSubscriptionResponse>> {
    let removed = state.service.clear_subscription(chat_id).await?;
    Ok(Json(ClearSubscriptionResponse { removed }))
}

// ═══════════════════════════════════════════════════════════════════════════
// Status
// ═══════════════════════════════════════════════════════════════════════════

/// GET /api/v1/stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.service.stats()))
}

static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let start = START_TIME.get_or_init(Instant::now);

    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: start.elapsed().as_secs(),
        files_count: state.service.files().len() as u64,
    })
}
