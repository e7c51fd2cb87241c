use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{HistoryRef, RecommendationCandidate, RecommendationRequest},
    routes::AppState,
    services::recommendations,
};

/// Handler for recommendations endpoint
///
/// The caller sends its own reading history; nothing is read from storage.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Vec<RecommendationCandidate>>> {
    let limit = state.resolve_limit(request.limit)?;

    tracing::info!(
        request_id = %request_id,
        history = request.reading_history.len(),
        exclude = request.exclude_ids.len(),
        limit,
        "Processing recommendation request"
    );

    let recommendations = recommendations::get_recommendations(
        state.catalog.as_ref(),
        &request.reading_history,
        &request.exclude_ids,
        limit,
    )
    .await;

    Ok(Json(recommendations))
}

#[derive(Debug, Deserialize)]
pub struct SessionRecommendationQuery {
    limit: Option<usize>,
    /// Comma-separated article ids
    exclude: Option<String>,
}

/// Handler for recommendations driven by a session's stored reading history
pub async fn recommend_for_session(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(session_id): Path<String>,
    Query(params): Query<SessionRecommendationQuery>,
) -> AppResult<Json<Vec<RecommendationCandidate>>> {
    let limit = state.resolve_limit(params.limit)?;
    let exclude_ids = parse_id_list(params.exclude.as_deref());

    let mut history = state.reading_history(&session_id)?;
    history.load().await;
    let refs: Vec<HistoryRef> = history.entries().iter().map(HistoryRef::from).collect();

    tracing::info!(
        request_id = %request_id,
        session_id = %session_id,
        history = refs.len(),
        exclude = exclude_ids.len(),
        limit,
        "Processing session recommendation request"
    );

    let recommendations = recommendations::get_recommendations(
        state.catalog.as_ref(),
        &refs,
        &exclude_ids,
        limit,
    )
    .await;

    Ok(Json(recommendations))
}

fn parse_id_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
