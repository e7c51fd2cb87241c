use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{HistoryEntry, HistoryEntryInput},
    routes::AppState,
};

/// Current reading history of a session, most recent first
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let mut history = state.reading_history(&session_id)?;
    history.load().await;
    Ok(Json(history.into_entries()))
}

/// Records an article view
pub async fn add(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(input): Json<HistoryEntryInput>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let mut history = state.reading_history(&session_id)?;
    history.load().await;
    history.add(input).await;

    tracing::debug!(session_id = %session_id, entries = history.len(), "History entry recorded");

    Ok(Json(history.into_entries()))
}

/// Removes one article from the history
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path((session_id, article_id)): Path<(String, String)>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let mut history = state.reading_history(&session_id)?;
    history.load().await;
    history.remove(&article_id).await;
    Ok(Json(history.into_entries()))
}

/// Deletes the whole history
pub async fn clear(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> AppResult<StatusCode> {
    let mut history = state.reading_history(&session_id)?;
    history.clear().await;

    tracing::info!(session_id = %session_id, "Reading history cleared");

    Ok(StatusCode::NO_CONTENT)
}
