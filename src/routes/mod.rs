use axum::{
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    db::{KeyValueStore, StorageKey},
    error::{AppError, AppResult},
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{ArticleCatalog, Clock, ReadingHistory, SystemClock},
};

pub mod categories;
pub mod history;
pub mod recommendations;

const MAX_SESSION_ID_LEN: usize = 128;

/// Shared handler state
pub struct AppState {
    pub catalog: Arc<dyn ArticleCatalog>,
    pub storage: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn ArticleCatalog>,
        storage: Arc<dyn KeyValueStore>,
        config: Config,
    ) -> Self {
        Self {
            catalog,
            storage,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replaces the visit clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Unloaded reading history for one browser session
    pub fn reading_history(&self, session_id: &str) -> AppResult<ReadingHistory> {
        validate_session_id(session_id)?;
        Ok(ReadingHistory::new(
            self.storage.clone(),
            self.clock.clone(),
            StorageKey::ReadingHistory(session_id.to_string()),
        ))
    }

    /// Applies the configured default and upper bound to a requested count
    pub fn resolve_limit(&self, requested: Option<usize>) -> AppResult<usize> {
        let limit = requested.unwrap_or(self.config.default_recommendations);
        if limit == 0 || limit > self.config.max_recommendations {
            return Err(AppError::InvalidInput(format!(
                "limit must be between 1 and {}",
                self.config.max_recommendations
            )));
        }
        Ok(limit)
    }
}

fn validate_session_id(session_id: &str) -> AppResult<()> {
    let valid = !session_id.is_empty()
        && session_id.len() <= MAX_SESSION_ID_LEN
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "session id must be 1-{} characters of [A-Za-z0-9_-]",
            MAX_SESSION_ID_LEN
        )))
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recommendations", post(recommendations::recommend))
        .route(
            "/recommendations/:session_id",
            get(recommendations::recommend_for_session),
        )
        .route("/categories", get(categories::list))
        .route(
            "/history/:session_id",
            get(history::list).post(history::add).delete(history::clear),
        )
        .route("/history/:session_id/:article_id", delete(history::remove))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
