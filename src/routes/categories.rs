use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{error::AppResult, models::Category, routes::AppState};

/// Handler for the category listing
pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Category>>> {
    let categories = state.catalog.categories().await?;
    Ok(Json(categories))
}
