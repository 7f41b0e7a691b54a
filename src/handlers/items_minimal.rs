//! Minimal item index
//!
//! Clients keep a local `name -> icon` table and poll `/last` to decide
//! whether to fetch `/diff` since their newest entry.

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::debug;

use crate::error::AppError;
use crate::models::item::{
    ItemsMinimalDiffQuery, ItemsMinimalDiffResponse, ItemsMinimalLastResponse,
    ItemsMinimalResponse, MinimalItemEntry,
};
use crate::AppState;

/// GET /api/v1/items-minimal
pub async fn get_items_minimal(
    State(state): State<AppState>,
) -> Result<Json<ItemsMinimalResponse>, AppError> {
    let last_item = last_added_at(&state).await?;
    let items = state.catalog.minimal_items(None).await?;

    Ok(Json(ItemsMinimalResponse {
        last_item,
        items: items.into_iter().map(MinimalItemEntry::from).collect(),
    }))
}

/// GET /api/v1/items-minimal/last
pub async fn get_items_minimal_last(
    State(state): State<AppState>,
) -> Result<Json<ItemsMinimalLastResponse>, AppError> {
    let last_item = last_added_at(&state).await?;
    Ok(Json(ItemsMinimalLastResponse { last_item }))
}

/// GET /api/v1/items-minimal/diff?last_item=...
pub async fn get_items_minimal_diff(
    State(state): State<AppState>,
    Query(query): Query<ItemsMinimalDiffQuery>,
) -> Result<Json<ItemsMinimalDiffResponse>, AppError> {
    let from = query.since().map_err(AppError::BadRequest)?;

    let items = state.catalog.minimal_items(Some(from)).await?;
    let to = match state.catalog.last_added_at().await? {
        Some(last) if last > from => last,
        _ => from,
    };

    debug!(%from, %to, count = items.len(), "Minimal item diff");

    Ok(Json(ItemsMinimalDiffResponse {
        from,
        to,
        items: items.into_iter().map(MinimalItemEntry::from).collect(),
    }))
}

async fn last_added_at(state: &AppState) -> Result<chrono::NaiveDateTime, AppError> {
    state
        .catalog
        .last_added_at()
        .await?
        .ok_or_else(|| AppError::NotFound("No items found".to_string()))
}
