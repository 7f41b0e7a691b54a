//! Snapshot Handlers
//!
//! Order books addressed directly by snapshot id. Snapshots never change
//! once written, so assembled books are cached by id when caching is on.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::order_book::OrderBook;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotExistsResponse {
    pub snapshot_id: i64,
    pub exists: bool,
}

/// GET /api/v1/snapshots/{snapshot_id}
pub async fn get_snapshot_order_book(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<OrderBook>, AppError> {
    let snapshot_id = parse_snapshot_id(&raw_id)?;

    if let Some(cache) = &state.order_book_cache {
        if let Some(book) = cache.get(&snapshot_id).await {
            debug!(snapshot_id, "Order book cache hit");
            return Ok(Json(book.as_ref().clone()));
        }
    }

    let Some(book) = state.order_books.for_snapshot(snapshot_id).await? else {
        info!(snapshot_id, "Snapshot not found");
        return Err(AppError::NotFound("Snapshot not found".to_string()));
    };

    if let Some(cache) = &state.order_book_cache {
        cache.insert(snapshot_id, Arc::new(book.clone())).await;
    }

    Ok(Json(book))
}

/// GET /api/v1/snapshots/{snapshot_id}/exists
pub async fn get_snapshot_exists(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<SnapshotExistsResponse>, AppError> {
    let snapshot_id = parse_snapshot_id(&raw_id)?;
    let exists = state.snapshots.snapshot_exists(snapshot_id).await?;

    Ok(Json(SnapshotExistsResponse {
        snapshot_id,
        exists,
    }))
}

fn parse_snapshot_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest("Invalid snapshot_id".to_string()))
}
