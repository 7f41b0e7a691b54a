//! Item Handlers
//!
//! Listing, lookup and per-item snapshot/order book endpoints. Items are
//! addressed as `/api/v1/items/{kind}/{value}` where `kind` is one of
//! `internal-id`, `item-id`, `class-id` or `name`.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::item::{
    ItemIdentifier, ItemListResponse, ItemRecord, ItemResponse, RecentItemsQuery,
};
use crate::models::order_book::{OrderBook, SnapshotSummary};
use crate::models::pagination::{ItemListQuery, PaginationInfo};
use crate::AppState;

/// GET /api/v1/items
pub async fn get_items(
    State(state): State<AppState>,
    Query(query): Query<ItemListQuery>,
) -> Result<Json<ItemListResponse>, AppError> {
    let params = query.pagination();
    let search = query.search_term();

    debug!(
        page = params.page,
        limit = params.limit,
        search = ?search,
        "Listing items"
    );

    let page = state
        .catalog
        .list_items(search, params.limit, params.offset())
        .await?;

    let items = page
        .items
        .into_iter()
        .map(|record| ItemResponse::from_record(record, &state.icon_base_url))
        .collect();

    Ok(Json(ItemListResponse {
        items,
        pagination: PaginationInfo::new(params, page.total),
    }))
}

/// GET /api/v1/items/recent
pub async fn get_recent_items(
    State(state): State<AppState>,
    Query(query): Query<RecentItemsQuery>,
) -> Result<Json<Vec<ItemResponse>>, AppError> {
    let records = state.catalog.recent_items(query.limit()).await?;

    Ok(Json(
        records
            .into_iter()
            .map(|record| ItemResponse::from_record(record, &state.icon_base_url))
            .collect(),
    ))
}

/// GET /api/v1/items/{kind}/{value}
pub async fn get_item(
    State(state): State<AppState>,
    Path((kind, value)): Path<(String, String)>,
) -> Result<Json<ItemResponse>, AppError> {
    let record = resolve(&state, &kind, &value).await?;
    Ok(Json(ItemResponse::from_record(record, &state.icon_base_url)))
}

/// GET /api/v1/items/{kind}/{value}/snapshot
pub async fn get_item_snapshot(
    State(state): State<AppState>,
    Path((kind, value)): Path<(String, String)>,
) -> Result<Json<SnapshotSummary>, AppError> {
    let record = resolve(&state, &kind, &value).await?;

    let snapshot = state
        .snapshots
        .latest_snapshot_for(record.item_ref())
        .await?
        .ok_or_else(|| {
            info!(item = record.internal_id, "Item has no snapshots");
            AppError::NotFound("Snapshot not found".to_string())
        })?;

    Ok(Json(SnapshotSummary::from(snapshot)))
}

/// GET /api/v1/items/{kind}/{value}/orderbook
///
/// Always rebuilt from the latest snapshot; never cached since a newer
/// snapshot may land at any time.
pub async fn get_item_order_book(
    State(state): State<AppState>,
    Path((kind, value)): Path<(String, String)>,
) -> Result<Json<OrderBook>, AppError> {
    let record = resolve(&state, &kind, &value).await?;

    match state.order_books.latest_for_item(record.item_ref()).await? {
        Some(book) => Ok(Json(book)),
        None => {
            info!(item = record.internal_id, "Item has no snapshots");
            Err(AppError::NotFound("Snapshot not found".to_string()))
        }
    }
}

async fn resolve(state: &AppState, kind: &str, value: &str) -> Result<ItemRecord, AppError> {
    let identifier = ItemIdentifier::parse(kind, value).map_err(AppError::BadRequest)?;

    match state.catalog.resolve_item(&identifier).await? {
        Some(record) => Ok(record),
        None => {
            info!(identifier = %identifier, "Item not found");
            Err(AppError::NotFound("Item not found".to_string()))
        }
    }
}
