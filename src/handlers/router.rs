use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{health, items, items_minimal, snapshots};
use crate::rate_limit::{self, RateLimiter};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let item_list_routes = Router::new()
        .route("/api/v1/items", get(items::get_items))
        .route("/api/v1/items/recent", get(items::get_recent_items));

    let item_detail_routes = Router::new()
        .route("/api/v1/items/{kind}/{value}", get(items::get_item))
        .route(
            "/api/v1/items/{kind}/{value}/snapshot",
            get(items::get_item_snapshot),
        )
        .route(
            "/api/v1/items/{kind}/{value}/orderbook",
            get(items::get_item_order_book),
        );

    let snapshot_routes = Router::new()
        .route(
            "/api/v1/snapshots/{snapshot_id}",
            get(snapshots::get_snapshot_order_book),
        )
        .route(
            "/api/v1/snapshots/{snapshot_id}/exists",
            get(snapshots::get_snapshot_exists),
        );

    let minimal_routes = Router::new()
        .route("/api/v1/items-minimal", get(items_minimal::get_items_minimal))
        .route(
            "/api/v1/items-minimal/last",
            get(items_minimal::get_items_minimal_last),
        )
        .route(
            "/api/v1/items-minimal/diff",
            get(items_minimal::get_items_minimal_diff),
        );

    let groups = match &state.rate_limits {
        Some(limits) => [
            limited(item_list_routes, &limits.item_list),
            limited(item_detail_routes, &limits.item_detail),
            limited(snapshot_routes, &limits.snapshot),
            limited(minimal_routes, &limits.minimal),
        ],
        None => [
            item_list_routes,
            item_detail_routes,
            snapshot_routes,
            minimal_routes,
        ],
    };

    groups
        .into_iter()
        .fold(
            Router::new().route("/health", get(health::health_check)),
            |router, group| router.merge(group),
        )
        .fallback(health::not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn limited(routes: Router<AppState>, limiter: &Arc<RateLimiter>) -> Router<AppState> {
    routes.route_layer(middleware::from_fn_with_state(
        limiter.clone(),
        rate_limit::enforce,
    ))
}
