mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use market_history::handlers::router::create_router;
use market_history::models::order_book::Side;
use market_history::rate_limit::{RateLimitPolicy, RateLimiter, RateLimits};

use crate::common::{at, test_app, test_state, InMemoryStore};

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn seeded_store() -> Arc<InMemoryStore> {
    let store = InMemoryStore::new();
    let awp = store.add_item("AWP | Asiimov (Field-Tested)", Some(1001), 310_776, at(1, 0, 0, 0));
    store.add_item("AK-47 | Redline (Field-Tested)", Some(1002), 310_777, at(2, 0, 0, 0));
    store.add_item("Glock-18 | Fade (Factory New)", None, 310_778, at(3, 0, 0, 0));

    let snapshot = store.add_snapshot(awp, at(4, 8, 30, 0), 20, 9);
    store.add_curve(snapshot, Side::Sell, &[(100, 5), (105, 12), (110, 12), (120, 20)]);
    store.add_curve(snapshot, Side::Buy, &[(95, 2), (90, 9)]);
    store
}

#[tokio::test]
async fn test_health() {
    let (status, json) = get_json(test_app(&InMemoryStore::new()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "OK");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (status, json) = get_json(test_app(&InMemoryStore::new()), "/api/v2/nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Not found");
}

#[tokio::test]
async fn test_item_list_paginates_newest_first() {
    let app = test_app(&seeded_store());
    let (status, json) = get_json(app, "/api/v1/items?page=1&limit=2").await;

    assert_eq!(status, StatusCode::OK);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "Glock-18 | Fade (Factory New)");
    assert_eq!(items[1]["name"], "AK-47 | Redline (Field-Tested)");
    assert_eq!(json["pagination"]["total"], 3);
    assert_eq!(json["pagination"]["pages"], 2);
    assert_eq!(json["pagination"]["page"], 1);
    assert_eq!(json["pagination"]["limit"], 2);
}

#[tokio::test]
async fn test_item_list_lenient_params_and_search() {
    let app = test_app(&seeded_store());
    let (status, json) = get_json(app, "/api/v1/items?page=abc&limit=9999&search=REDLINE").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["pagination"]["page"], 1);
    assert_eq!(json["pagination"]["limit"], 250);
    assert_eq!(json["pagination"]["total"], 1);
    assert_eq!(json["items"][0]["item_id"], 1002);
}

#[tokio::test]
async fn test_recent_items() {
    let (status, json) = get_json(test_app(&seeded_store()), "/api/v1/items/recent?limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["class_id"], 310_778);
}

#[tokio::test]
async fn test_item_lookup_by_each_identifier() {
    let store = seeded_store();
    for uri in [
        "/api/v1/items/internal-id/1",
        "/api/v1/items/item-id/1001",
        "/api/v1/items/class-id/310776",
        "/api/v1/items/name/awp%20%7C%20asiimov%20(field-tested)",
    ] {
        let (status, json) = get_json(test_app(&store), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(json["name"], "AWP | Asiimov (Field-Tested)");
        assert_eq!(json["full_icon_url"], "https://cdn.test/icon-310776");
        assert_eq!(json["background_color"], "000000");
    }
}

#[tokio::test]
async fn test_item_lookup_errors() {
    let store = seeded_store();

    let (status, json) = get_json(test_app(&store), "/api/v1/items/internal-id/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "Invalid internal_id");

    let (status, _) = get_json(test_app(&store), "/api/v1/items/colour/red").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = get_json(test_app(&store), "/api/v1/items/item-id/424242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Item not found");
}

#[tokio::test]
async fn test_item_snapshot_summary() {
    let store = seeded_store();

    let (status, json) = get_json(test_app(&store), "/api/v1/items/class-id/310776/snapshot").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["snapshot_id"], 1);
    assert_eq!(json["fetched_at"], "2024-05-04T08:30:00Z");
    assert_eq!(json["total_sell_requests"], 20);
    assert_eq!(json["total_buy_requests"], 9);

    let (status, json) = get_json(test_app(&store), "/api/v1/items/class-id/310777/snapshot").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Snapshot not found");
}

#[tokio::test]
async fn test_item_order_book() {
    let (status, json) =
        get_json(test_app(&seeded_store()), "/api/v1/items/item-id/1001/orderbook").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["snapshot_id"], 1);
    assert_eq!(
        json["sell_orders"],
        serde_json::json!([
            {"price": 100, "quantity": 5, "cumulative_quantity": 5},
            {"price": 105, "quantity": 7, "cumulative_quantity": 12},
            {"price": 110, "quantity": 0, "cumulative_quantity": 12},
            {"price": 120, "quantity": 8, "cumulative_quantity": 20},
        ])
    );
    assert_eq!(
        json["buy_orders"],
        serde_json::json!([
            {"price": 95, "quantity": 2, "cumulative_quantity": 2},
            {"price": 90, "quantity": 7, "cumulative_quantity": 9},
        ])
    );
}

#[tokio::test]
async fn test_snapshot_order_book_by_id() {
    let store = seeded_store();

    let (status, json) = get_json(test_app(&store), "/api/v1/snapshots/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_sell_requests"], 20);
    assert_eq!(json["buy_orders"][1]["quantity"], 7);

    let (status, json) = get_json(test_app(&store), "/api/v1/snapshots/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");

    let (status, json) = get_json(test_app(&store), "/api/v1/snapshots/latest").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid snapshot_id");
}

#[tokio::test]
async fn test_snapshot_exists() {
    let store = seeded_store();

    let (status, json) = get_json(test_app(&store), "/api/v1/snapshots/1/exists").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["exists"], true);

    let (_, json) = get_json(test_app(&store), "/api/v1/snapshots/2/exists").await;
    assert_eq!(json["snapshot_id"], 2);
    assert_eq!(json["exists"], false);
}

#[tokio::test]
async fn test_corrupt_snapshot_is_500() {
    let store = InMemoryStore::new();
    let item = store.add_item("Broken", None, 1, at(1, 0, 0, 0));
    let snapshot = store.add_snapshot(item, at(2, 0, 0, 0), 0, 0);
    store.add_curve(snapshot, Side::Sell, &[(100, 8), (110, 2)]);

    let (status, json) = get_json(test_app(&store), "/api/v1/snapshots/1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "DATA_CORRUPTION");
    assert_eq!(json["error"], "Internal server error");
}

#[tokio::test]
async fn test_store_outage_is_500_not_404() {
    let store = seeded_store();
    store.fail_everything();

    let (status, json) = get_json(test_app(&store), "/api/v1/snapshots/1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "DATABASE_ERROR");

    let (status, _) = get_json(test_app(&store), "/api/v1/items/item-id/1001").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_cached_order_book_survives_outage() {
    let store = seeded_store();
    let app = create_router(
        test_state(&store).with_order_book_cache(Duration::from_secs(60)),
    );

    let (status, first) = get_json(app.clone(), "/api/v1/snapshots/1").await;
    assert_eq!(status, StatusCode::OK);

    store.fail_everything();
    let (status, second) = get_json(app, "/api/v1/snapshots/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_items_minimal_endpoints() {
    let store = seeded_store();

    let (status, json) = get_json(test_app(&store), "/api/v1/items-minimal").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["last_item"], "2024-05-03T00:00:00");
    assert_eq!(json["items"].as_array().unwrap().len(), 3);
    assert_eq!(json["items"][0]["icon"], "icon-310778");

    let (status, json) = get_json(test_app(&store), "/api/v1/items-minimal/last").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["last_item"], "2024-05-03T00:00:00");

    let (status, json) = get_json(
        test_app(&store),
        "/api/v1/items-minimal/diff?last_item=2024-05-01T00:00:00",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["from"], "2024-05-01T00:00:00");
    assert_eq!(json["to"], "2024-05-03T00:00:00");
    let names: Vec<&str> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        ["Glock-18 | Fade (Factory New)", "AK-47 | Redline (Field-Tested)"]
    );

    let (status, _) =
        get_json(test_app(&store), "/api/v1/items-minimal/diff?last_item=yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_items_minimal_empty_catalog() {
    let store = InMemoryStore::new();

    let (status, _) = get_json(test_app(&store), "/api/v1/items-minimal").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_json(test_app(&store), "/api/v1/items-minimal/last").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn request_from(uri: &str, peer: &str, forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .extension(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
    if let Some(value) = forwarded_for {
        builder = builder.header("x-forwarded-for", value);
    }
    builder.body(Body::empty()).unwrap()
}

fn tight_limits(trust_proxy: bool) -> RateLimits {
    let tight = Arc::new(
        RateLimiter::new(RateLimitPolicy {
            name: "snapshot",
            window: Duration::from_secs(60),
            max_requests: 2,
        })
        .trusting_proxy(trust_proxy),
    );
    RateLimits {
        snapshot: tight,
        ..RateLimits::new(trust_proxy)
    }
}

#[tokio::test]
async fn test_rate_limit_returns_429() {
    let store = seeded_store();
    let app = create_router(test_state(&store).with_rate_limits(tight_limits(false)));

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(request_from("/api/v1/snapshots/1", "198.51.100.4:40000", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("ratelimit-remaining"));
        assert!(response.headers().contains_key("x-ratelimit-remaining"));
    }

    let response = app
        .clone()
        .oneshot(request_from("/api/v1/snapshots/1/exists", "198.51.100.4:40001", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));
    assert_eq!(response.headers()["x-ratelimit-remaining"], "0");

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["limiter"], "snapshot");
    assert_eq!(json["status"], 429);

    // Other route groups and other peers are unaffected
    let response = app
        .clone()
        .oneshot(request_from("/api/v1/items/item-id/1001", "198.51.100.4:40002", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request_from("/api/v1/snapshots/1", "198.51.100.5:40000", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_evade_limit() {
    let store = seeded_store();
    let app = create_router(test_state(&store).with_rate_limits(RateLimits::default()));

    let mut limited = 0;
    for i in 0..40 {
        let spoofed = format!("203.0.113.{}", i);
        let response = app
            .clone()
            .oneshot(request_from("/api/v1/items", "192.0.2.50:52000", Some(&spoofed)))
            .await
            .unwrap();
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            limited += 1;
        }
    }

    // itemList allows 25 per window from one peer
    assert_eq!(limited, 15);
}

#[tokio::test]
async fn test_forwarded_for_honoured_behind_trusted_proxy() {
    let store = seeded_store();
    let app = create_router(test_state(&store).with_rate_limits(tight_limits(true)));

    for client in ["203.0.113.1", "203.0.113.2", "203.0.113.3"] {
        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(request_from("/api/v1/snapshots/1", "10.0.0.1:443", Some(client)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{client}");
        }
    }

    let response = app
        .oneshot(request_from("/api/v1/snapshots/1", "10.0.0.1:443", Some("203.0.113.1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}
