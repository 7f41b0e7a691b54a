// src/lib.rs

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sea_orm::DatabaseConnection;

use config::{AppConfig, DEFAULT_ICON_BASE_URL};
use models::order_book::OrderBook;
use rate_limit::RateLimits;
use services::market_store::{ItemCatalog, SeaOrmStore, SnapshotStore};
use services::order_book::OrderBookAssembler;

/// Upper bound on cached snapshot order books
const ORDER_BOOK_CACHE_CAPACITY: u64 = 10_000;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn ItemCatalog>,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub order_books: OrderBookAssembler,
    /// Order books by snapshot id; `None` when caching is disabled
    pub order_book_cache: Option<Cache<i64, Arc<OrderBook>>>,
    pub icon_base_url: String,
    /// `None` when rate limiting is disabled
    pub rate_limits: Option<RateLimits>,
}

impl AppState {
    /// State with no cache and no rate limiting
    pub fn new(catalog: Arc<dyn ItemCatalog>, snapshots: Arc<dyn SnapshotStore>) -> Self {
        Self {
            catalog,
            order_books: OrderBookAssembler::new(snapshots.clone()),
            snapshots,
            order_book_cache: None,
            icon_base_url: DEFAULT_ICON_BASE_URL.to_string(),
            rate_limits: None,
        }
    }

    /// Wire a Postgres-backed state from the loaded configuration
    pub fn from_config(db: DatabaseConnection, config: &AppConfig) -> Self {
        let store = Arc::new(SeaOrmStore::new(db));
        let state = Self::new(store.clone(), store)
            .with_icon_base_url(config.icon_base_url.clone())
            .with_order_book_cache(config.cache_duration);

        if config.rate_limit_enabled {
            state.with_rate_limits(RateLimits::new(config.trust_proxy))
        } else {
            state
        }
    }

    pub fn with_icon_base_url(mut self, icon_base_url: impl Into<String>) -> Self {
        self.icon_base_url = icon_base_url.into();
        self
    }

    /// Cache snapshot order books for `ttl`; a zero TTL disables the cache
    pub fn with_order_book_cache(mut self, ttl: Duration) -> Self {
        self.order_book_cache = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(ORDER_BOOK_CACHE_CAPACITY)
                .time_to_live(ttl)
                .build()
        });
        self
    }

    pub fn with_rate_limits(mut self, limits: RateLimits) -> Self {
        self.rate_limits = Some(limits);
        self
    }
}

pub mod entities {
    pub mod prelude;
    pub mod depth_points;
    pub mod discrete_orders;
    pub mod item_metadata;
    pub mod item_snapshots;
    pub mod items;
    pub mod sea_orm_active_enums;
}

pub mod services {
    pub mod depth_curve;
    pub mod market_store;
    pub mod order_book;
}

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod rate_limit;
