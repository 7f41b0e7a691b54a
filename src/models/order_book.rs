//! Snapshot and order book models
//!
//! `DepthPoint` and `DiscreteOrder` are the two stored representations of
//! one side of a snapshot. `OrderBookLevel` is what both are turned into
//! on read; it is never persisted.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::entities::sea_orm_active_enums::Side;

/// One point of a cumulative depth curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthPoint {
    pub price: i64,
    /// Total quantity at this price or better
    pub cumulative_quantity: i64,
}

impl DepthPoint {
    pub fn new(price: i64, cumulative_quantity: i64) -> Self {
        Self {
            price,
            cumulative_quantity,
        }
    }
}

/// A literal order quantity at one price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscreteOrder {
    pub price: i64,
    pub quantity: i64,
}

impl DiscreteOrder {
    pub fn new(price: i64, quantity: i64) -> Self {
        Self { price, quantity }
    }
}

/// Reconstructed price level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub price: i64,
    /// Quantity at exactly this price; zero is valid
    pub quantity: i64,
    pub cumulative_quantity: i64,
}

/// Snapshot row as read from the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub snapshot_id: i64,
    pub item_internal_id: i64,
    pub fetched_at: NaiveDateTime,
    pub total_sell_requests: i64,
    pub total_buy_requests: i64,
}

/// Snapshot header without order data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub snapshot_id: i64,
    pub fetched_at: DateTime<Utc>,
    pub total_sell_requests: i64,
    pub total_buy_requests: i64,
}

impl From<SnapshotRecord> for SnapshotSummary {
    fn from(record: SnapshotRecord) -> Self {
        Self {
            snapshot_id: record.snapshot_id,
            // Stored as UTC without zone
            fetched_at: record.fetched_at.and_utc(),
            total_sell_requests: record.total_sell_requests,
            total_buy_requests: record.total_buy_requests,
        }
    }
}

/// Both reconstructed sides of one snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderBook {
    pub snapshot_id: i64,
    pub fetched_at: DateTime<Utc>,
    pub total_sell_requests: i64,
    pub total_buy_requests: i64,
    /// Ascending price
    pub sell_orders: Vec<OrderBookLevel>,
    /// Descending price
    pub buy_orders: Vec<OrderBookLevel>,
}

impl OrderBook {
    pub fn new(
        snapshot: SnapshotRecord,
        sell_orders: Vec<OrderBookLevel>,
        buy_orders: Vec<OrderBookLevel>,
    ) -> Self {
        let summary = SnapshotSummary::from(snapshot);
        Self {
            snapshot_id: summary.snapshot_id,
            fetched_at: summary.fetched_at,
            total_sell_requests: summary.total_sell_requests,
            total_buy_requests: summary.total_buy_requests,
            sell_orders,
            buy_orders,
        }
    }
}
