//! In-memory market store shared by the integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::Mutex;

use market_history::handlers::router::create_router;
use market_history::models::item::{ItemIdentifier, ItemRecord, ItemRef, MinimalItem};
use market_history::models::order_book::{DepthPoint, DiscreteOrder, Side, SnapshotRecord};
use market_history::services::market_store::{ItemCatalog, ItemPage, SnapshotStore, StoreError};
use market_history::AppState;

#[derive(Default)]
struct Tables {
    items: Vec<ItemRecord>,
    snapshots: Vec<SnapshotRecord>,
    depth_points: Vec<(i64, Side, DepthPoint)>,
    discrete_orders: Vec<(i64, Side, DiscreteOrder)>,
    failing_sides: HashSet<Side>,
    fail_everything: bool,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

pub fn at(day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert an item; returns its internal id
    pub fn add_item(
        &self,
        name: &str,
        item_id: Option<i64>,
        class_id: i64,
        added_at: NaiveDateTime,
    ) -> ItemRef {
        let mut tables = self.tables.lock();
        let internal_id = tables.items.len() as i64 + 1;
        tables.items.push(ItemRecord {
            internal_id,
            name: name.to_string(),
            item_id,
            added_at,
            class_id,
            background_color: "000000".to_string(),
            icon_url: format!("icon-{}", class_id),
        });
        ItemRef { internal_id }
    }

    /// Insert a snapshot; ids are assigned in insertion order
    pub fn add_snapshot(
        &self,
        item: ItemRef,
        fetched_at: NaiveDateTime,
        total_sell_requests: i64,
        total_buy_requests: i64,
    ) -> i64 {
        let mut tables = self.tables.lock();
        let snapshot_id = tables.snapshots.len() as i64 + 1;
        tables.snapshots.push(SnapshotRecord {
            snapshot_id,
            item_internal_id: item.internal_id,
            fetched_at,
            total_sell_requests,
            total_buy_requests,
        });
        snapshot_id
    }

    pub fn add_curve(&self, snapshot_id: i64, side: Side, points: &[(i64, i64)]) {
        let mut tables = self.tables.lock();
        tables.depth_points.extend(
            points
                .iter()
                .map(|&(price, cumulative)| (snapshot_id, side, DepthPoint::new(price, cumulative))),
        );
    }

    pub fn add_orders(&self, snapshot_id: i64, side: Side, orders: &[(i64, i64)]) {
        let mut tables = self.tables.lock();
        tables.discrete_orders.extend(
            orders
                .iter()
                .map(|&(price, quantity)| (snapshot_id, side, DiscreteOrder::new(price, quantity))),
        );
    }

    /// Make depth reads for `side` fail
    pub fn fail_side(&self, side: Side) {
        self.tables.lock().failing_sides.insert(side);
    }

    /// Make every read fail
    pub fn fail_everything(&self) {
        self.tables.lock().fail_everything = true;
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.tables.lock().fail_everything {
            return Err(StoreError::Unavailable("store is down".to_string()));
        }
        Ok(())
    }

    fn check_side(&self, side: Side) -> Result<(), StoreError> {
        self.check_available()?;
        if self.tables.lock().failing_sides.contains(&side) {
            return Err(StoreError::Unavailable(format!("{} side unavailable", side)));
        }
        Ok(())
    }

    fn newest_first(&self) -> Vec<ItemRecord> {
        let mut items = self.tables.lock().items.clone();
        items.sort_by(|a, b| {
            b.added_at
                .cmp(&a.added_at)
                .then(b.internal_id.cmp(&a.internal_id))
        });
        items
    }
}

#[async_trait]
impl ItemCatalog for InMemoryStore {
    async fn resolve_item(
        &self,
        identifier: &ItemIdentifier,
    ) -> Result<Option<ItemRecord>, StoreError> {
        self.check_available()?;
        let tables = self.tables.lock();
        let found = tables.items.iter().find(|item| match identifier {
            ItemIdentifier::InternalId(id) => item.internal_id == *id,
            ItemIdentifier::PublicId(id) => item.item_id == Some(*id),
            ItemIdentifier::ClassId(id) => item.class_id == *id,
            ItemIdentifier::Name(name) => item.name.to_lowercase() == name.to_lowercase(),
        });
        Ok(found.cloned())
    }

    async fn list_items(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<ItemPage, StoreError> {
        self.check_available()?;
        let needle = search.map(str::to_lowercase);
        let matching: Vec<ItemRecord> = self
            .newest_first()
            .into_iter()
            .filter(|item| {
                needle
                    .as_deref()
                    .is_none_or(|n| item.name.to_lowercase().contains(n))
            })
            .collect();

        Ok(ItemPage {
            total: matching.len() as u64,
            items: matching
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect(),
        })
    }

    async fn recent_items(&self, limit: u64) -> Result<Vec<ItemRecord>, StoreError> {
        self.check_available()?;
        Ok(self
            .newest_first()
            .into_iter()
            .take(limit as usize)
            .collect())
    }

    async fn minimal_items(
        &self,
        added_after: Option<NaiveDateTime>,
    ) -> Result<Vec<MinimalItem>, StoreError> {
        self.check_available()?;
        Ok(self
            .newest_first()
            .into_iter()
            .filter(|item| added_after.is_none_or(|after| item.added_at > after))
            .map(|item| MinimalItem {
                name: item.name,
                icon_url: item.icon_url,
            })
            .collect())
    }

    async fn last_added_at(&self) -> Result<Option<NaiveDateTime>, StoreError> {
        self.check_available()?;
        Ok(self.tables.lock().items.iter().map(|i| i.added_at).max())
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn latest_snapshot_for(
        &self,
        item: ItemRef,
    ) -> Result<Option<SnapshotRecord>, StoreError> {
        self.check_available()?;
        let tables = self.tables.lock();
        Ok(tables
            .snapshots
            .iter()
            .filter(|s| s.item_internal_id == item.internal_id)
            .max_by_key(|s| (s.fetched_at, s.snapshot_id))
            .copied())
    }

    async fn snapshot_by_id(&self, snapshot_id: i64) -> Result<Option<SnapshotRecord>, StoreError> {
        self.check_available()?;
        let tables = self.tables.lock();
        Ok(tables
            .snapshots
            .iter()
            .find(|s| s.snapshot_id == snapshot_id)
            .copied())
    }

    async fn depth_points(
        &self,
        snapshot_id: i64,
        side: Side,
    ) -> Result<Vec<DepthPoint>, StoreError> {
        self.check_side(side)?;
        let tables = self.tables.lock();
        Ok(tables
            .depth_points
            .iter()
            .filter(|(id, s, _)| *id == snapshot_id && *s == side)
            .map(|(_, _, point)| *point)
            .collect())
    }

    async fn discrete_orders(
        &self,
        snapshot_id: i64,
        side: Side,
    ) -> Result<Vec<DiscreteOrder>, StoreError> {
        self.check_side(side)?;
        let tables = self.tables.lock();
        Ok(tables
            .discrete_orders
            .iter()
            .filter(|(id, s, _)| *id == snapshot_id && *s == side)
            .map(|(_, _, order)| *order)
            .collect())
    }
}

pub fn test_state(store: &Arc<InMemoryStore>) -> AppState {
    AppState::new(store.clone(), store.clone()).with_icon_base_url("https://cdn.test/")
}

pub fn test_app(store: &Arc<InMemoryStore>) -> Router {
    create_router(test_state(store))
}
