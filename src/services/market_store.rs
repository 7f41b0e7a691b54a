//! Store access for items, snapshots and depth data
//!
//! Handlers and the order book assembler only see the `ItemCatalog` and
//! `SnapshotStore` traits. `SeaOrmStore` implements both against Postgres.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::{
    sea_query::{Expr, Func},
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use thiserror::Error;
use tracing::debug;

use crate::entities::{
    depth_points, discrete_orders, item_metadata, item_snapshots, items,
    prelude::{DepthPoints, DiscreteOrders, ItemMetadata, ItemSnapshots, Items},
};
use crate::models::item::{ItemIdentifier, ItemRecord, ItemRef, MinimalItem};
use crate::models::order_book::{DepthPoint, DiscreteOrder, Side, SnapshotRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One page of items plus the total number of matches
#[derive(Debug, Clone, Default)]
pub struct ItemPage {
    pub items: Vec<ItemRecord>,
    pub total: u64,
}

/// Item lookup and listing
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    /// Resolve an identifier to a single item. Name matching ignores case.
    async fn resolve_item(&self, identifier: &ItemIdentifier)
        -> Result<Option<ItemRecord>, StoreError>;

    /// Newest items first, optionally filtered by a case-insensitive name substring
    async fn list_items(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<ItemPage, StoreError>;

    async fn recent_items(&self, limit: u64) -> Result<Vec<ItemRecord>, StoreError>;

    /// Names and icons, newest first, restricted to items added strictly
    /// after `added_after` when given
    async fn minimal_items(
        &self,
        added_after: Option<NaiveDateTime>,
    ) -> Result<Vec<MinimalItem>, StoreError>;

    async fn last_added_at(&self) -> Result<Option<NaiveDateTime>, StoreError>;
}

/// Snapshot selection and per-side depth data
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Snapshot with the latest `fetched_at`; equal timestamps go to the larger id
    async fn latest_snapshot_for(&self, item: ItemRef)
        -> Result<Option<SnapshotRecord>, StoreError>;

    async fn snapshot_by_id(&self, snapshot_id: i64) -> Result<Option<SnapshotRecord>, StoreError>;

    async fn snapshot_exists(&self, snapshot_id: i64) -> Result<bool, StoreError> {
        Ok(self.snapshot_by_id(snapshot_id).await?.is_some())
    }

    /// Cumulative curve for one side, in no particular order
    async fn depth_points(&self, snapshot_id: i64, side: Side)
        -> Result<Vec<DepthPoint>, StoreError>;

    /// Literal orders for one side, in no particular order
    async fn discrete_orders(
        &self,
        snapshot_id: i64,
        side: Side,
    ) -> Result<Vec<DiscreteOrder>, StoreError>;
}

pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn lower_name() -> Expr {
    Expr::expr(Func::lower(Expr::col((items::Entity, items::Column::Name))))
}

fn to_record(meta: item_metadata::Model, item: items::Model) -> ItemRecord {
    ItemRecord {
        internal_id: item.internal_id,
        name: item.name,
        item_id: item.item_id,
        added_at: item.added_at,
        class_id: meta.class_id,
        background_color: meta.background_color,
        icon_url: meta.icon_url,
    }
}

/// Metadata rows always have a parent item, so the left join never misses
fn joined_records(rows: Vec<(item_metadata::Model, Option<items::Model>)>) -> Vec<ItemRecord> {
    rows.into_iter()
        .filter_map(|(meta, item)| item.map(|item| to_record(meta, item)))
        .collect()
}

impl From<item_snapshots::Model> for SnapshotRecord {
    fn from(model: item_snapshots::Model) -> Self {
        Self {
            snapshot_id: model.id,
            item_internal_id: model.item_internal_id,
            fetched_at: model.fetched_at,
            total_sell_requests: model.total_sell_requests,
            total_buy_requests: model.total_buy_requests,
        }
    }
}

impl From<depth_points::Model> for DepthPoint {
    fn from(model: depth_points::Model) -> Self {
        DepthPoint::new(model.price, model.cumulative_quantity)
    }
}

impl From<discrete_orders::Model> for DiscreteOrder {
    fn from(model: discrete_orders::Model) -> Self {
        DiscreteOrder::new(model.price, model.quantity)
    }
}

#[async_trait]
impl ItemCatalog for SeaOrmStore {
    async fn resolve_item(
        &self,
        identifier: &ItemIdentifier,
    ) -> Result<Option<ItemRecord>, StoreError> {
        let select = ItemMetadata::find().find_also_related(Items);
        let select = match identifier {
            ItemIdentifier::InternalId(id) => {
                select.filter(item_metadata::Column::ItemInternalId.eq(*id))
            }
            ItemIdentifier::PublicId(id) => select.filter(items::Column::ItemId.eq(*id)),
            ItemIdentifier::ClassId(id) => select.filter(item_metadata::Column::ClassId.eq(*id)),
            ItemIdentifier::Name(name) => select.filter(lower_name().eq(name.to_lowercase())),
        };

        let row = select.one(&self.db).await?;
        debug!(identifier = %identifier, found = row.is_some(), "Resolved item");

        Ok(row.and_then(|(meta, item)| item.map(|item| to_record(meta, item))))
    }

    async fn list_items(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<ItemPage, StoreError> {
        let mut condition = Condition::all();
        if let Some(search) = search {
            let pattern = format!("%{}%", search.to_lowercase());
            condition = condition.add(lower_name().like(pattern));
        }

        let total = ItemMetadata::find()
            .inner_join(Items)
            .filter(condition.clone())
            .count(&self.db)
            .await?;

        let rows = ItemMetadata::find()
            .find_also_related(Items)
            .filter(condition)
            .order_by_desc(items::Column::AddedAt)
            .order_by_desc(items::Column::InternalId)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(ItemPage {
            items: joined_records(rows),
            total,
        })
    }

    async fn recent_items(&self, limit: u64) -> Result<Vec<ItemRecord>, StoreError> {
        let rows = ItemMetadata::find()
            .find_also_related(Items)
            .order_by_desc(items::Column::AddedAt)
            .order_by_desc(items::Column::InternalId)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(joined_records(rows))
    }

    async fn minimal_items(
        &self,
        added_after: Option<NaiveDateTime>,
    ) -> Result<Vec<MinimalItem>, StoreError> {
        let mut select = ItemMetadata::find().find_also_related(Items);
        if let Some(since) = added_after {
            select = select.filter(items::Column::AddedAt.gt(since));
        }

        let rows = select
            .order_by_desc(items::Column::AddedAt)
            .order_by_desc(items::Column::InternalId)
            .all(&self.db)
            .await?;

        Ok(joined_records(rows)
            .into_iter()
            .map(|record| MinimalItem {
                name: record.name,
                icon_url: record.icon_url,
            })
            .collect())
    }

    async fn last_added_at(&self) -> Result<Option<NaiveDateTime>, StoreError> {
        let newest = Items::find()
            .order_by_desc(items::Column::AddedAt)
            .one(&self.db)
            .await?;

        Ok(newest.map(|item| item.added_at))
    }
}

#[async_trait]
impl SnapshotStore for SeaOrmStore {
    async fn latest_snapshot_for(
        &self,
        item: ItemRef,
    ) -> Result<Option<SnapshotRecord>, StoreError> {
        let snapshot = ItemSnapshots::find()
            .filter(item_snapshots::Column::ItemInternalId.eq(item.internal_id))
            .order_by_desc(item_snapshots::Column::FetchedAt)
            .order_by_desc(item_snapshots::Column::Id)
            .one(&self.db)
            .await?;

        Ok(snapshot.map(SnapshotRecord::from))
    }

    async fn snapshot_by_id(&self, snapshot_id: i64) -> Result<Option<SnapshotRecord>, StoreError> {
        let snapshot = ItemSnapshots::find_by_id(snapshot_id).one(&self.db).await?;
        Ok(snapshot.map(SnapshotRecord::from))
    }

    async fn snapshot_exists(&self, snapshot_id: i64) -> Result<bool, StoreError> {
        let count = ItemSnapshots::find_by_id(snapshot_id)
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn depth_points(
        &self,
        snapshot_id: i64,
        side: Side,
    ) -> Result<Vec<DepthPoint>, StoreError> {
        let rows = DepthPoints::find()
            .filter(depth_points::Column::ItemSnapshotId.eq(snapshot_id))
            .filter(depth_points::Column::Side.eq(side))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(DepthPoint::from).collect())
    }

    async fn discrete_orders(
        &self,
        snapshot_id: i64,
        side: Side,
    ) -> Result<Vec<DiscreteOrder>, StoreError> {
        let rows = DiscreteOrders::find()
            .filter(discrete_orders::Column::ItemSnapshotId.eq(snapshot_id))
            .filter(discrete_orders::Column::Side.eq(side))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(DiscreteOrder::from).collect())
    }
}
