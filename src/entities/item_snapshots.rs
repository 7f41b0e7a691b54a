//! SeaORM Entity for item_snapshots
//!
//! A snapshot is written once by the collector and never updated.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "item_snapshots")]
pub struct Model {
    /// BIGSERIAL, so ids grow with insertion order
    #[sea_orm(primary_key)]
    pub id: i64,
    pub item_internal_id: i64,
    pub fetched_at: DateTime,
    pub total_sell_requests: i64,
    pub total_buy_requests: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemInternalId",
        to = "super::items::Column::InternalId",
        on_delete = "Cascade"
    )]
    Items,
    #[sea_orm(has_many = "super::depth_points::Entity")]
    DepthPoints,
    #[sea_orm(has_many = "super::discrete_orders::Entity")]
    DiscreteOrders,
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::depth_points::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DepthPoints.def()
    }
}

impl Related<super::discrete_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiscreteOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
