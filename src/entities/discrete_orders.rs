//! SeaORM Entity for discrete_orders

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::Side;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "discrete_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub item_snapshot_id: i64,
    pub side: Side,
    pub price: i64,
    /// Quantity at exactly this price (not cumulative)
    pub quantity: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item_snapshots::Entity",
        from = "Column::ItemSnapshotId",
        to = "super::item_snapshots::Column::Id",
        on_delete = "Cascade"
    )]
    ItemSnapshots,
}

impl Related<super::item_snapshots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemSnapshots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
