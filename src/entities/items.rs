//! SeaORM Entity for tradable items

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub internal_id: i64,
    /// Display name, unique as stored. Lookups compare on LOWER(name).
    #[sea_orm(unique)]
    pub name: String,
    /// Public market id, scraped from listings (None until known)
    #[sea_orm(unique)]
    pub item_id: Option<i64>,
    pub added_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::item_metadata::Entity")]
    ItemMetadata,
    #[sea_orm(has_many = "super::item_snapshots::Entity")]
    ItemSnapshots,
}

impl Related<super::item_metadata::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemMetadata.def()
    }
}

impl Related<super::item_snapshots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemSnapshots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
