//! SeaORM Entity for item_metadata (1:1 extension of items)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "item_metadata")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub item_internal_id: i64,
    #[sea_orm(unique)]
    pub class_id: i64,
    /// Hex color without the leading '#'
    pub background_color: String,
    /// Opaque icon reference, joined onto the CDN base url for display
    pub icon_url: String,
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
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
