use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ItemSnapshots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItemSnapshots::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ItemSnapshots::ItemInternalId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ItemSnapshots::FetchedAt)
                            .timestamp()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(ItemSnapshots::TotalSellRequests)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ItemSnapshots::TotalBuyRequests)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_item_snapshots_item_internal_id")
                    .from(ItemSnapshots::Table, ItemSnapshots::ItemInternalId)
                    .to(Items::Table, Items::InternalId)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Latest-snapshot lookups: (item_internal_id, fetched_at DESC, id DESC)
        manager
            .create_index(
                Index::create()
                    .name("idx_item_snapshots_item_latest")
                    .table(ItemSnapshots::Table)
                    .col(ItemSnapshots::ItemInternalId)
                    .col((ItemSnapshots::FetchedAt, IndexOrder::Desc))
                    .col((ItemSnapshots::Id, IndexOrder::Desc))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ItemSnapshots::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ItemSnapshots {
    Table,
    Id,
    ItemInternalId,
    FetchedAt,
    TotalSellRequests,
    TotalBuyRequests,
}

#[derive(DeriveIden)]
enum Items {
    Table,
    InternalId,
}
