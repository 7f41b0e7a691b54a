use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Items::InternalId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Items::Name)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        // Scraped from market listings, so unknown for fresh items
                        ColumnDef::new(Items::ItemId)
                            .big_integer()
                            .null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Items::AddedAt)
                            .timestamp()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Name lookups are case-insensitive
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_items_lower_name ON items (LOWER(name))",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_items_added_at")
                    .table(Items::Table)
                    .col((Items::AddedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ItemMetadata::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItemMetadata::ItemInternalId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ItemMetadata::ClassId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ItemMetadata::BackgroundColor)
                            .text()
                            .not_null()
                            .default("000000"),
                    )
                    .col(
                        ColumnDef::new(ItemMetadata::IconUrl)
                            .text()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_item_metadata_item_internal_id")
                    .from(ItemMetadata::Table, ItemMetadata::ItemInternalId)
                    .to(Items::Table, Items::InternalId)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ItemMetadata::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Items {
    Table,
    InternalId,
    Name,
    ItemId,
    AddedAt,
}

#[derive(DeriveIden)]
enum ItemMetadata {
    Table,
    ItemInternalId,
    ClassId,
    BackgroundColor,
    IconUrl,
}
