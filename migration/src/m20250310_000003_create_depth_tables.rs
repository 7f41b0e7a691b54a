use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Cumulative depth curve, one row per (snapshot, side, price)
        manager
            .create_table(
                Table::create()
                    .table(DepthPoints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DepthPoints::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DepthPoints::ItemSnapshotId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DepthPoints::Side)
                            .string_len(4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DepthPoints::Price)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DepthPoints::CumulativeQuantity)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_depth_points_item_snapshot_id")
                    .from(DepthPoints::Table, DepthPoints::ItemSnapshotId)
                    .to(ItemSnapshots::Table, ItemSnapshots::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_depth_points_unique")
                    .table(DepthPoints::Table)
                    .col(DepthPoints::ItemSnapshotId)
                    .col(DepthPoints::Side)
                    .col(DepthPoints::Price)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Literal per-price orders, captured directly for some snapshots
        manager
            .create_table(
                Table::create()
                    .table(DiscreteOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DiscreteOrders::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DiscreteOrders::ItemSnapshotId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscreteOrders::Side)
                            .string_len(4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscreteOrders::Price)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscreteOrders::Quantity)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_discrete_orders_item_snapshot_id")
                    .from(DiscreteOrders::Table, DiscreteOrders::ItemSnapshotId)
                    .to(ItemSnapshots::Table, ItemSnapshots::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_discrete_orders_unique")
                    .table(DiscreteOrders::Table)
                    .col(DiscreteOrders::ItemSnapshotId)
                    .col(DiscreteOrders::Side)
                    .col(DiscreteOrders::Price)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DiscreteOrders::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(DepthPoints::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DepthPoints {
    Table,
    Id,
    ItemSnapshotId,
    Side,
    Price,
    CumulativeQuantity,
}

#[derive(DeriveIden)]
enum DiscreteOrders {
    Table,
    Id,
    ItemSnapshotId,
    Side,
    Price,
    Quantity,
}

#[derive(DeriveIden)]
enum ItemSnapshots {
    Table,
    Id,
}
