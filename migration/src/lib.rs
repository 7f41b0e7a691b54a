pub use sea_orm_migration::prelude::*;

mod m20250310_000001_create_items;
mod m20250310_000002_create_item_snapshots;
mod m20250310_000003_create_depth_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250310_000001_create_items::Migration),
            Box::new(m20250310_000002_create_item_snapshots::Migration),
            Box::new(m20250310_000003_create_depth_tables::Migration),
        ]
    }
}
