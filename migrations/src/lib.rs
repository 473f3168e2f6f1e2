pub use sea_orm_migration::prelude::*;

mod common;
mod m20250301_000001_create_users_table;
mod m20250301_000002_create_addresses_table;
mod m20250301_000003_create_catalog_reference_tables;
mod m20250301_000004_create_products_table;
mod m20250301_000005_create_product_variants_table;
mod m20250301_000006_create_product_images_table;
mod m20250301_000007_create_promotions_tables;
mod m20250301_000008_create_coupons_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_addresses_table::Migration),
            Box::new(m20250301_000003_create_catalog_reference_tables::Migration),
            Box::new(m20250301_000004_create_products_table::Migration),
            Box::new(m20250301_000005_create_product_variants_table::Migration),
            Box::new(m20250301_000006_create_product_images_table::Migration),
            Box::new(m20250301_000007_create_promotions_tables::Migration),
            Box::new(m20250301_000008_create_coupons_tables::Migration),
        ]
    }
}
