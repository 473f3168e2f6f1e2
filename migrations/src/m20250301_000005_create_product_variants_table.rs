use sea_orm_migration::prelude::*;

use crate::common::{create_index, create_live_unique_index, with_timestamps};
use crate::m20250301_000003_create_catalog_reference_tables::{Colors, Sizes};
use crate::m20250301_000004_create_products_table::Products;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000005_create_product_variants_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create()
            .table(ProductVariants::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(ProductVariants::Id)
                    .uuid()
                    .not_null()
                    .primary_key(),
            )
            .col(ColumnDef::new(ProductVariants::ProductId).uuid().not_null())
            .col(ColumnDef::new(ProductVariants::ColorId).uuid().not_null())
            .col(ColumnDef::new(ProductVariants::SizeId).uuid().not_null())
            .col(ColumnDef::new(ProductVariants::Sku).string_len(50).not_null())
            .col(ColumnDef::new(ProductVariants::Image).string_len(1024).null())
            .col(
                ColumnDef::new(ProductVariants::OriginalPrice)
                    .decimal_len(15, 2)
                    .null(),
            )
            .col(ColumnDef::new(ProductVariants::Price).decimal_len(15, 2).null())
            .col(
                ColumnDef::new(ProductVariants::StockQuantity)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .col(ColumnDef::new(ProductVariants::Weight).double().null())
            .col(
                ColumnDef::new(ProductVariants::IsActive)
                    .boolean()
                    .not_null()
                    .default(true),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_product_variants_product")
                    .from(ProductVariants::Table, ProductVariants::ProductId)
                    .to(Products::Table, Products::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_product_variants_color")
                    .from(ProductVariants::Table, ProductVariants::ColorId)
                    .to(Colors::Table, Colors::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_product_variants_size")
                    .from(ProductVariants::Table, ProductVariants::SizeId)
                    .to(Sizes::Table, Sizes::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .to_owned();
        with_timestamps(&mut table);
        manager.create_table(table).await?;

        create_live_unique_index(manager, "ux_product_variants_sku", "product_variants", &["sku"])
            .await?;
        create_live_unique_index(
            manager,
            "ux_product_variants_combination",
            "product_variants",
            &["product_id", "color_id", "size_id"],
        )
        .await?;
        create_index(
            manager,
            "idx_product_variants_product_id",
            ProductVariants::Table,
            ProductVariants::ProductId,
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductVariants::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProductVariants {
    Table,
    Id,
    ProductId,
    ColorId,
    SizeId,
    Sku,
    Image,
    OriginalPrice,
    Price,
    StockQuantity,
    Weight,
    IsActive,
}
