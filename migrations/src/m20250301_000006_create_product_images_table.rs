use sea_orm_migration::prelude::*;

use crate::common::{create_index, with_timestamps};
use crate::m20250301_000003_create_catalog_reference_tables::Colors;
use crate::m20250301_000004_create_products_table::Products;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000006_create_product_images_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create()
            .table(ProductImages::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(ProductImages::Id)
                    .uuid()
                    .not_null()
                    .primary_key(),
            )
            .col(ColumnDef::new(ProductImages::ProductId).uuid().not_null())
            .col(ColumnDef::new(ProductImages::ColorId).uuid().null())
            .col(
                ColumnDef::new(ProductImages::ImageUrl)
                    .string_len(1024)
                    .not_null(),
            )
            .col(ColumnDef::new(ProductImages::AltText).string_len(255).null())
            .col(
                ColumnDef::new(ProductImages::IsThumbnail)
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(
                ColumnDef::new(ProductImages::SortOrder)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_product_images_product")
                    .from(ProductImages::Table, ProductImages::ProductId)
                    .to(Products::Table, Products::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_product_images_color")
                    .from(ProductImages::Table, ProductImages::ColorId)
                    .to(Colors::Table, Colors::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .to_owned();
        with_timestamps(&mut table);
        manager.create_table(table).await?;

        create_index(
            manager,
            "idx_product_images_product_id",
            ProductImages::Table,
            ProductImages::ProductId,
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductImages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProductImages {
    Table,
    Id,
    ProductId,
    ColorId,
    ImageUrl,
    AltText,
    IsThumbnail,
    SortOrder,
}
