use sea_orm_migration::prelude::*;

use crate::common::{create_index, with_timestamps};
use crate::m20250301_000003_create_catalog_reference_tables::{Categories, Materials, Usages};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000004_create_products_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut products = Table::create()
            .table(Products::Table)
            .if_not_exists()
            .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Products::CategoryId).uuid().not_null())
            .col(ColumnDef::new(Products::MaterialId).uuid().null())
            .col(ColumnDef::new(Products::Name).string_len(255).not_null())
            .col(ColumnDef::new(Products::Description).text().null())
            .col(
                ColumnDef::new(Products::BasePrice)
                    .decimal_len(15, 2)
                    .not_null(),
            )
            .col(
                ColumnDef::new(Products::Gender)
                    .string_len(10)
                    .not_null()
                    .default("UNISEX"),
            )
            .col(
                ColumnDef::new(Products::AgeGroup)
                    .string_len(10)
                    .not_null()
                    .default("ADULT"),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_products_category")
                    .from(Products::Table, Products::CategoryId)
                    .to(Categories::Table, Categories::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_products_material")
                    .from(Products::Table, Products::MaterialId)
                    .to(Materials::Table, Materials::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .to_owned();
        with_timestamps(&mut products);
        manager.create_table(products).await?;
        create_index(
            manager,
            "idx_products_category_id",
            Products::Table,
            Products::CategoryId,
        )
        .await?;
        create_index(
            manager,
            "idx_products_material_id",
            Products::Table,
            Products::MaterialId,
        )
        .await?;
        create_index(manager, "idx_products_name", Products::Table, Products::Name).await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductUsages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProductUsages::ProductId).uuid().not_null())
                    .col(ColumnDef::new(ProductUsages::UsageId).uuid().not_null())
                    .col(
                        ColumnDef::new(ProductUsages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(ProductUsages::ProductId)
                            .col(ProductUsages::UsageId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_usages_product")
                            .from(ProductUsages::Table, ProductUsages::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_usages_usage")
                            .from(ProductUsages::Table, ProductUsages::UsageId)
                            .to(Usages::Table, Usages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductUsages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Products {
    Table,
    Id,
    CategoryId,
    MaterialId,
    Name,
    Description,
    BasePrice,
    Gender,
    AgeGroup,
}

#[derive(DeriveIden)]
enum ProductUsages {
    Table,
    ProductId,
    UsageId,
    CreatedAt,
}
