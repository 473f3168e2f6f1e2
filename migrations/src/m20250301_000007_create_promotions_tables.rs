use sea_orm_migration::prelude::*;

use crate::common::{create_index, with_timestamps};
use crate::m20250301_000004_create_products_table::Products;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000007_create_promotions_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut promotions = Table::create()
            .table(Promotions::Table)
            .if_not_exists()
            .col(ColumnDef::new(Promotions::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Promotions::Name).string_len(255).not_null())
            .col(ColumnDef::new(Promotions::Description).text().null())
            .col(
                ColumnDef::new(Promotions::DiscountType)
                    .string_len(20)
                    .not_null(),
            )
            .col(
                ColumnDef::new(Promotions::DiscountValue)
                    .decimal_len(15, 2)
                    .not_null(),
            )
            .col(
                ColumnDef::new(Promotions::StartDate)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(Promotions::EndDate)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(Promotions::IsActive)
                    .boolean()
                    .not_null()
                    .default(true),
            )
            .to_owned();
        with_timestamps(&mut promotions);
        manager.create_table(promotions).await?;
        create_index(
            manager,
            "idx_promotions_start_date",
            Promotions::Table,
            Promotions::StartDate,
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(PromotionProducts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PromotionProducts::PromotionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PromotionProducts::ProductId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PromotionProducts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(PromotionProducts::PromotionId)
                            .col(PromotionProducts::ProductId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_promotion_products_promotion")
                            .from(PromotionProducts::Table, PromotionProducts::PromotionId)
                            .to(Promotions::Table, Promotions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_promotion_products_product")
                            .from(PromotionProducts::Table, PromotionProducts::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PromotionProducts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Promotions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Promotions {
    Table,
    Id,
    Name,
    Description,
    DiscountType,
    DiscountValue,
    StartDate,
    EndDate,
    IsActive,
}

#[derive(DeriveIden)]
enum PromotionProducts {
    Table,
    PromotionId,
    ProductId,
    CreatedAt,
}
