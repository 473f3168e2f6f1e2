use sea_orm_migration::prelude::*;

use crate::common::{create_index, create_live_unique_index, with_timestamps};
use crate::m20250301_000001_create_users_table::Users;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000008_create_coupons_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut coupons = Table::create()
            .table(Coupons::Table)
            .if_not_exists()
            .col(ColumnDef::new(Coupons::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Coupons::Code).string_len(50).not_null())
            .col(ColumnDef::new(Coupons::Description).text().null())
            .col(ColumnDef::new(Coupons::DiscountType).string_len(20).not_null())
            .col(
                ColumnDef::new(Coupons::DiscountValue)
                    .decimal_len(15, 2)
                    .not_null(),
            )
            .col(
                ColumnDef::new(Coupons::MinOrderValue)
                    .decimal_len(15, 2)
                    .not_null()
                    .default(0),
            )
            .col(
                ColumnDef::new(Coupons::MaxDiscountAmount)
                    .decimal_len(15, 2)
                    .null(),
            )
            .col(
                ColumnDef::new(Coupons::UsageLimit)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .col(
                ColumnDef::new(Coupons::UsageCount)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .col(
                ColumnDef::new(Coupons::PerUserLimit)
                    .integer()
                    .not_null()
                    .default(1),
            )
            .col(
                ColumnDef::new(Coupons::StartDate)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(Coupons::EndDate)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(Coupons::IsActive)
                    .boolean()
                    .not_null()
                    .default(true),
            )
            .to_owned();
        with_timestamps(&mut coupons);
        manager.create_table(coupons).await?;
        create_live_unique_index(manager, "ux_coupons_code", "coupons", &["code"]).await?;

        manager
            .create_table(
                Table::create()
                    .table(CouponUsages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CouponUsages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CouponUsages::CouponId).uuid().not_null())
                    .col(ColumnDef::new(CouponUsages::UserId).uuid().not_null())
                    .col(ColumnDef::new(CouponUsages::OrderId).uuid().null())
                    .col(
                        ColumnDef::new(CouponUsages::DiscountAmount)
                            .decimal_len(15, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CouponUsages::UsedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_coupon_usages_coupon")
                            .from(CouponUsages::Table, CouponUsages::CouponId)
                            .to(Coupons::Table, Coupons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_coupon_usages_user")
                            .from(CouponUsages::Table, CouponUsages::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        create_index(
            manager,
            "idx_coupon_usages_coupon_id",
            CouponUsages::Table,
            CouponUsages::CouponId,
        )
        .await?;
        create_index(
            manager,
            "idx_coupon_usages_user_id",
            CouponUsages::Table,
            CouponUsages::UserId,
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CouponUsages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Coupons::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Coupons {
    Table,
    Id,
    Code,
    Description,
    DiscountType,
    DiscountValue,
    MinOrderValue,
    MaxDiscountAmount,
    UsageLimit,
    UsageCount,
    PerUserLimit,
    StartDate,
    EndDate,
    IsActive,
}

#[derive(DeriveIden)]
enum CouponUsages {
    Table,
    Id,
    CouponId,
    UserId,
    OrderId,
    DiscountAmount,
    UsedAt,
}
