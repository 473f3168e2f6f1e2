use sea_orm_migration::prelude::*;

use crate::common::{create_live_unique_index, with_timestamps};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000001_create_users_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create()
            .table(Users::Table)
            .if_not_exists()
            .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Users::Email).string_len(255).not_null())
            .col(ColumnDef::new(Users::PhoneNumber).string_len(15).null())
            .col(ColumnDef::new(Users::PasswordHash).string_len(255).null())
            .col(
                ColumnDef::new(Users::AuthProvider)
                    .string_len(20)
                    .not_null()
                    .default("local"),
            )
            .col(ColumnDef::new(Users::FirstName).string_len(50).null())
            .col(ColumnDef::new(Users::LastName).string_len(50).null())
            .col(ColumnDef::new(Users::AvatarUrl).string_len(1024).null())
            .col(ColumnDef::new(Users::Gender).string_len(10).null())
            .col(ColumnDef::new(Users::DateOfBirth).date().null())
            .col(ColumnDef::new(Users::Preferences).json().null())
            .col(
                ColumnDef::new(Users::LoyaltyPoints)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .col(
                ColumnDef::new(Users::TierLevel)
                    .string_len(10)
                    .not_null()
                    .default("BRONZE"),
            )
            .col(
                ColumnDef::new(Users::Role)
                    .string_len(10)
                    .not_null()
                    .default("CUSTOMER"),
            )
            .col(
                ColumnDef::new(Users::Status)
                    .string_len(10)
                    .not_null()
                    .default("ACTIVE"),
            )
            .col(
                ColumnDef::new(Users::IsEmailVerified)
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(
                ColumnDef::new(Users::LastLoginAt)
                    .timestamp_with_time_zone()
                    .null(),
            )
            .col(
                ColumnDef::new(Users::ResetPasswordTokenHash)
                    .string_len(64)
                    .null(),
            )
            .col(
                ColumnDef::new(Users::ResetPasswordExpires)
                    .timestamp_with_time_zone()
                    .null(),
            )
            .col(
                ColumnDef::new(Users::EmailVerificationToken)
                    .string_len(10)
                    .null(),
            )
            .col(
                ColumnDef::new(Users::EmailVerificationExpires)
                    .timestamp_with_time_zone()
                    .null(),
            )
            .to_owned();
        with_timestamps(&mut table);
        manager.create_table(table).await?;

        create_live_unique_index(manager, "ux_users_email", "users", &["email"]).await?;
        create_live_unique_index(manager, "ux_users_phone_number", "users", &["phone_number"])
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Email,
    PhoneNumber,
    PasswordHash,
    AuthProvider,
    FirstName,
    LastName,
    AvatarUrl,
    Gender,
    DateOfBirth,
    Preferences,
    LoyaltyPoints,
    TierLevel,
    Role,
    Status,
    IsEmailVerified,
    LastLoginAt,
    ResetPasswordTokenHash,
    ResetPasswordExpires,
    EmailVerificationToken,
    EmailVerificationExpires,
}
