use sea_orm_migration::prelude::*;

use crate::common::{create_index, with_timestamps};
use crate::m20250301_000001_create_users_table::Users;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000002_create_addresses_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create()
            .table(Addresses::Table)
            .if_not_exists()
            .col(ColumnDef::new(Addresses::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Addresses::UserId).uuid().not_null())
            .col(
                ColumnDef::new(Addresses::RecipientName)
                    .string_len(100)
                    .not_null(),
            )
            .col(ColumnDef::new(Addresses::PhoneNumber).string_len(15).not_null())
            .col(
                ColumnDef::new(Addresses::StreetAddress)
                    .string_len(255)
                    .not_null(),
            )
            .col(ColumnDef::new(Addresses::Ward).string_len(100).not_null())
            .col(ColumnDef::new(Addresses::District).string_len(100).not_null())
            .col(ColumnDef::new(Addresses::City).string_len(100).not_null())
            .col(
                ColumnDef::new(Addresses::IsDefault)
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_addresses_user")
                    .from(Addresses::Table, Addresses::UserId)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        with_timestamps(&mut table);
        manager.create_table(table).await?;

        create_index(manager, "idx_addresses_user_id", Addresses::Table, Addresses::UserId).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Addresses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Addresses {
    Table,
    Id,
    UserId,
    RecipientName,
    PhoneNumber,
    StreetAddress,
    Ward,
    District,
    City,
    IsDefault,
}
