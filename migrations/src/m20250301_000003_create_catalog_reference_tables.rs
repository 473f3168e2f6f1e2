use sea_orm_migration::prelude::*;

use crate::common::{create_index, create_live_unique_index, with_timestamps};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000003_create_catalog_reference_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut categories = Table::create()
            .table(Categories::Table)
            .if_not_exists()
            .col(ColumnDef::new(Categories::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Categories::Name).string_len(100).not_null())
            .col(ColumnDef::new(Categories::Slug).string_len(150).not_null())
            .col(ColumnDef::new(Categories::ParentId).uuid().null())
            .col(ColumnDef::new(Categories::Image).string_len(1024).null())
            .col(
                ColumnDef::new(Categories::IsActive)
                    .boolean()
                    .not_null()
                    .default(true),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_categories_parent")
                    .from(Categories::Table, Categories::ParentId)
                    .to(Categories::Table, Categories::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .to_owned();
        with_timestamps(&mut categories);
        manager.create_table(categories).await?;
        create_live_unique_index(manager, "ux_categories_slug", "categories", &["slug"]).await?;
        create_index(
            manager,
            "idx_categories_parent_id",
            Categories::Table,
            Categories::ParentId,
        )
        .await?;

        let mut colors = Table::create()
            .table(Colors::Table)
            .if_not_exists()
            .col(ColumnDef::new(Colors::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Colors::Name).string_len(50).not_null())
            .col(ColumnDef::new(Colors::HexCode).string_len(7).null())
            .to_owned();
        with_timestamps(&mut colors);
        manager.create_table(colors).await?;
        create_live_unique_index(manager, "ux_colors_name", "colors", &["name"]).await?;

        let mut sizes = Table::create()
            .table(Sizes::Table)
            .if_not_exists()
            .col(ColumnDef::new(Sizes::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Sizes::Name).string_len(10).not_null())
            .col(
                ColumnDef::new(Sizes::Type)
                    .string_len(20)
                    .not_null()
                    .default("clothing"),
            )
            .to_owned();
        with_timestamps(&mut sizes);
        manager.create_table(sizes).await?;
        create_live_unique_index(manager, "ux_sizes_name_type", "sizes", &["name", "type"])
            .await?;

        let mut materials = Table::create()
            .table(Materials::Table)
            .if_not_exists()
            .col(ColumnDef::new(Materials::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Materials::Name).string_len(50).not_null())
            .col(ColumnDef::new(Materials::Description).text().null())
            .to_owned();
        with_timestamps(&mut materials);
        manager.create_table(materials).await?;
        create_live_unique_index(manager, "ux_materials_name", "materials", &["name"]).await?;

        let mut usages = Table::create()
            .table(Usages::Table)
            .if_not_exists()
            .col(ColumnDef::new(Usages::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Usages::Name).string_len(50).not_null())
            .col(ColumnDef::new(Usages::Description).text().null())
            .to_owned();
        with_timestamps(&mut usages);
        manager.create_table(usages).await?;
        create_live_unique_index(manager, "ux_usages_name", "usages", &["name"]).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Usages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Materials::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sizes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Colors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Categories {
    Table,
    Id,
    Name,
    Slug,
    ParentId,
    Image,
    IsActive,
}

#[derive(DeriveIden)]
pub enum Colors {
    Table,
    Id,
    Name,
    HexCode,
}

#[derive(DeriveIden)]
pub enum Sizes {
    Table,
    Id,
    Name,
    Type,
}

#[derive(DeriveIden)]
pub enum Materials {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
pub enum Usages {
    Table,
    Id,
    Name,
    Description,
}
