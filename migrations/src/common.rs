//! Column and index helpers shared by the storefront migrations.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

/// Audit columns carried by every soft-deletable table.
#[derive(DeriveIden)]
pub enum Timestamps {
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

/// Appends `created_at`, `updated_at` and the nullable `deleted_at` marker.
pub fn with_timestamps(table: &mut TableCreateStatement) -> &mut TableCreateStatement {
    table
        .col(
            ColumnDef::new(Timestamps::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Timestamps::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Timestamps::DeletedAt)
                .timestamp_with_time_zone()
                .null(),
        )
}

/// Unique index restricted to rows that have not been soft deleted.
///
/// Partial indexes are not expressible through the index builder, so the
/// statement is issued directly; the syntax is shared by PostgreSQL and SQLite.
pub async fn create_live_unique_index(
    manager: &SchemaManager<'_>,
    name: &str,
    table: &str,
    columns: &[&str],
) -> Result<(), DbErr> {
    let sql = format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {name} ON {table} ({}) WHERE deleted_at IS NULL",
        columns.join(", ")
    );
    manager.get_connection().execute_unprepared(&sql).await?;
    Ok(())
}

/// Plain lookup index.
pub async fn create_index(
    manager: &SchemaManager<'_>,
    name: &str,
    table: impl IntoIden + 'static,
    column: impl IntoIden + 'static,
) -> Result<(), DbErr> {
    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name(name)
                .table(table)
                .col(column)
                .to_owned(),
        )
        .await
}
