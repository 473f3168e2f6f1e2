//! Catalog import tool - loads scraped product files into the database
//!
//! Run with: cargo run --bin import-catalog -- --data-dir ./data
//!
//! Every `*.json` file in the directory holds an array of products with
//! their category, variants (color and size) and images. Products that
//! already exist by name are reused, so the import can be run repeatedly.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use storefront_api::services::catalog_import::CatalogImporter;

#[derive(Parser, Debug)]
#[command(name = "import-catalog", about = "Import product JSON files into the catalog", version)]
struct Cli {
    #[arg(long, help = "Directory containing the product *.json files")]
    data_dir: PathBuf,

    #[arg(
        long,
        env = "APP__DATABASE_URL",
        default_value = "sqlite://storefront.db?mode=rwc",
        help = "Database connection URL"
    )]
    database_url: String,

    #[arg(long, default_value = "info", help = "Log level")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    storefront_api::config::init_tracing(&cli.log_level, false);

    info!(data_dir = %cli.data_dir.display(), "Starting catalog import");

    let db = storefront_api::db::establish_connection(&cli.database_url)
        .await
        .context("failed to connect to the database")?;
    storefront_api::db::run_migrations(&db)
        .await
        .context("failed to run migrations")?;

    let importer = CatalogImporter::new(Arc::new(db));
    let summary = importer
        .import_dir(&cli.data_dir)
        .await
        .with_context(|| format!("import from {} failed", cli.data_dir.display()))?;

    info!(
        files = summary.files,
        products_created = summary.products_created,
        products_reused = summary.products_reused,
        products_failed = summary.products_failed,
        variants_created = summary.variants_created,
        variants_skipped = summary.variants_skipped,
        images_created = summary.images_created,
        "Catalog import finished"
    );

    Ok(())
}
