//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema (including unique constraints) always matches the Rust structs. Creation
//! uses `IF NOT EXISTS` and is safe to run on every startup.

use crate::entities::{Price, Product, ProposalCounter, Quote, Seller, product};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};
use std::path::Path;
use tracing::info;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/led_quoter.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Directory holding a file-backed `SQLite` database, if the URL names one.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next().unwrap_or(path);
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file, which is created (along with its directory)
/// if missing.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(dir) = sqlite_parent_dir(&database_url) {
        tokio::fs::create_dir_all(dir).await?;
    }
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table_for<E, C>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables and indexes that do not exist yet.
///
/// Besides the entity tables this adds a unique index on `products(application, pixel_pitch)`
/// so a catalog lookup can never be ambiguous.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table_for(db, &schema, Seller).await?;
    create_table_for(db, &schema, Product).await?;
    create_table_for(db, &schema, Price).await?;
    create_table_for(db, &schema, Quote).await?;
    create_table_for(db, &schema, ProposalCounter).await?;

    let product_lookup = Index::create()
        .name("idx_products_application_pixel_pitch")
        .table(Product)
        .col(product::Column::Application)
        .col(product::Column::PixelPitch)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&product_lookup)).await?;

    info!("Database schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ApplicationCategory, ProductLine, product::ActiveModel};
    use crate::errors::Error;
    use sea_orm::{ActiveModelTrait, QuerySelect, Set};

    fn raw_product(model: &str) -> ActiveModel {
        ActiveModel {
            model: Set(model.to_string()),
            line: Set(ProductLine::Rental),
            pixel_pitch: Set(2.5),
            cabinet: Set("500×1000mm".to_string()),
            weight_kg: Set(8.5),
            power_w: Set(120.0),
            brightness_nits: Set(800.0),
            voltage: Set("110-220V".to_string()),
            lifetime_hours: Set(100_000),
            ip_rating: Set("IP31".to_string()),
            warranty_months: Set(24),
            accessories: Set(String::new()),
            application: Set(ApplicationCategory::IndoorRental),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        Seller::find().limit(1).all(&db).await?;
        Product::find().limit(1).all(&db).await?;
        Price::find().limit(1).all(&db).await?;
        Quote::find().limit(1).all(&db).await?;
        ProposalCounter::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(
            sqlite_parent_dir(DEFAULT_DATABASE_URL),
            Some(Path::new("data"))
        );
        assert_eq!(sqlite_parent_dir("sqlite://quotes.db"), None);
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_product_lookup_index_is_unique() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        raw_product("first").insert(&db).await?;
        let duplicate: Result<_> = raw_product("second").insert(&db).await.map_err(Error::from);
        assert!(matches!(duplicate, Err(Error::Conflict { .. })));
        Ok(())
    }
}
