//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating catalog entries and quotes with sensible defaults.

use crate::{
    config::catalog::default_catalog_config,
    core::{
        calculator::QuoteRequest,
        catalog::{self, NewProduct},
        quote::{self, QuoteDetails, QuoteDraft},
    },
    entities::{self, ApplicationCategory, ProductLine, TaxRegime},
    errors::Result,
};
use chrono::{TimeZone, Utc};
use sea_orm::{ConnectOptions, DatabaseConnection};
use std::path::Path;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// In-memory database seeded with the bundled catalog: four sellers and eight priced
/// products covering every application at 2.5/3.0mm (indoor) and 4.0/5.0mm (outdoor).
pub async fn setup_with_catalog() -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;
    catalog::seed_catalog(&db, &default_catalog_config()?).await?;
    Ok(db)
}

/// File-backed database at `path` with a pool of `max_connections`, seeded with the
/// bundled catalog. Unlike `sqlite::memory:`, which gets a single connection, writers on
/// this pool really run side by side.
pub async fn setup_file_db(path: &Path, max_connections: u32) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    options
        .max_connections(max_connections)
        .min_connections(max_connections)
        .sqlx_logging(false);
    let db = sea_orm::Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    catalog::seed_catalog(&db, &default_catalog_config()?).await?;
    Ok(db)
}

/// Creates a seller.
pub async fn create_test_seller(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::seller::Model> {
    catalog::create_seller(db, name).await
}

/// Product attributes for `application` at `pixel_pitch`, with the line matching the
/// application.
#[must_use]
pub fn sample_new_product(application: ApplicationCategory, pixel_pitch: f64) -> NewProduct {
    let line = match application {
        ApplicationCategory::IndoorRental | ApplicationCategory::OutdoorRental => {
            ProductLine::Rental
        }
        ApplicationCategory::IndoorFixed | ApplicationCategory::OutdoorFixed => ProductLine::Fixed,
    };
    let cabinet = match line {
        ProductLine::Rental => "500×1000mm",
        ProductLine::Fixed => "960×960mm",
    };

    NewProduct {
        model: format!("P{pixel_pitch} {application}"),
        line,
        pixel_pitch,
        cabinet: cabinet.to_string(),
        weight_kg: 10.0,
        power_w: 150.0,
        brightness_nits: 1000.0,
        voltage: "110-220V".to_string(),
        lifetime_hours: 100_000,
        ip_rating: "IP31".to_string(),
        warranty_months: 24,
        accessories: "Cabo de sinal".to_string(),
        application,
    }
}

/// Creates a product and gives it a price.
pub async fn create_test_product_with_price(
    db: &DatabaseConnection,
    application: ApplicationCategory,
    pixel_pitch: f64,
    unit_value: f64,
    accessories_value: f64,
) -> Result<(entities::product::Model, entities::price::Model)> {
    let product = catalog::create_product(db, sample_new_product(application, pixel_pitch)).await?;
    let price = catalog::create_price(db, product.id, unit_value, accessories_value).await?;
    Ok((product, price))
}

/// Builds a request.
#[must_use]
pub const fn sample_request(
    application: ApplicationCategory,
    pixel_pitch: f64,
    nominal_width: f64,
    nominal_height: f64,
    tax_regime: TaxRegime,
) -> QuoteRequest {
    QuoteRequest {
        application,
        pixel_pitch,
        nominal_width,
        nominal_height,
        tax_regime,
    }
}

/// Saves a 6 x 3 m P2.5 Indoor Fixo quote without DIFAL for "Cliente <Teste> & Cia",
/// issued by João Silva on 16/10/2026. Requires [`setup_with_catalog`].
pub async fn save_sample_quote(db: &DatabaseConnection) -> Result<QuoteDetails> {
    let seller = catalog::get_seller_by_name(db, "João Silva")
        .await?
        .ok_or_else(|| crate::errors::Error::SellerNotFound {
            seller: "João Silva".to_string(),
        })?;
    let draft = QuoteDraft {
        request: sample_request(
            ApplicationCategory::IndoorFixed,
            2.5,
            6.0,
            3.0,
            TaxRegime::WithoutDifal,
        ),
        seller_id: seller.id,
        client_name: Some("Cliente <Teste> & Cia".to_string()),
    };
    let issued = Utc
        .with_ymd_and_hms(2026, 10, 16, 14, 0, 0)
        .single()
        .ok_or_else(|| crate::errors::Error::invalid("created_at", "ambiguous time"))?;
    quote::save_quote_at(db, &draft, issued).await
}
