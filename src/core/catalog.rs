//! Catalog business logic - products, prices and sellers.
//!
//! This is the reference data quotes are calculated from. A product is looked up by its
//! `(application, pixel_pitch)` pair, which must be unique across the catalog; the price
//! used is always the most recently registered one for that product.

use crate::{
    config::catalog::CatalogConfig,
    entities::{
        ApplicationCategory, Price, Product, ProductLine, Seller, price, product, seller,
    },
    errors::{Error, FieldIssue, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Attributes of a product to be registered.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewProduct {
    /// Commercial model name
    pub model: String,
    /// Product line
    pub line: ProductLine,
    /// Pixel pitch in millimeters
    pub pixel_pitch: f64,
    /// Cabinet size descriptor
    pub cabinet: String,
    /// Cabinet weight in kilograms
    pub weight_kg: f64,
    /// Power draw in watts
    pub power_w: f64,
    /// Brightness in nits
    pub brightness_nits: f64,
    /// Supply voltage descriptor
    pub voltage: String,
    /// Rated lifetime in hours
    pub lifetime_hours: i64,
    /// Ingress protection rating
    pub ip_rating: String,
    /// Warranty in months
    pub warranty_months: i32,
    /// Bundled accessories
    #[serde(default)]
    pub accessories: String,
    /// Application category served
    pub application: ApplicationCategory,
}

impl NewProduct {
    fn validate(&self) -> Result<()> {
        let mut issues = Vec::new();

        if self.model.trim().is_empty() {
            issues.push(FieldIssue::new("model", "cannot be empty"));
        }
        if !self.pixel_pitch.is_finite() || self.pixel_pitch <= 0.0 {
            issues.push(FieldIssue::new("pixel_pitch", "must be a positive number"));
        }
        for (field, value) in [
            ("weight_kg", self.weight_kg),
            ("power_w", self.power_w),
            ("brightness_nits", self.brightness_nits),
        ] {
            if !value.is_finite() || value < 0.0 {
                issues.push(FieldIssue::new(field, "must be a non-negative number"));
            }
        }
        if self.lifetime_hours < 0 {
            issues.push(FieldIssue::new("lifetime_hours", "cannot be negative"));
        }
        if self.warranty_months < 0 {
            issues.push(FieldIssue::new("warranty_months", "cannot be negative"));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidInput { issues })
        }
    }
}

/// Counts of rows inserted by [`seed_catalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Sellers inserted
    pub sellers: usize,
    /// Products inserted
    pub products: usize,
    /// Prices inserted
    pub prices: usize,
}

/// Retrieves every product ordered by pixel pitch, then model.
pub async fn list_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::PixelPitch)
        .order_by_asc(product::Column::Model)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the products that serve one application, ordered by pixel pitch.
pub async fn list_products_for_application(
    db: &DatabaseConnection,
    application: ApplicationCategory,
) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::Application.eq(application))
        .order_by_asc(product::Column::PixelPitch)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds the product for an application and exact pixel pitch.
pub async fn find_product<C>(
    db: &C,
    application: ApplicationCategory,
    pixel_pitch: f64,
) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::Application.eq(application))
        .filter(product::Column::PixelPitch.eq(pixel_pitch))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product by its ID.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Registers a new product.
///
/// # Errors
/// Returns [`Error::InvalidInput`] for blank or out-of-range attributes and
/// [`Error::Conflict`] when the application already has a product with that pixel pitch.
pub async fn create_product<C>(db: &C, new: NewProduct) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    new.validate()?;

    if let Some(existing) = find_product(db, new.application, new.pixel_pitch).await? {
        return Err(Error::Conflict {
            message: format!(
                "'{}' already covers {} at {}mm",
                existing.model, new.application, new.pixel_pitch
            ),
        });
    }

    let product = product::ActiveModel {
        model: Set(new.model.trim().to_string()),
        line: Set(new.line),
        pixel_pitch: Set(new.pixel_pitch),
        cabinet: Set(new.cabinet),
        weight_kg: Set(new.weight_kg),
        power_w: Set(new.power_w),
        brightness_nits: Set(new.brightness_nits),
        voltage: Set(new.voltage),
        lifetime_hours: Set(new.lifetime_hours),
        ip_rating: Set(new.ip_rating),
        warranty_months: Set(new.warranty_months),
        accessories: Set(new.accessories),
        application: Set(new.application),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Finds the price currently in force for a product (the most recent row).
pub async fn find_price<C>(db: &C, product_id: i64) -> Result<Option<price::Model>>
where
    C: ConnectionTrait,
{
    Price::find()
        .filter(price::Column::ProductId.eq(product_id))
        .order_by_desc(price::Column::CreatedAt)
        .order_by_desc(price::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every price row, newest first.
pub async fn list_prices(db: &DatabaseConnection) -> Result<Vec<price::Model>> {
    Price::find()
        .order_by_desc(price::Column::CreatedAt)
        .order_by_desc(price::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Registers a new price for a product, superseding earlier ones.
///
/// # Errors
/// Returns [`Error::InvalidInput`] for negative or non-finite values or an unknown product.
pub async fn create_price<C>(
    db: &C,
    product_id: i64,
    unit_value: f64,
    accessories_value: f64,
) -> Result<price::Model>
where
    C: ConnectionTrait,
{
    let mut issues = Vec::new();
    for (field, value) in [
        ("unit_value", unit_value),
        ("accessories_value", accessories_value),
    ] {
        if !value.is_finite() || value < 0.0 {
            issues.push(FieldIssue::new(field, "must be a non-negative number"));
        }
    }
    if !issues.is_empty() {
        return Err(Error::InvalidInput { issues });
    }

    let product = get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::invalid("product_id", format!("no product with id {product_id}")))?;

    let price = price::ActiveModel {
        product_id: Set(product.id),
        unit_value: Set(unit_value),
        accessories_value: Set(accessories_value),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    price.insert(db).await.map_err(Into::into)
}

/// Retrieves every seller ordered by name.
pub async fn list_sellers(db: &DatabaseConnection) -> Result<Vec<seller::Model>> {
    Seller::find()
        .order_by_asc(seller::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a seller by ID.
pub async fn get_seller_by_id<C>(db: &C, seller_id: i64) -> Result<Option<seller::Model>>
where
    C: ConnectionTrait,
{
    Seller::find_by_id(seller_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a seller by exact (trimmed) name.
pub async fn get_seller_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<seller::Model>> {
    Seller::find()
        .filter(seller::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Registers a seller.
///
/// # Errors
/// Returns [`Error::InvalidInput`] if the name is blank.
pub async fn create_seller<C>(db: &C, name: &str) -> Result<seller::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid("name", "seller name cannot be empty"));
    }

    let seller = seller::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    seller.insert(db).await.map_err(Into::into)
}

/// Inserts the configured sellers and products when their tables are empty.
///
/// Everything is inserted in one transaction, so a bad entry leaves the tables empty
/// and the next start seeds again. Running it against a populated database inserts
/// nothing.
#[instrument(skip_all)]
pub async fn seed_catalog(db: &DatabaseConnection, config: &CatalogConfig) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();
    let txn = db.begin().await?;

    if Seller::find().count(&txn).await? == 0 {
        for seller in &config.sellers {
            create_seller(&txn, &seller.name).await?;
            summary.sellers += 1;
        }
    }

    if Product::find().count(&txn).await? == 0 {
        for entry in &config.products {
            let product = create_product(&txn, entry.to_new_product()).await?;
            summary.products += 1;

            if let Some(price) = &entry.price {
                create_price(&txn, product.id, price.unit_value, price.accessories_value)
                    .await?;
                summary.prices += 1;
            }
        }
    }

    txn.commit().await?;

    info!(
        sellers = summary.sellers,
        products = summary.products,
        prices = summary.prices,
        "Catalog seed finished"
    );
    Ok(summary)
}
