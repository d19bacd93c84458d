//! Product entity - One LED cabinet type from the catalog.
//!
//! A product is identified for quoting purposes by its `(application, pixel_pitch)` pair.
//! The catalog is seed data; products are only read while quotes are calculated.

use super::enums::{ApplicationCategory, ProductLine};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Commercial model name (e.g., "P4.0 Outdoor Rental")
    pub model: String,
    /// Product line; decides the cabinet module size
    pub line: ProductLine,
    /// Distance between pixels in millimeters
    pub pixel_pitch: f64,
    /// Physical cabinet size descriptor (e.g., "500×1000mm")
    pub cabinet: String,
    /// Cabinet weight in kilograms
    pub weight_kg: f64,
    /// Power draw per cabinet in watts
    pub power_w: f64,
    /// Brightness in nits
    pub brightness_nits: f64,
    /// Supply voltage descriptor (e.g., "110-220V")
    pub voltage: String,
    /// Rated lifetime in hours
    pub lifetime_hours: i64,
    /// Ingress protection rating (e.g., "IP65")
    pub ip_rating: String,
    /// Warranty period in months
    pub warranty_months: i32,
    /// Bundled accessories description
    pub accessories: String,
    /// Application category this product serves
    pub application: ApplicationCategory,
    /// When the product was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A product may be priced many times over its life
    #[sea_orm(has_many = "super::price::Entity")]
    Price,
    /// Quotes referencing this product
    #[sea_orm(has_many = "super::quote::Entity")]
    Quote,
}

impl Related<super::price::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Price.def()
    }
}

impl Related<super::quote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
