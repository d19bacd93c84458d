//! Quote entity - The persisted result of one layout and pricing calculation.
//!
//! A quote stores both the request that produced it and every computed value, so it can
//! be rendered later without touching the catalog. Rows are written once and never
//! updated.

use super::enums::{ApplicationCategory, TaxRegime};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Quote database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quotes")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// `YYYY` + 4-digit sequence + `MM`, unique across all quotes
    #[sea_orm(unique)]
    pub proposal_number: String,
    /// Tax regime requested
    pub tax_regime: TaxRegime,
    /// Application category requested
    pub application: ApplicationCategory,
    /// Pixel pitch requested, in millimeters
    pub pixel_pitch: f64,
    /// Seller who issued the quote
    pub seller_id: i64,
    /// Optional end-customer name
    pub client_name: Option<String>,
    /// Requested width in meters
    pub nominal_width: f64,
    /// Requested height in meters
    pub nominal_height: f64,
    /// Cabinets across
    pub width_cabinets: i32,
    /// Cabinets down
    pub height_cabinets: i32,
    /// `width_cabinets * height_cabinets`
    pub total_cabinets: i32,
    /// Built width in meters
    pub real_width: f64,
    /// Built height in meters
    pub real_height: f64,
    /// Horizontal panel resolution in pixels
    pub panel_resolution_h: i32,
    /// Vertical panel resolution in pixels
    pub panel_resolution_v: i32,
    /// Recommended horizontal source resolution
    pub video_resolution_h: i32,
    /// Recommended vertical source resolution
    pub video_resolution_v: i32,
    /// Cabinet price snapshot
    pub unit_value: f64,
    /// Accessories price snapshot
    pub accessories_value: f64,
    /// Cabinets times unit value plus accessories
    pub total_value: f64,
    /// Total after the tax-regime discount
    pub discounted_value: f64,
    /// Product the quote was calculated for
    pub product_id: i64,
    /// When the quote was saved
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Quote and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each quote belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    /// Each quote belongs to one seller
    #[sea_orm(
        belongs_to = "super::seller::Entity",
        from = "Column::SellerId",
        to = "super::seller::Column::Id"
    )]
    Seller,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::seller::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seller.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
