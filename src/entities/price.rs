//! Price entity - Monetary terms for one product.
//!
//! Prices are append-only: a new row supersedes older ones, and quoting always uses the
//! most recently created row for the product.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Price database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prices")]
pub struct Model {
    /// Unique identifier for the price row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product this price applies to
    pub product_id: i64,
    /// Price of one cabinet
    pub unit_value: f64,
    /// Flat accessories/installation price added once per quote
    pub accessories_value: f64,
    /// When the price was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Price and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each price belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
