//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod enums;
pub mod price;
pub mod product;
pub mod proposal_counter;
pub mod quote;
pub mod seller;

pub use enums::{ApplicationCategory, ProductLine, TaxRegime};

// Re-export specific types to avoid conflicts
pub use price::{Column as PriceColumn, Entity as Price, Model as PriceModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use proposal_counter::{
    Column as ProposalCounterColumn, Entity as ProposalCounter, Model as ProposalCounterModel,
};
pub use quote::{Column as QuoteColumn, Entity as Quote, Model as QuoteModel};
pub use seller::{Column as SellerColumn, Entity as Seller, Model as SellerModel};
