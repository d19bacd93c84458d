//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Catalog commands (products, sellers)
pub mod catalog;

/// Choice lists for slash command parameters
pub mod choices;

/// General utility commands
pub mod general;

/// Quote commands (calculate, save, list, export)
pub mod quote;

// Export commands
pub use catalog::*;
pub use general::*;
pub use quote::*;
