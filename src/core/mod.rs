//! Core business logic - framework-agnostic quoting operations.
//!
//! Everything here takes a database connection and returns plain data, so the bot
//! layer and the exporters only format what these modules produce.

/// Layout and pricing calculation
pub mod calculator;
/// Products, prices and sellers
pub mod catalog;
/// Proposal number format and per-year allocation
pub mod proposal;
/// Saving and reading quotes
pub mod quote;
/// Bulk CSV/JSON export of stored data
pub mod report;
