/// Catalog seed loading from config.toml
pub mod catalog;

/// Database configuration and connection management
pub mod database;

/// PDF renderer settings from environment variables
pub mod renderer;
