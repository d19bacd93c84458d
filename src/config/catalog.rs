//! Catalog seed configuration loading from config.toml
//!
//! The sellers and products listed in config.toml are inserted on first run (see
//! [`crate::core::catalog::seed_catalog`]). Each product may carry its initial price in
//! a nested `[products.price]` table.

use crate::{
    core::catalog::NewProduct,
    entities::{ApplicationCategory, ProductLine},
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;

/// Catalog shipped with the application; identical to the repository's config.toml.
const BUNDLED_CONFIG: &str = include_str!("../../config.toml");

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// Sellers to seed
    #[serde(default)]
    pub sellers: Vec<SellerConfig>,
    /// Products to seed
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// A seller entry
#[derive(Debug, Clone, Deserialize)]
pub struct SellerConfig {
    /// Seller display name
    pub name: String,
}

/// A product entry
#[derive(Debug, Clone, Deserialize)]
pub struct ProductConfig {
    /// Commercial model name
    pub model: String,
    /// `Rental` or `Fixa`
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
    /// Application category
    pub application: ApplicationCategory,
    /// Initial price
    pub price: Option<PriceConfig>,
}

/// Initial price of a product
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PriceConfig {
    /// Price per cabinet
    pub unit_value: f64,
    /// Flat accessories price
    pub accessories_value: f64,
}

impl ProductConfig {
    /// Product attributes for insertion.
    #[must_use]
    pub fn to_new_product(&self) -> NewProduct {
        NewProduct {
            model: self.model.clone(),
            line: self.line,
            pixel_pitch: self.pixel_pitch,
            cabinet: self.cabinet.clone(),
            weight_kg: self.weight_kg,
            power_w: self.power_w,
            brightness_nits: self.brightness_nits,
            voltage: self.voltage.clone(),
            lifetime_hours: self.lifetime_hours,
            ip_rating: self.ip_rating.clone(),
            warranty_months: self.warranty_months,
            accessories: self.accessories.clone(),
            application: self.application,
        }
    }
}

fn parse_config(contents: &str, origin: &str) -> Result<CatalogConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {origin}: {e}"),
    })
}

/// Loads catalog configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing or an enum value is unknown
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;

    parse_config(&contents, &path.display().to_string())
}

/// Loads catalog configuration from `CONFIG_PATH`, defaulting to ./config.toml
pub fn load_default_config() -> Result<CatalogConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}

/// The catalog bundled into the binary at build time.
pub fn default_catalog_config() -> Result<CatalogConfig> {
    parse_config(BUNDLED_CONFIG, "bundled config.toml")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_catalog_config() {
        let toml_str = r#"
            [[sellers]]
            name = "Ana Costa"

            [[products]]
            model = "P3.0 Indoor Fixo"
            line = "Fixa"
            pixel_pitch = 3.0
            cabinet = "960×960mm"
            weight_kg = 14.5
            power_w = 180.0
            brightness_nits = 800.0
            voltage = "110-220V"
            lifetime_hours = 100000
            ip_rating = "IP30"
            warranty_months = 36
            application = "Indoor Fixo"

            [products.price]
            unit_value = 1300.0
            accessories_value = 700.0
        "#;

        let config: CatalogConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sellers[0].name, "Ana Costa");

        let product = &config.products[0];
        assert_eq!(product.line, ProductLine::Fixed);
        assert_eq!(product.application, ApplicationCategory::IndoorFixed);
        assert_eq!(product.accessories, "");
        assert_eq!(product.price.unwrap().unit_value, 1300.0);
        assert_eq!(product.to_new_product().pixel_pitch, 3.0);
    }

    #[test]
    fn test_unknown_application_is_config_error() {
        let toml_str = r#"
            [[products]]
            model = "P9"
            line = "Rental"
            pixel_pitch = 9.0
            cabinet = "x"
            weight_kg = 1.0
            power_w = 1.0
            brightness_nits = 1.0
            voltage = "220V"
            lifetime_hours = 1
            ip_rating = "IP00"
            warranty_months = 1
            application = "Ceiling"
        "#;

        let result = parse_config(toml_str, "test");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_bundled_catalog() -> Result<()> {
        let config = default_catalog_config()?;
        assert_eq!(config.sellers.len(), 4);
        assert_eq!(config.products.len(), 8);
        assert!(config.products.iter().all(|p| p.price.is_some()));

        let p4 = config
            .products
            .iter()
            .find(|p| p.model == "P4.0 Outdoor Rental")
            .unwrap();
        assert_eq!(p4.price.unwrap().unit_value, 1800.0);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = load_config("/definitely/not/here/config.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
