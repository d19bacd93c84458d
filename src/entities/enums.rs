//! Enumerations shared by several entities.
//!
//! All of them are persisted as strings so the database stays readable and matches the
//! catalog spelling used by the sales team (`"Indoor Fixo"`, `"Sem DIFAL"`, ...).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Installation the panel is meant for. Together with the pixel pitch it selects a product.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ApplicationCategory {
    /// Indoor rental (events, stages)
    #[sea_orm(string_value = "Indoor Rental")]
    #[serde(rename = "Indoor Rental")]
    IndoorRental,
    /// Outdoor rental
    #[sea_orm(string_value = "Outdoor Rental")]
    #[serde(rename = "Outdoor Rental")]
    OutdoorRental,
    /// Indoor permanent installation
    #[sea_orm(string_value = "Indoor Fixo")]
    #[serde(rename = "Indoor Fixo", alias = "Indoor Fixed")]
    IndoorFixed,
    /// Outdoor permanent installation
    #[sea_orm(string_value = "Outdoor Fixo")]
    #[serde(rename = "Outdoor Fixo", alias = "Outdoor Fixed")]
    OutdoorFixed,
}

impl ApplicationCategory {
    /// Every category, in catalog order.
    pub const ALL: [Self; 4] = [
        Self::IndoorRental,
        Self::OutdoorRental,
        Self::IndoorFixed,
        Self::OutdoorFixed,
    ];

    /// Catalog spelling of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IndoorRental => "Indoor Rental",
            Self::OutdoorRental => "Outdoor Rental",
            Self::IndoorFixed => "Indoor Fixo",
            Self::OutdoorFixed => "Outdoor Fixo",
        }
    }
}

impl fmt::Display for ApplicationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "indoor rental" => Ok(Self::IndoorRental),
            "outdoor rental" => Ok(Self::OutdoorRental),
            "indoor fixo" | "indoor fixed" => Ok(Self::IndoorFixed),
            "outdoor fixo" | "outdoor fixed" => Ok(Self::OutdoorFixed),
            _ => Err(format!(
                "Invalid application: {s}. Use Indoor Rental, Outdoor Rental, Indoor Fixo or Outdoor Fixo"
            )),
        }
    }
}

/// Product line. Decides cabinet module size and grid rounding policy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ProductLine {
    /// 0.50 m x 1.00 m cabinets, grid rounded up
    #[sea_orm(string_value = "Rental")]
    Rental,
    /// 0.96 m x 0.96 m cabinets, grid rounded to nearest
    #[sea_orm(string_value = "Fixa")]
    #[serde(rename = "Fixa", alias = "Fixed")]
    Fixed,
}

impl fmt::Display for ProductLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rental => f.write_str("Rental"),
            Self::Fixed => f.write_str("Fixa"),
        }
    }
}

impl FromStr for ProductLine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rental" => Ok(Self::Rental),
            "fixa" | "fixo" | "fixed" => Ok(Self::Fixed),
            _ => Err(format!("Invalid product line: {s}. Use Rental or Fixa")),
        }
    }
}

/// Tax regime of the quote. `WithoutDifal` carries the fixed 15% discount.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum TaxRegime {
    /// Inter-state tax differential applies; no discount
    #[sea_orm(string_value = "Com DIFAL")]
    #[serde(rename = "Com DIFAL")]
    WithDifal,
    /// No DIFAL; total is discounted
    #[sea_orm(string_value = "Sem DIFAL")]
    #[serde(rename = "Sem DIFAL")]
    WithoutDifal,
}

impl fmt::Display for TaxRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WithDifal => f.write_str("Com DIFAL"),
            Self::WithoutDifal => f.write_str("Sem DIFAL"),
        }
    }
}

impl FromStr for TaxRegime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "com difal" | "withdifal" | "with difal" => Ok(Self::WithDifal),
            "sem difal" | "withoutdifal" | "without difal" => Ok(Self::WithoutDifal),
            _ => Err(format!("Invalid tax regime: {s}. Use Com DIFAL or Sem DIFAL")),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_application_parsing_accepts_both_spellings() {
        assert_eq!(
            "Indoor Fixo".parse::<ApplicationCategory>().unwrap(),
            ApplicationCategory::IndoorFixed
        );
        assert_eq!(
            "outdoor fixed".parse::<ApplicationCategory>().unwrap(),
            ApplicationCategory::OutdoorFixed
        );
        assert!("Ceiling".parse::<ApplicationCategory>().is_err());
    }

    #[test]
    fn test_display_matches_catalog_spelling() {
        for app in ApplicationCategory::ALL {
            assert_eq!(app.to_string().parse::<ApplicationCategory>().unwrap(), app);
        }
        assert_eq!(ProductLine::Fixed.to_string(), "Fixa");
        assert_eq!(TaxRegime::WithoutDifal.to_string(), "Sem DIFAL");
        assert_eq!("com difal".parse::<TaxRegime>().unwrap(), TaxRegime::WithDifal);
    }
}
