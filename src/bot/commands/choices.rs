//! Slash command choice lists mirroring the domain enums.

use crate::{
    core::report::ExportKind,
    entities::{ApplicationCategory, TaxRegime},
    export::ExportFormat,
};

/// Application category picker
#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum ApplicationChoice {
    /// Indoor rental
    #[name = "Indoor Rental"]
    IndoorRental,
    /// Outdoor rental
    #[name = "Outdoor Rental"]
    OutdoorRental,
    /// Indoor permanent installation
    #[name = "Indoor Fixo"]
    IndoorFixed,
    /// Outdoor permanent installation
    #[name = "Outdoor Fixo"]
    OutdoorFixed,
}

impl From<ApplicationChoice> for ApplicationCategory {
    fn from(choice: ApplicationChoice) -> Self {
        match choice {
            ApplicationChoice::IndoorRental => Self::IndoorRental,
            ApplicationChoice::OutdoorRental => Self::OutdoorRental,
            ApplicationChoice::IndoorFixed => Self::IndoorFixed,
            ApplicationChoice::OutdoorFixed => Self::OutdoorFixed,
        }
    }
}

/// Tax regime picker
#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum TaxChoice {
    /// DIFAL applies
    #[name = "Com DIFAL"]
    WithDifal,
    /// No DIFAL, 15% discount
    #[name = "Sem DIFAL"]
    WithoutDifal,
}

impl From<TaxChoice> for TaxRegime {
    fn from(choice: TaxChoice) -> Self {
        match choice {
            TaxChoice::WithDifal => Self::WithDifal,
            TaxChoice::WithoutDifal => Self::WithoutDifal,
        }
    }
}

/// Proposal document format picker
#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum DocumentChoice {
    /// Excel workbook
    #[name = "xlsx"]
    Xlsx,
    /// PDF document
    #[name = "pdf"]
    Pdf,
}

impl From<DocumentChoice> for ExportFormat {
    fn from(choice: DocumentChoice) -> Self {
        match choice {
            DocumentChoice::Xlsx => Self::Xlsx,
            DocumentChoice::Pdf => Self::Pdf,
        }
    }
}

/// Bulk export dataset picker
#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum DatasetChoice {
    /// Saved quotes
    #[name = "quotes"]
    Quotes,
    /// Catalog products
    #[name = "products"]
    Products,
    /// Sellers
    #[name = "sellers"]
    Sellers,
}

impl From<DatasetChoice> for ExportKind {
    fn from(choice: DatasetChoice) -> Self {
        match choice {
            DatasetChoice::Quotes => Self::Quotes,
            DatasetChoice::Products => Self::Products,
            DatasetChoice::Sellers => Self::Sellers,
        }
    }
}

/// Bulk export file format picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum DataFormatChoice {
    /// Comma separated values
    #[name = "csv"]
    Csv,
    /// JSON array
    #[name = "json"]
    Json,
}
