//! Unified error types and result handling.
//!
//! Every failure in the crate is an [`Error`]. Callers at the bot boundary use
//! [`Error::kind`] to decide how to present it: input problems and missing records are
//! reported back to the user, conflicts are retried, and external failures are logged.

use sea_orm::{DbErr, SqlErr};
use std::fmt;
use thiserror::Error;

/// A single rejected request field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Name of the offending field (e.g. `nominal_width`)
    pub field: &'static str,
    /// Human-readable explanation
    pub message: String,
}

impl FieldIssue {
    /// Creates a new issue for `field`.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Coarse classification of errors, used to decide how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, malformed or non-positive request data
    InvalidInput,
    /// A product, price, seller or quote does not exist
    NotFound,
    /// A concurrent writer claimed the same unique value
    Conflict,
    /// Storage, rendering, configuration or framework failure
    ExternalFailure,
}

/// Application error type.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more request fields were rejected
    #[error("Invalid input: {}", format_issues(.issues))]
    InvalidInput {
        /// Every field that failed validation
        issues: Vec<FieldIssue>,
    },

    /// No product matches the requested application and pixel pitch
    #[error("No product found for application '{application}' with pixel pitch {pixel_pitch}mm")]
    ProductNotFound {
        /// Application category as displayed
        application: String,
        /// Requested pixel pitch in millimeters
        pixel_pitch: f64,
    },

    /// The product exists but has no price row
    #[error("No price registered for product {product_id}")]
    PriceNotFound {
        /// Product without a price
        product_id: i64,
    },

    /// Seller lookup failed
    #[error("Seller not found: {seller}")]
    SellerNotFound {
        /// Seller id or name that was looked up
        seller: String,
    },

    /// Quote lookup failed
    #[error("Quote not found: {id}")]
    QuoteNotFound {
        /// Quote id or proposal number that was looked up
        id: String,
    },

    /// Unique value already taken by a concurrent writer
    #[error("Conflict: {message}")]
    Conflict {
        /// What collided
        message: String,
    },

    /// The per-year proposal sequence no longer fits in four digits
    #[error("Proposal sequence exhausted for year {year}")]
    SequenceExhausted {
        /// Year whose sequence overflowed
        year: i32,
    },

    /// Spreadsheet or PDF generation failed
    #[error("Export error: {message}")]
    Export {
        /// Renderer failure details
        message: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Details
        message: String,
    },

    /// Storage failure
    #[error("Database error: {0}")]
    Database(String),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Serenity/Poise failure
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Builds an `InvalidInput` error for a single field.
    #[must_use]
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            issues: vec![FieldIssue::new(field, message)],
        }
    }

    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::ProductNotFound { .. }
            | Self::PriceNotFound { .. }
            | Self::SellerNotFound { .. }
            | Self::QuoteNotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } | Self::SequenceExhausted { .. } => ErrorKind::Conflict,
            Self::Export { .. }
            | Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::Framework(_) => ErrorKind::ExternalFailure,
        }
    }

    /// Whether repeating the failed operation may succeed.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<DbErr> for Error {
    fn from(value: DbErr) -> Self {
        match value.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => Self::Conflict { message },
            _ => Self::Database(value.to_string()),
        }
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export {
            message: format!("spreadsheet: {value}"),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Self::Export {
            message: format!("csv: {value}"),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Export {
            message: format!("json: {value}"),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_lists_every_field() {
        let err = Error::InvalidInput {
            issues: vec![
                FieldIssue::new("nominal_width", "must be positive"),
                FieldIssue::new("pixel_pitch", "must be a finite number"),
            ],
        };

        let text = err.to_string();
        assert!(text.contains("nominal_width: must be positive"));
        assert!(text.contains("pixel_pitch: must be a finite number"));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::PriceNotFound { product_id: 1 }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            Error::QuoteNotFound { id: "7".into() }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            Error::Export {
                message: "boom".into()
            }
            .kind(),
            ErrorKind::ExternalFailure
        );
        assert_eq!(
            Error::SequenceExhausted { year: 2026 }.kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_only_conflict_is_retriable() {
        assert!(
            Error::Conflict {
                message: "quotes.proposal_number".into()
            }
            .is_retriable()
        );
        assert!(!Error::SequenceExhausted { year: 2026 }.is_retriable());
        assert!(!Error::invalid("nominal_height", "must be positive").is_retriable());
    }

    #[test]
    fn test_plain_db_error_maps_to_database() {
        let err: Error = DbErr::Custom("disk on fire".into()).into();
        assert!(matches!(err, Error::Database(_)));
        assert_eq!(err.kind(), ErrorKind::ExternalFailure);
    }
}
