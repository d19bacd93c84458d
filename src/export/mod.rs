//! Document exporters - proposal spreadsheets and PDFs built from stored quotes.

/// pt-BR number and date formatting
pub mod format;
/// HTML proposal and headless PDF rendering
pub mod pdf;
/// XLSX proposal workbook
pub mod spreadsheet;

use crate::{
    core::quote::{self, QuoteDetails},
    errors::{Error, Result},
};
use pdf::PdfRenderer;
use sea_orm::DatabaseConnection;
use std::{fmt, str::FromStr};
use tracing::{error, info, instrument};

/// Output format of a proposal document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Excel workbook
    Xlsx,
    /// PDF document
    Pdf,
}

impl ExportFormat {
    /// Download name for a proposal, e.g. `proposta_2026000110.xlsx`.
    #[must_use]
    pub fn file_name(self, proposal_number: &str) -> String {
        format!("proposta_{proposal_number}.{}", self.extension())
    }

    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    /// MIME type of the rendered bytes.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "pdf" => Ok(Self::Pdf),
            _ => Err(format!("Invalid export format: {s}. Use xlsx or pdf")),
        }
    }
}

/// A rendered proposal ready to be sent or saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    /// Suggested file name
    pub file_name: String,
    /// MIME type of `bytes`
    pub mime_type: &'static str,
    /// Document contents
    pub bytes: Vec<u8>,
}

/// Renders an already loaded quote.
///
/// # Errors
/// Returns [`Error::Export`] when the workbook or PDF cannot be produced.
#[instrument(skip(details, renderer), fields(proposal_number = %details.quote.proposal_number))]
pub async fn render_document<R>(
    details: &QuoteDetails,
    format: ExportFormat,
    renderer: &R,
) -> Result<ExportedDocument>
where
    R: PdfRenderer,
{
    let rendered = match format {
        ExportFormat::Xlsx => spreadsheet::render_quote_workbook(details),
        ExportFormat::Pdf => {
            renderer
                .render_pdf(&pdf::render_proposal_html(details))
                .await
        }
    };

    match rendered {
        Ok(bytes) => {
            info!(%format, bytes = bytes.len(), "Exported proposal");
            Ok(ExportedDocument {
                file_name: format.file_name(&details.quote.proposal_number),
                mime_type: format.mime_type(),
                bytes,
            })
        }
        Err(e) => {
            error!(%format, error = %e, "Proposal export failed");
            Err(e)
        }
    }
}

/// Loads a stored quote and renders it.
///
/// # Errors
/// Returns [`Error::QuoteNotFound`] for an unknown quote or [`Error::Export`] when
/// rendering fails.
pub async fn export_quote<R>(
    db: &DatabaseConnection,
    renderer: &R,
    quote_id: i64,
    format: ExportFormat,
) -> Result<ExportedDocument>
where
    R: PdfRenderer,
{
    let details = quote::get_quote_details(db, quote_id).await?;
    render_document(&details, format, renderer).await
}
