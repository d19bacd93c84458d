//! Quote Discord commands - calculating, saving, listing and exporting proposals.

use crate::{
    core::{calculator::QuoteCalculation, quote::QuoteDetails},
    entities::quote,
    errors::{Error, Result},
    export::format::{format_currency, format_date, format_integer, format_meters, format_plain},
};
use chrono::NaiveDate;

/// Default number of quotes shown by `/quotes`.
const DEFAULT_LIST_LIMIT: u64 = 10;
/// Upper bound for `/quotes` so the reply stays under Discord's message size.
const MAX_LIST_LIMIT: u64 = 25;

/// Parses a report date given as `YYYY-MM-DD` or `DD/MM/YYYY`.
///
/// # Errors
/// Returns [`Error::InvalidInput`] naming `field` when neither format matches.
pub fn parse_report_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .map_err(|_| Error::invalid(field, "expected YYYY-MM-DD or DD/MM/YYYY"))
}

/// Layout and price lines shared by the preview and the saved-quote reply.
fn summary_lines(
    (width_cabinets, height_cabinets, total_cabinets): (i32, i32, i32),
    real_width: f64,
    real_height: f64,
    resolution: (i32, i32),
    total_value: f64,
    discounted_value: f64,
) -> String {
    let mut text = format!(
        "Layout: {width_cabinets} × {height_cabinets} cabinets ({total_cabinets} total)\n\
         Real size: {}m × {}m\n\
         Resolution: {} × {} px\n\
         Total: {}",
        format_meters(real_width),
        format_meters(real_height),
        format_integer(i64::from(resolution.0)),
        format_integer(i64::from(resolution.1)),
        format_currency(total_value),
    );
    if (total_value - discounted_value).abs() > f64::EPSILON {
        text.push_str(&format!(
            "\nWith discount: {}",
            format_currency(discounted_value)
        ));
    }
    text
}

/// Preview text for an unsaved calculation.
#[must_use]
pub fn describe_calculation(calc: &QuoteCalculation) -> String {
    format!(
        "**{}**\n{}",
        calc.product.model,
        summary_lines(
            (calc.width_cabinets, calc.height_cabinets, calc.total_cabinets),
            calc.real_width,
            calc.real_height,
            (calc.panel_resolution_h, calc.panel_resolution_v),
            calc.total_value,
            calc.discounted_value,
        )
    )
}

/// Confirmation text for a saved quote.
#[must_use]
pub fn describe_saved_quote(details: &QuoteDetails) -> String {
    let q = &details.quote;
    let client = q
        .client_name
        .as_deref()
        .map(|c| format!(" for {c}"))
        .unwrap_or_default();
    format!(
        "✅ Proposal **{}** saved{client} by {} ({}).\n**{}** · {}\n{}",
        q.proposal_number,
        details.seller.name,
        format_date(q.created_at),
        details.product.model,
        q.tax_regime,
        summary_lines(
            (q.width_cabinets, q.height_cabinets, q.total_cabinets),
            q.real_width,
            q.real_height,
            (q.panel_resolution_h, q.panel_resolution_v),
            q.total_value,
            q.discounted_value,
        )
    )
}

/// One line of the `/quotes` listing.
#[must_use]
pub fn describe_quote_line(quote: &quote::Model) -> String {
    format!(
        "`{}` {} · P{} {} · {}×{}m · {}",
        quote.proposal_number,
        format_date(quote.created_at),
        format_plain(quote.pixel_pitch),
        quote.application,
        format_meters(quote.nominal_width),
        format_meters(quote.nominal_height),
        format_currency(quote.discounted_value),
    )
}

/// Clamps the requested listing size.
#[must_use]
pub fn list_limit(requested: Option<u32>) -> u64 {
    requested
        .map_or(DEFAULT_LIST_LIMIT, u64::from)
        .clamp(1, MAX_LIST_LIMIT)
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{
        describe_calculation, describe_quote_line, describe_saved_quote, format_plain,
        list_limit, parse_report_date,
    };
    use crate::{
        bot::{
            BotData,
            commands::choices::{
                ApplicationChoice, DataFormatChoice, DatasetChoice, DocumentChoice, TaxChoice,
            },
            handlers::autocomplete,
        },
        core::{
            calculator::QuoteRequest,
            catalog,
            quote::{self, QuoteDraft},
            report::{self, ExportFilters, ExportKind},
        },
        entities::ApplicationCategory,
        errors::{Error, Result},
        export::{self, ExportFormat},
    };
    use poise::serenity_prelude as serenity;

    fn build_request(
        application: ApplicationChoice,
        pixel_pitch: f64,
        width: f64,
        height: f64,
        tax: TaxChoice,
    ) -> QuoteRequest {
        QuoteRequest {
            application: ApplicationCategory::from(application),
            pixel_pitch,
            nominal_width: width,
            nominal_height: height,
            tax_regime: tax.into(),
        }
    }

    /// Adds the pitches that do exist for the application when a product lookup fails.
    async fn explain_missing_product(
        ctx: poise::Context<'_, BotData, Error>,
        error: Error,
    ) -> Result<()> {
        let category = match &error {
            Error::ProductNotFound { application, .. } => {
                application.parse::<ApplicationCategory>().ok()
            }
            _ => None,
        };
        if let Some(category) = category {
            let available =
                catalog::list_products_for_application(&ctx.data().database, category).await?;
            let pitches: Vec<String> = available
                .iter()
                .map(|p| format!("P{}", format_plain(p.pixel_pitch)))
                .collect();
            if !pitches.is_empty() {
                ctx.say(format!(
                    "❌ {error}. Available for {category}: {}",
                    pitches.join(", ")
                ))
                .await?;
                return Ok(());
            }
        }
        Err(error)
    }

    /// Previews the layout and price of a panel without saving anything.
    #[poise::command(slash_command)]
    pub async fn quote_calc(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Application category"] application: ApplicationChoice,
        #[description = "Pixel pitch in millimeters (e.g., 2.5)"] pixel_pitch: f64,
        #[description = "Desired width in meters"] width: f64,
        #[description = "Desired height in meters"] height: f64,
        #[description = "Tax regime"] tax: TaxChoice,
    ) -> Result<()> {
        let request = build_request(application, pixel_pitch, width, height, tax);

        match quote::resolve_and_calculate(&ctx.data().database, &request).await {
            Ok(calc) => {
                ctx.say(describe_calculation(&calc)).await?;
                Ok(())
            }
            Err(e @ Error::ProductNotFound { .. }) => explain_missing_product(ctx, e).await,
            Err(e) => Err(e),
        }
    }

    /// Calculates a quote and saves it under a new proposal number.
    #[poise::command(slash_command)]
    #[allow(clippy::too_many_arguments)]
    pub async fn quote_save(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Seller issuing the proposal"]
        #[autocomplete = "autocomplete::autocomplete_seller_name"]
        seller: String,
        #[description = "Application category"] application: ApplicationChoice,
        #[description = "Pixel pitch in millimeters (e.g., 2.5)"] pixel_pitch: f64,
        #[description = "Desired width in meters"] width: f64,
        #[description = "Desired height in meters"] height: f64,
        #[description = "Tax regime"] tax: TaxChoice,
        #[description = "Client name shown on the proposal"] client: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let seller_model = catalog::get_seller_by_name(db, &seller)
            .await?
            .ok_or_else(|| Error::SellerNotFound {
                seller: seller.trim().to_string(),
            })?;

        let draft = QuoteDraft {
            request: build_request(application, pixel_pitch, width, height, tax),
            seller_id: seller_model.id,
            client_name: client,
        };

        match quote::save_quote(db, &draft).await {
            Ok(details) => {
                ctx.say(describe_saved_quote(&details)).await?;
                Ok(())
            }
            Err(e @ Error::ProductNotFound { .. }) => explain_missing_product(ctx, e).await,
            Err(e) => Err(e),
        }
    }

    /// Shows the most recent saved proposals.
    #[poise::command(slash_command)]
    pub async fn quotes(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "How many to show (default 10, max 25)"] limit: Option<u32>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let quotes = quote::list_recent_quotes(db, list_limit(limit)).await?;

        if quotes.is_empty() {
            ctx.say("No proposals saved yet. Use `/quote_save` to create one.")
                .await?;
            return Ok(());
        }

        let total = quote::count_quotes(db).await?;
        let lines: Vec<String> = quotes.iter().map(describe_quote_line).collect();

        let list_embed = serenity::CreateEmbed::default()
            .title("Recent Proposals")
            .description(lines.join("\n"))
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{total} proposals in total"
            )))
            .color(0x0000_99FF);

        ctx.send(poise::CreateReply::default().embed(list_embed))
            .await?;
        Ok(())
    }

    /// Downloads a saved proposal as an Excel workbook or PDF.
    #[poise::command(slash_command)]
    pub async fn quote_export(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Proposal number"]
        #[autocomplete = "autocomplete::autocomplete_proposal_number"]
        number: String,
        #[description = "Document format"] format: DocumentChoice,
    ) -> Result<()> {
        // PDF rendering can take longer than the interaction deadline
        ctx.defer().await?;

        let details = quote::get_quote_details_by_number(&ctx.data().database, &number).await?;
        let document =
            export::render_document(&details, ExportFormat::from(format), &ctx.data().renderer)
                .await?;

        ctx.send(
            poise::CreateReply::default()
                .content(format!(
                    "📄 Proposal **{}**",
                    details.quote.proposal_number
                ))
                .attachment(serenity::CreateAttachment::bytes(
                    document.bytes,
                    document.file_name,
                )),
        )
        .await?;
        Ok(())
    }

    /// Exports quotes, products or sellers as CSV or JSON.
    #[poise::command(slash_command)]
    #[allow(clippy::too_many_arguments)]
    pub async fn quote_report(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "What to export"] kind: DatasetChoice,
        #[description = "File format"] format: DataFormatChoice,
        #[description = "First day included (YYYY-MM-DD or DD/MM/YYYY)"] from: Option<String>,
        #[description = "Last day included (YYYY-MM-DD or DD/MM/YYYY)"] to: Option<String>,
        #[description = "Only this application"] application: Option<ApplicationChoice>,
        #[description = "Only this tax regime"] tax: Option<TaxChoice>,
        #[description = "Only quotes issued by this seller"]
        #[autocomplete = "autocomplete::autocomplete_seller_name"]
        seller: Option<String>,
    ) -> Result<()> {
        ctx.defer().await?;
        let db = &ctx.data().database;

        let seller_id = match seller {
            Some(name) => Some(
                catalog::get_seller_by_name(db, &name)
                    .await?
                    .ok_or_else(|| Error::SellerNotFound {
                        seller: name.trim().to_string(),
                    })?
                    .id,
            ),
            None => None,
        };

        let filters = ExportFilters {
            from: from.as_deref().map(|v| parse_report_date("from", v)).transpose()?,
            to: to.as_deref().map(|v| parse_report_date("to", v)).transpose()?,
            application: application.map(ApplicationCategory::from),
            tax_regime: tax.map(Into::into),
            seller_id,
        };

        let kind = ExportKind::from(kind);
        let records = report::export_records(db, kind, &filters).await?;
        let (bytes, extension) = if format == DataFormatChoice::Csv {
            (report::records_to_csv(&records)?, "csv")
        } else {
            (report::records_to_json(&records)?, "json")
        };

        ctx.send(
            poise::CreateReply::default()
                .content(format!("📊 {} {kind} exported", records.len()))
                .attachment(serenity::CreateAttachment::bytes(
                    bytes,
                    format!("{kind}.{extension}"),
                )),
        )
        .await?;
        Ok(())
    }
}

pub use inner::*;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::quote::resolve_and_calculate,
        entities::{ApplicationCategory, TaxRegime},
        test_utils::*,
    };

    #[test]
    fn test_parse_report_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(parse_report_date("from", "2026-10-16").unwrap(), expected);
        assert_eq!(parse_report_date("from", " 16/10/2026 ").unwrap(), expected);

        let err = parse_report_date("to", "October 16").unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
        assert!(err.to_string().contains("to"));
    }

    #[test]
    fn test_list_limit_is_clamped() {
        assert_eq!(list_limit(None), 10);
        assert_eq!(list_limit(Some(0)), 1);
        assert_eq!(list_limit(Some(3)), 3);
        assert_eq!(list_limit(Some(500)), 25);
    }

    #[tokio::test]
    async fn test_describe_calculation_shows_discount_only_when_applied() -> Result<()> {
        let db = setup_with_catalog().await?;

        let with_difal = sample_request(
            ApplicationCategory::OutdoorRental,
            4.0,
            5.0,
            3.0,
            TaxRegime::WithDifal,
        );
        let text = describe_calculation(&resolve_and_calculate(&db, &with_difal).await?);
        assert!(text.contains("P4.0 Outdoor Rental"));
        assert!(text.contains("Layout: 10 × 3 cabinets (30 total)"));
        assert!(text.contains("Total: R$ 54.800,00"));
        assert!(!text.contains("With discount"));

        let request = sample_request(
            ApplicationCategory::OutdoorRental,
            4.0,
            5.0,
            3.0,
            TaxRegime::WithoutDifal,
        );
        let text = describe_calculation(&resolve_and_calculate(&db, &request).await?);
        assert!(text.contains("With discount: R$ 46.580,00"));
        Ok(())
    }

    #[tokio::test]
    async fn test_describe_saved_quote_and_listing() -> Result<()> {
        let db = setup_with_catalog().await?;
        let details = save_sample_quote(&db).await?;

        let text = describe_saved_quote(&details);
        assert!(text.contains(&details.quote.proposal_number));
        assert!(text.contains("for Cliente <Teste> & Cia by João Silva (16/10/2026)"));
        assert!(text.contains("Sem DIFAL"));

        let mut tampered = details.clone();
        tampered.quote.total_cabinets = 99;
        assert!(describe_saved_quote(&tampered).contains("(99 total)"));

        let line = describe_quote_line(&details.quote);
        assert!(line.starts_with(&format!("`{}`", details.quote.proposal_number)));
        assert!(line.contains("P2,5 Indoor Fixo"));
        assert!(line.contains("6,00×3,00m"));
        Ok(())
    }
}
