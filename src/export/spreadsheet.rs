//! XLSX proposal export.
//!
//! The workbook has a single "Proposta" sheet laid out as label/value pairs grouped in
//! sections. Money cells are written as numbers with a reais format so they stay
//! usable in formulas.

use super::format::{format_date, format_integer, format_meters, format_plain};
use crate::{core::quote::QuoteDetails, entities::TaxRegime, errors::Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

const SHEET_NAME: &str = "Proposta";
const TITLE: &str = "LED EXPERT - PROPOSTA COMERCIAL";

/// One line of the proposal sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetRow {
    /// Document title
    Title(&'static str),
    /// Empty spacer row
    Blank,
    /// Section heading
    Section(&'static str),
    /// Label with a text value
    Text(&'static str, String),
    /// Label with a whole number
    Count(&'static str, i32),
    /// Label with an amount in reais
    Money(&'static str, f64),
    /// Free text spanning the row
    Note(String),
}

/// Lays out the proposal as sheet rows, reading every value from the stored quote and
/// product.
#[must_use]
pub fn proposal_rows(details: &QuoteDetails) -> Vec<SheetRow> {
    use SheetRow::{Blank, Count, Money, Note, Section, Text, Title};

    let quote = &details.quote;
    let product = &details.product;

    let mut rows = vec![
        Title(TITLE),
        Blank,
        Section("Informações da Proposta"),
        Text("Número da Proposta", quote.proposal_number.clone()),
        Text("Data", format_date(quote.created_at)),
        Text("Vendedor", details.seller.name.clone()),
    ];
    if let Some(client) = &quote.client_name {
        rows.push(Text("Cliente", client.clone()));
    }
    rows.extend([
        Text("Tributação", quote.tax_regime.to_string()),
        Blank,
        Section("Especificações Técnicas"),
        Text("Aplicação", quote.application.to_string()),
        Text("Modelo", product.model.clone()),
        Text("Pixel Pitch", format!("{}mm", format_plain(quote.pixel_pitch))),
        Text("Linha", product.line.to_string()),
        Blank,
        Section("Dimensões"),
        Text("Largura Nominal", format!("{}m", format_meters(quote.nominal_width))),
        Text("Altura Nominal", format!("{}m", format_meters(quote.nominal_height))),
        Text("Largura Real", format!("{}m", format_meters(quote.real_width))),
        Text("Altura Real", format!("{}m", format_meters(quote.real_height))),
        Text(
            "Gabinetes (L × A)",
            format!("{} × {}", quote.width_cabinets, quote.height_cabinets),
        ),
        Count("Total de Gabinetes", quote.total_cabinets),
        Blank,
        Section("Resoluções"),
        Text(
            "Resolução Painel",
            format!(
                "{} × {} px",
                format_integer(quote.panel_resolution_h.into()),
                format_integer(quote.panel_resolution_v.into())
            ),
        ),
        Text(
            "Resolução Vídeo",
            format!(
                "{} × {} px",
                format_integer(quote.video_resolution_h.into()),
                format_integer(quote.video_resolution_v.into())
            ),
        ),
        Blank,
        Section("Ficha Técnica do Produto"),
        Text("Gabinete", product.cabinet.clone()),
        Text("Peso", format!("{} kg", format_plain(product.weight_kg))),
        Text("Consumo", format!("{} W", format_plain(product.power_w))),
        Text("Brilho", format!("{} nits", format_plain(product.brightness_nits))),
        Text("Voltagem", product.voltage.clone()),
        Text(
            "Vida Útil",
            format!("{} horas", format_integer(product.lifetime_hours)),
        ),
        Text("IP Rating", product.ip_rating.clone()),
        Text("Garantia", format!("{} meses", product.warranty_months)),
        Text("Itens Complementares", product.accessories.clone()),
        Blank,
        Section("Valores"),
        Money("Valor Unitário por Gabinete", quote.unit_value),
        Money("Valor dos Acessórios", quote.accessories_value),
        Money("Valor Total", quote.total_value),
        Money("Valor com Desconto", quote.discounted_value),
        Blank,
        Section("Observações"),
        Note(observation(quote.tax_regime).to_string()),
    ]);
    rows
}

/// Observation line describing the tax treatment.
#[must_use]
pub const fn observation(tax_regime: TaxRegime) -> &'static str {
    match tax_regime {
        TaxRegime::WithoutDifal => "Desconto de 15% aplicado (Sem DIFAL)",
        TaxRegime::WithDifal => "Tributação normal (Com DIFAL)",
    }
}

struct Formats {
    title: Format,
    section: Format,
    label: Format,
    money: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            title: Format::new().set_bold().set_font_size(14),
            section: Format::new().set_bold().set_font_size(12),
            label: Format::new().set_bold(),
            money: Format::new().set_num_format("\"R$\" #,##0.00"),
        }
    }
}

fn write_row(sheet: &mut Worksheet, index: u32, row: &SheetRow, formats: &Formats) -> Result<()> {
    match row {
        SheetRow::Title(text) => {
            sheet.write_string_with_format(index, 0, *text, &formats.title)?;
        }
        SheetRow::Blank => {}
        SheetRow::Section(text) => {
            sheet.write_string_with_format(index, 0, *text, &formats.section)?;
        }
        SheetRow::Text(label, value) => {
            sheet.write_string_with_format(index, 0, *label, &formats.label)?;
            sheet.write_string(index, 1, value)?;
        }
        SheetRow::Count(label, value) => {
            sheet.write_string_with_format(index, 0, *label, &formats.label)?;
            sheet.write_number(index, 1, *value)?;
        }
        SheetRow::Money(label, value) => {
            sheet.write_string_with_format(index, 0, *label, &formats.label)?;
            sheet.write_number_with_format(index, 1, *value, &formats.money)?;
        }
        SheetRow::Note(text) => {
            sheet.write_string(index, 0, text)?;
        }
    }
    Ok(())
}

/// Renders the proposal workbook and returns the XLSX bytes.
///
/// # Errors
/// Returns [`crate::errors::Error::Export`] if the workbook cannot be built.
pub fn render_quote_workbook(details: &QuoteDetails) -> Result<Vec<u8>> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    sheet.set_column_width(0, 30)?;
    sheet.set_column_width(1, 28)?;

    for (index, row) in (0u32..).zip(proposal_rows(details).iter()) {
        write_row(sheet, index, row, &formats)?;
    }

    workbook.save_to_buffer().map_err(Into::into)
}
