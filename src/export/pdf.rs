//! PDF proposal export.
//!
//! The proposal is laid out as HTML (cover, full product data sheet, detailed budget)
//! and printed to PDF by a headless Chromium-family browser.

use super::format::{format_currency, format_date, format_integer, format_meters, format_plain};
use crate::{
    core::quote::QuoteDetails,
    entities::TaxRegime,
    errors::{Error, Result},
};
use std::{fmt::Write, path::PathBuf, process::Stdio, time::Duration};
use tracing::{debug, instrument};

/// Default render timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Escapes text for inclusion in HTML element content or attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r"
body { font-family: Arial, sans-serif; margin: 0; color: #333; }
.page { width: 210mm; min-height: 297mm; padding: 20mm; box-sizing: border-box; page-break-after: always; }
.page:last-child { page-break-after: auto; }
.cover { background: #1a1a1a; color: #fff; text-align: center; padding: 60px 20px; border-radius: 15px; }
.cover h1 { font-size: 36px; margin-bottom: 20px; }
.cover .info { font-size: 18px; margin-bottom: 10px; }
.header { text-align: center; margin-bottom: 30px; }
.title { font-size: 24px; font-weight: bold; }
.subtitle { font-size: 16px; color: #666; }
.section-title { font-size: 18px; font-weight: bold; border-bottom: 2px solid #ff4444; padding-bottom: 5px; margin: 20px 0 15px; }
.sheet { display: grid; grid-template-columns: 1fr 1fr; gap: 12px; }
.item { display: flex; justify-content: space-between; border-bottom: 1px solid #eee; padding: 8px 0; }
.label { font-weight: bold; color: #555; }
table { width: 100%; border-collapse: collapse; }
th, td { border: 1px solid #ddd; padding: 10px; text-align: left; }
th { background: #ff4444; color: #fff; }
tr.total td { font-weight: bold; background: #fde0e0; }
.highlight { background: #ff4444; color: #fff; padding: 20px; text-align: center; border-radius: 8px; margin-top: 20px; }
.highlight .amount { font-size: 28px; font-weight: bold; }
";

fn item(out: &mut String, label: &str, value: &str) {
    let _ = write!(
        out,
        r#"<div class="item"><span class="label">{label}:</span><span>{}</span></div>"#,
        escape_html(value)
    );
}

/// Builds the three-page proposal document.
///
/// Every figure comes from the stored quote or product; nothing is recalculated.
#[must_use]
pub fn render_proposal_html(details: &QuoteDetails) -> String {
    let quote = &details.quote;
    let product = &details.product;
    let number = escape_html(&quote.proposal_number);
    let date = format_date(quote.created_at);
    let seller = escape_html(&details.seller.name);
    let client = quote.client_name.as_deref().map(escape_html);

    let mut html = String::with_capacity(8 * 1024);
    let _ = write!(
        html,
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>Proposta {number}</title><style>{STYLE}</style></head><body>"#
    );

    // Cover
    html.push_str(r#"<div class="page"><div class="cover"><h1>LED EXPERT</h1>"#);
    html.push_str(r#"<div class="info">PROPOSTA COMERCIAL</div>"#);
    let _ = write!(html, r#"<div class="info">Nº {number}</div>"#);
    let _ = write!(html, r#"<div class="info">Data: {date}</div>"#);
    let _ = write!(html, r#"<div class="info">Vendedor: {seller}</div>"#);
    if let Some(client) = &client {
        let _ = write!(html, r#"<div class="info">Cliente: {client}</div>"#);
    }
    let _ = write!(
        html,
        r#"<div class="info" style="margin-top: 60px">{}<br>{}</div></div></div>"#,
        escape_html(quote.application.as_str()),
        escape_html(&product.model)
    );

    // Data sheet
    let _ = write!(
        html,
        r#"<div class="page"><div class="header"><div class="title">FICHA TÉCNICA COMPLETA</div><div class="subtitle">{}</div></div><div class="sheet">"#,
        escape_html(&product.model)
    );
    item(&mut html, "Modelo", &product.model);
    item(&mut html, "Linha", &product.line.to_string());
    item(&mut html, "Pixel Pitch", &format!("{}mm", format_plain(quote.pixel_pitch)));
    item(&mut html, "Aplicação", quote.application.as_str());
    item(&mut html, "Gabinete", &product.cabinet);
    item(&mut html, "Peso", &format!("{} kg", format_plain(product.weight_kg)));
    item(&mut html, "Consumo", &format!("{} W", format_plain(product.power_w)));
    item(&mut html, "Brilho", &format!("{} nits", format_plain(product.brightness_nits)));
    item(&mut html, "Voltagem", &product.voltage);
    item(
        &mut html,
        "Vida Útil",
        &format!("{} horas", format_integer(product.lifetime_hours)),
    );
    item(&mut html, "IP Rating", &product.ip_rating);
    item(&mut html, "Garantia", &format!("{} meses", product.warranty_months));
    html.push_str("</div>");
    item(&mut html, "Itens Complementares", &product.accessories);
    html.push_str("</div>");

    // Budget
    let _ = write!(
        html,
        r#"<div class="page"><div class="header"><div class="title">ORÇAMENTO DETALHADO</div><div class="subtitle">Proposta Nº {number}</div></div><div class="sheet">"#
    );
    item(&mut html, "Tributação", &quote.tax_regime.to_string());
    item(&mut html, "Vendedor", &details.seller.name);
    if let Some(name) = &quote.client_name {
        item(&mut html, "Cliente", name);
    }
    item(&mut html, "Data", &date);
    html.push_str(r#"</div><div class="section-title">Especificações do Projeto</div><div class="sheet">"#);
    item(&mut html, "Largura Nominal", &format!("{}m", format_meters(quote.nominal_width)));
    item(&mut html, "Altura Nominal", &format!("{}m", format_meters(quote.nominal_height)));
    item(&mut html, "Largura Real", &format!("{}m", format_meters(quote.real_width)));
    item(&mut html, "Altura Real", &format!("{}m", format_meters(quote.real_height)));
    item(
        &mut html,
        "Configuração",
        &format!("{} × {} gabinetes", quote.width_cabinets, quote.height_cabinets),
    );
    item(
        &mut html,
        "Total Gabinetes",
        &format_integer(quote.total_cabinets.into()),
    );
    html.push_str(r#"</div><div class="section-title">Resoluções</div><div class="sheet">"#);
    item(
        &mut html,
        "Resolução Painel",
        &format!(
            "{} × {} px",
            format_integer(quote.panel_resolution_h.into()),
            format_integer(quote.panel_resolution_v.into())
        ),
    );
    item(
        &mut html,
        "Resolução Vídeo",
        &format!(
            "{} × {} px",
            format_integer(quote.video_resolution_h.into()),
            format_integer(quote.video_resolution_v.into())
        ),
    );
    html.push_str("</div>");

    html.push_str(r#"<div class="section-title">Tabela de Preços</div><table><thead><tr><th>Descrição</th><th>Valor Unitário</th><th>Quantidade</th></tr></thead><tbody>"#);
    let _ = write!(
        html,
        "<tr><td>Gabinetes {}</td><td>{}</td><td>{}</td></tr>",
        escape_html(&product.model),
        format_currency(quote.unit_value),
        format_integer(quote.total_cabinets.into())
    );
    let _ = write!(
        html,
        "<tr><td>Acessórios e Instalação</td><td>{}</td><td>1</td></tr>",
        format_currency(quote.accessories_value)
    );
    let _ = write!(
        html,
        r#"<tr class="total"><td colspan="2">Valor Total</td><td>{}</td></tr>"#,
        format_currency(quote.total_value)
    );
    if quote.tax_regime == TaxRegime::WithoutDifal {
        html.push_str(r#"<tr><td colspan="3">Desconto de 15% (Sem DIFAL)</td></tr>"#);
    }
    let _ = write!(
        html,
        r#"<tr class="total"><td colspan="2">VALOR FINAL</td><td>{}</td></tr></tbody></table>"#,
        format_currency(quote.discounted_value)
    );

    let _ = write!(
        html,
        r#"<div class="highlight"><div>VALOR FINAL DA PROPOSTA</div><div class="amount">{}</div>"#,
        format_currency(quote.discounted_value)
    );
    if quote.tax_regime == TaxRegime::WithoutDifal {
        html.push_str(r#"<div style="font-size: 14px; margin-top: 10px">* Desconto de 15% aplicado (Sem DIFAL)</div>"#);
    }
    html.push_str("</div></div></body></html>");
    html
}

/// Something that turns an HTML document into PDF bytes.
#[allow(async_fn_in_trait)]
pub trait PdfRenderer {
    /// Renders `html` to a PDF document.
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>>;
}

/// Prints HTML to PDF with a headless Chromium-family browser binary.
#[derive(Debug, Clone)]
pub struct HeadlessRenderer {
    browser: PathBuf,
    timeout: Duration,
}

impl HeadlessRenderer {
    /// Renderer using `browser` (a path or a name on `PATH`).
    pub fn new(browser: impl Into<PathBuf>) -> Self {
        Self {
            browser: browser.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets how long a single render may take before the browser is killed.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Browser binary in use.
    #[must_use]
    pub fn browser(&self) -> &std::path::Path {
        &self.browser
    }
}

fn export_error(message: impl Into<String>) -> Error {
    Error::Export {
        message: message.into(),
    }
}

impl PdfRenderer for HeadlessRenderer {
    #[instrument(skip(html), fields(browser = %self.browser.display(), html_len = html.len()))]
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>> {
        let workdir = tempfile::tempdir()
            .map_err(|e| export_error(format!("cannot create temp dir: {e}")))?;
        let input = workdir.path().join("proposta.html");
        let output = workdir.path().join("proposta.pdf");

        tokio::fs::write(&input, html)
            .await
            .map_err(|e| export_error(format!("cannot write HTML: {e}")))?;

        let mut command = tokio::process::Command::new(&self.browser);
        command
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(&input)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let finished = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| export_error(format!("PDF render timed out after {:?}", self.timeout)))?
            .map_err(|e| {
                export_error(format!(
                    "cannot start browser {}: {e}",
                    self.browser.display()
                ))
            })?;

        if !finished.status.success() {
            let stderr = String::from_utf8_lossy(&finished.stderr);
            return Err(export_error(format!(
                "browser exited with {}: {}",
                finished.status,
                stderr.trim()
            )));
        }

        let bytes = match tokio::fs::read(&output).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(export_error(format!("cannot read PDF: {e}"))),
        };
        if bytes.is_empty() {
            return Err(export_error("browser produced no PDF output"));
        }

        debug!(bytes = bytes.len(), "Rendered PDF");
        Ok(bytes)
    }
}
