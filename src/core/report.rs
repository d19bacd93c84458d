//! Bulk data export.
//!
//! Turns stored quotes, products and sellers into flat records that can be written as
//! CSV or JSON for spreadsheets and BI tools. Values are copied from the database as
//! they are; nothing here recalculates a quote.

use crate::{
    core::catalog,
    entities::{ApplicationCategory, Product, Quote, Seller, TaxRegime, product, quote, seller},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, Select, prelude::*};
use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::Value;
use std::{collections::HashMap, fmt, str::FromStr};
use tracing::{debug, instrument};

/// What to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Saved quotes with seller and product names
    Quotes,
    /// Catalog products with their current price
    Products,
    /// Registered sellers
    Sellers,
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quotes => f.write_str("quotes"),
            Self::Products => f.write_str("products"),
            Self::Sellers => f.write_str("sellers"),
        }
    }
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quotes" | "propostas" => Ok(Self::Quotes),
            "products" | "produtos" => Ok(Self::Products),
            "sellers" | "vendedores" => Ok(Self::Sellers),
            _ => Err(format!("Invalid export kind: {s}. Use quotes, products or sellers")),
        }
    }
}

/// Optional narrowing of an export. Unset fields match everything.
///
/// Dates are inclusive and compared against the UTC date of `created_at`. Filters
/// that do not apply to a kind (e.g. `seller_id` for products) are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExportFilters {
    /// First day included
    pub from: Option<NaiveDate>,
    /// Last day included
    pub to: Option<NaiveDate>,
    /// Only this application category
    pub application: Option<ApplicationCategory>,
    /// Only quotes with this tax regime
    pub tax_regime: Option<TaxRegime>,
    /// Only quotes issued by this seller
    pub seller_id: Option<i64>,
}

impl ExportFilters {
    /// Checks the date range is not inverted.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] when `from` is after `to`.
    pub fn validate(&self) -> Result<()> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from > to => Err(Error::invalid(
                "from",
                format!("{from} is after the end date {to}"),
            )),
            _ => Ok(()),
        }
    }

    fn lower_bound(&self) -> Option<DateTime<Utc>> {
        self.from.map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }

    /// Exclusive upper bound: midnight after `to`.
    fn upper_bound(&self) -> Option<DateTime<Utc>> {
        self.to
            .and_then(|d| d.succ_opt())
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }

    fn apply_dates<E, C>(&self, mut query: Select<E>, column: C) -> Select<E>
    where
        E: EntityTrait,
        C: ColumnTrait,
    {
        if let Some(from) = self.lower_bound() {
            query = query.filter(column.gte(from));
        }
        if let Some(until) = self.upper_bound() {
            query = query.filter(column.lt(until));
        }
        query
    }
}

/// One exported row: field names and values in a fixed order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportRecord {
    fields: Vec<(&'static str, Value)>,
}

impl ExportRecord {
    fn with(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((name, value.into()));
        self
    }

    /// Value of a field, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// Field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(field, _)| *field)
    }
}

impl Serialize for ExportRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Collects the records of one kind matching `filters`.
///
/// Quotes come oldest first, products by pixel pitch then model, sellers by name.
///
/// # Errors
/// Returns [`Error::InvalidInput`] for an inverted date range or a database error.
#[instrument(skip(db))]
pub async fn export_records(
    db: &DatabaseConnection,
    kind: ExportKind,
    filters: &ExportFilters,
) -> Result<Vec<ExportRecord>> {
    filters.validate()?;

    let records = match kind {
        ExportKind::Quotes => quote_records(db, filters).await?,
        ExportKind::Products => product_records(db, filters).await?,
        ExportKind::Sellers => seller_records(db, filters).await?,
    };

    debug!(count = records.len(), "Collected export records");
    Ok(records)
}

async fn quote_records(db: &DatabaseConnection, filters: &ExportFilters) -> Result<Vec<ExportRecord>> {
    let mut query = filters.apply_dates(Quote::find(), quote::Column::CreatedAt);
    if let Some(application) = filters.application {
        query = query.filter(quote::Column::Application.eq(application));
    }
    if let Some(tax_regime) = filters.tax_regime {
        query = query.filter(quote::Column::TaxRegime.eq(tax_regime));
    }
    if let Some(seller_id) = filters.seller_id {
        query = query.filter(quote::Column::SellerId.eq(seller_id));
    }

    let quotes = query
        .order_by_asc(quote::Column::CreatedAt)
        .order_by_asc(quote::Column::Id)
        .all(db)
        .await?;

    let sellers: HashMap<i64, String> = Seller::find()
        .select_only()
        .column(seller::Column::Id)
        .column(seller::Column::Name)
        .into_tuple::<(i64, String)>()
        .all(db)
        .await?
        .into_iter()
        .collect();
    let models: HashMap<i64, String> = Product::find()
        .select_only()
        .column(product::Column::Id)
        .column(product::Column::Model)
        .into_tuple::<(i64, String)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    Ok(quotes
        .into_iter()
        .map(|q| {
            ExportRecord::default()
                .with("id", q.id)
                .with("proposal_number", q.proposal_number)
                .with("created_at", q.created_at.to_rfc3339())
                .with("seller", sellers.get(&q.seller_id).cloned())
                .with("client_name", q.client_name)
                .with("application", q.application.as_str())
                .with("tax_regime", q.tax_regime.to_string())
                .with("product", models.get(&q.product_id).cloned())
                .with("pixel_pitch", q.pixel_pitch)
                .with("nominal_width", q.nominal_width)
                .with("nominal_height", q.nominal_height)
                .with("width_cabinets", q.width_cabinets)
                .with("height_cabinets", q.height_cabinets)
                .with("total_cabinets", q.total_cabinets)
                .with("real_width", q.real_width)
                .with("real_height", q.real_height)
                .with("panel_resolution_h", q.panel_resolution_h)
                .with("panel_resolution_v", q.panel_resolution_v)
                .with("video_resolution_h", q.video_resolution_h)
                .with("video_resolution_v", q.video_resolution_v)
                .with("unit_value", q.unit_value)
                .with("accessories_value", q.accessories_value)
                .with("total_value", q.total_value)
                .with("discounted_value", q.discounted_value)
        })
        .collect())
}

async fn product_records(
    db: &DatabaseConnection,
    filters: &ExportFilters,
) -> Result<Vec<ExportRecord>> {
    let mut query = filters.apply_dates(Product::find(), product::Column::CreatedAt);
    if let Some(application) = filters.application {
        query = query.filter(product::Column::Application.eq(application));
    }
    let products = query
        .order_by_asc(product::Column::PixelPitch)
        .order_by_asc(product::Column::Model)
        .all(db)
        .await?;

    let mut records = Vec::with_capacity(products.len());
    for p in products {
        let price = catalog::find_price(db, p.id).await?;
        records.push(
            ExportRecord::default()
                .with("id", p.id)
                .with("model", p.model)
                .with("line", p.line.to_string())
                .with("application", p.application.as_str())
                .with("pixel_pitch", p.pixel_pitch)
                .with("cabinet", p.cabinet)
                .with("weight_kg", p.weight_kg)
                .with("power_w", p.power_w)
                .with("brightness_nits", p.brightness_nits)
                .with("voltage", p.voltage)
                .with("lifetime_hours", p.lifetime_hours)
                .with("ip_rating", p.ip_rating)
                .with("warranty_months", p.warranty_months)
                .with("accessories", p.accessories)
                .with("unit_value", price.as_ref().map(|pr| pr.unit_value))
                .with(
                    "accessories_value",
                    price.as_ref().map(|pr| pr.accessories_value),
                ),
        );
    }
    Ok(records)
}

async fn seller_records(
    db: &DatabaseConnection,
    filters: &ExportFilters,
) -> Result<Vec<ExportRecord>> {
    let sellers = filters
        .apply_dates(Seller::find(), seller::Column::CreatedAt)
        .order_by_asc(seller::Column::Name)
        .all(db)
        .await?;

    Ok(sellers
        .into_iter()
        .map(|s| {
            ExportRecord::default()
                .with("id", s.id)
                .with("name", s.name)
                .with("created_at", s.created_at.to_rfc3339())
        })
        .collect())
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Writes records as CSV. The header is every field name in first-seen order; records
/// lacking a field get an empty cell.
///
/// # Errors
/// Returns [`Error::Export`] if the CSV writer fails.
pub fn records_to_csv(records: &[ExportRecord]) -> Result<Vec<u8>> {
    let mut header: Vec<&'static str> = Vec::new();
    for key in records.iter().flat_map(ExportRecord::keys) {
        if !header.contains(&key) {
            header.push(key);
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    if !header.is_empty() {
        writer.write_record(&header)?;
    }
    for record in records {
        let row: Vec<String> = header
            .iter()
            .map(|key| record.get(key).map(csv_cell).unwrap_or_default())
            .collect();
        writer.write_record(&row)?;
    }

    writer.into_inner().map_err(|e| Error::Export {
        message: format!("csv: {}", e.error()),
    })
}

/// Writes records as a pretty-printed JSON array.
///
/// # Errors
/// Returns [`Error::Export`] if serialization fails.
pub fn records_to_json(records: &[ExportRecord]) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(records).map_err(Into::into)
}
