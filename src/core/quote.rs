//! Quote business logic - calculating, saving and reading back quotes.
//!
//! Saving a quote resolves the catalog, runs the calculator and then, inside a single
//! database transaction, draws the next proposal number and inserts the row. Stored
//! quotes are never modified afterwards; exports read them back verbatim.

use crate::{
    core::{
        calculator::{self, QuoteCalculation, QuoteRequest},
        catalog,
        proposal::{self, ProposalNumber},
    },
    entities::{Product, Quote, Seller, product, quote, seller},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

/// How many times a save is attempted when it loses a race for a proposal number.
pub const MAX_SAVE_ATTEMPTS: u32 = 5;

/// Everything needed to save a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteDraft {
    /// Panel request
    pub request: QuoteRequest,
    /// Seller issuing the quote
    pub seller_id: i64,
    /// Optional end-customer name
    pub client_name: Option<String>,
}

/// A stored quote together with its product and seller, as needed by the exporters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteDetails {
    /// The stored quote
    pub quote: quote::Model,
    /// Product the quote was calculated for
    pub product: product::Model,
    /// Seller who issued it
    pub seller: seller::Model,
}

/// Looks up the product and its current price, then calculates.
///
/// The request is validated before touching the database, so malformed input is
/// reported as [`Error::InvalidInput`] even when no product would match.
///
/// # Errors
/// Returns [`Error::InvalidInput`], [`Error::ProductNotFound`], [`Error::PriceNotFound`]
/// or a database error.
pub async fn resolve_and_calculate<C>(db: &C, request: &QuoteRequest) -> Result<QuoteCalculation>
where
    C: ConnectionTrait,
{
    calculator::validate_request(request)?;

    let product = catalog::find_product(db, request.application, request.pixel_pitch)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            application: request.application.to_string(),
            pixel_pitch: request.pixel_pitch,
        })?;

    let price = catalog::find_price(db, product.id)
        .await?
        .ok_or(Error::PriceNotFound {
            product_id: product.id,
        })?;

    calculator::calculate(request, &product, &price)
}

/// Inserts a quote row as given.
///
/// `created_at` is stamped with the current time when left unset.
pub async fn create_quote<C>(db: &C, mut record: quote::ActiveModel) -> Result<quote::Model>
where
    C: ConnectionTrait,
{
    if matches!(record.created_at, ActiveValue::NotSet) {
        record.created_at = Set(Utc::now());
    }
    record.insert(db).await.map_err(Into::into)
}

/// Saves a quote, stamping it with the current time.
///
/// # Errors
/// See [`save_quote_at`].
pub async fn save_quote(db: &DatabaseConnection, draft: &QuoteDraft) -> Result<QuoteDetails> {
    save_quote_at(db, draft, Utc::now()).await
}

/// Saves a quote as if it were created at `now`.
///
/// Nothing is written unless the seller exists and the calculation succeeds. Losing a
/// race for the proposal number rolls the transaction back and tries again, up to
/// [`MAX_SAVE_ATTEMPTS`] times.
///
/// # Errors
/// Returns [`Error::SellerNotFound`], any calculation error, [`Error::SequenceExhausted`],
/// [`Error::Conflict`] once the attempts run out, or a database error.
#[instrument(skip(db, draft), fields(seller_id = draft.seller_id))]
pub async fn save_quote_at(
    db: &DatabaseConnection,
    draft: &QuoteDraft,
    now: DateTime<Utc>,
) -> Result<QuoteDetails> {
    let seller = catalog::get_seller_by_id(db, draft.seller_id)
        .await?
        .ok_or_else(|| Error::SellerNotFound {
            seller: draft.seller_id.to_string(),
        })?;

    let calculation = resolve_and_calculate(db, &draft.request).await?;

    let mut attempt = 1;
    let quote = loop {
        match insert_with_next_number(db, draft, &calculation, now).await {
            Ok(quote) => break quote,
            Err(e) if e.is_retriable() && attempt < MAX_SAVE_ATTEMPTS => {
                warn!(attempt, error = %e, "Proposal number collision, retrying save");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    };

    info!(
        quote_id = quote.id,
        proposal_number = %quote.proposal_number,
        total = quote.discounted_value,
        "Saved quote"
    );

    Ok(QuoteDetails {
        quote,
        product: calculation.product,
        seller,
    })
}

async fn insert_with_next_number(
    db: &DatabaseConnection,
    draft: &QuoteDraft,
    calculation: &QuoteCalculation,
    now: DateTime<Utc>,
) -> Result<quote::Model> {
    let txn = db.begin().await?;

    let number = proposal::allocate_proposal_number(&txn, now).await?;
    let quote = create_quote(&txn, build_record(draft, calculation, number, now)).await?;

    txn.commit().await?;
    Ok(quote)
}

fn build_record(
    draft: &QuoteDraft,
    calculation: &QuoteCalculation,
    number: ProposalNumber,
    now: DateTime<Utc>,
) -> quote::ActiveModel {
    let request = &draft.request;
    let client_name = draft
        .client_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string);

    quote::ActiveModel {
        proposal_number: Set(number.to_string()),
        tax_regime: Set(request.tax_regime),
        application: Set(request.application),
        pixel_pitch: Set(request.pixel_pitch),
        seller_id: Set(draft.seller_id),
        client_name: Set(client_name),
        nominal_width: Set(request.nominal_width),
        nominal_height: Set(request.nominal_height),
        width_cabinets: Set(calculation.width_cabinets),
        height_cabinets: Set(calculation.height_cabinets),
        total_cabinets: Set(calculation.total_cabinets),
        real_width: Set(calculation.real_width),
        real_height: Set(calculation.real_height),
        panel_resolution_h: Set(calculation.panel_resolution_h),
        panel_resolution_v: Set(calculation.panel_resolution_v),
        video_resolution_h: Set(calculation.video_resolution_h),
        video_resolution_v: Set(calculation.video_resolution_v),
        unit_value: Set(calculation.unit_value),
        accessories_value: Set(calculation.accessories_value),
        total_value: Set(calculation.total_value),
        discounted_value: Set(calculation.discounted_value),
        product_id: Set(calculation.product.id),
        created_at: Set(now),
        ..Default::default()
    }
}

/// Most recently created quote, ties broken by highest id.
pub async fn find_latest_quote<C>(db: &C) -> Result<Option<quote::Model>>
where
    C: ConnectionTrait,
{
    Quote::find()
        .order_by_desc(quote::Column::CreatedAt)
        .order_by_desc(quote::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a quote by ID.
pub async fn get_quote_by_id(db: &DatabaseConnection, quote_id: i64) -> Result<Option<quote::Model>> {
    Quote::find_by_id(quote_id).one(db).await.map_err(Into::into)
}

/// Retrieves a quote by its proposal number.
pub async fn get_quote_by_number(
    db: &DatabaseConnection,
    proposal_number: &str,
) -> Result<Option<quote::Model>> {
    Quote::find()
        .filter(quote::Column::ProposalNumber.eq(proposal_number.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads a quote together with its product and seller.
///
/// # Errors
/// Returns [`Error::QuoteNotFound`] if no quote has that ID.
pub async fn get_quote_details(db: &DatabaseConnection, quote_id: i64) -> Result<QuoteDetails> {
    let quote = get_quote_by_id(db, quote_id)
        .await?
        .ok_or_else(|| Error::QuoteNotFound {
            id: quote_id.to_string(),
        })?;
    load_details(db, quote).await
}

/// Loads a quote by proposal number together with its product and seller.
///
/// # Errors
/// Returns [`Error::QuoteNotFound`] if no quote carries that number.
pub async fn get_quote_details_by_number(
    db: &DatabaseConnection,
    proposal_number: &str,
) -> Result<QuoteDetails> {
    let quote = get_quote_by_number(db, proposal_number)
        .await?
        .ok_or_else(|| Error::QuoteNotFound {
            id: proposal_number.trim().to_string(),
        })?;
    load_details(db, quote).await
}

async fn load_details(db: &DatabaseConnection, quote: quote::Model) -> Result<QuoteDetails> {
    let product = Product::find_by_id(quote.product_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            Error::Database(format!(
                "quote {} references missing product {}",
                quote.id, quote.product_id
            ))
        })?;
    let seller = Seller::find_by_id(quote.seller_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            Error::Database(format!(
                "quote {} references missing seller {}",
                quote.id, quote.seller_id
            ))
        })?;

    Ok(QuoteDetails {
        quote,
        product,
        seller,
    })
}

/// Retrieves every quote, newest first.
pub async fn list_quotes(db: &DatabaseConnection) -> Result<Vec<quote::Model>> {
    Quote::find()
        .order_by_desc(quote::Column::CreatedAt)
        .order_by_desc(quote::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves at most `limit` quotes, newest first.
pub async fn list_recent_quotes(db: &DatabaseConnection, limit: u64) -> Result<Vec<quote::Model>> {
    Quote::find()
        .order_by_desc(quote::Column::CreatedAt)
        .order_by_desc(quote::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of stored quotes.
pub async fn count_quotes(db: &DatabaseConnection) -> Result<u64> {
    Quote::find().count(db).await.map_err(Into::into)
}

/// Retrieves every quote with its product and seller, newest first.
pub async fn list_quote_details(db: &DatabaseConnection) -> Result<Vec<QuoteDetails>> {
    let products: HashMap<i64, product::Model> = Product::find()
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    let sellers: HashMap<i64, seller::Model> = Seller::find()
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    list_quotes(db)
        .await?
        .into_iter()
        .map(|quote| {
            let product = products.get(&quote.product_id).cloned().ok_or_else(|| {
                Error::Database(format!("quote {} references missing product", quote.id))
            })?;
            let seller = sellers.get(&quote.seller_id).cloned().ok_or_else(|| {
                Error::Database(format!("quote {} references missing seller", quote.id))
            })?;
            Ok(QuoteDetails {
                quote,
                product,
                seller,
            })
        })
        .collect()
}
