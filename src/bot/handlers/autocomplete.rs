//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggests seller names and recent proposal numbers as the user types.

use crate::{
    bot::BotData,
    core::{catalog, quote},
    errors::Error,
};

/// Discord caps autocomplete lists at 25 entries.
const MAX_SUGGESTIONS: usize = 25;

/// Provides autocomplete suggestions for seller names.
pub async fn autocomplete_seller_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(sellers) = catalog::list_sellers(db).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();
    sellers
        .into_iter()
        .filter(|s| s.name.to_lowercase().contains(&partial_lower))
        .map(|s| s.name)
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Provides autocomplete suggestions for proposal numbers, newest first.
pub async fn autocomplete_proposal_number(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(quotes) = quote::list_quotes(db).await else {
        return Vec::new();
    };

    let partial = partial.trim();
    quotes
        .into_iter()
        .filter(|q| q.proposal_number.contains(partial))
        .map(|q| q.proposal_number)
        .take(MAX_SUGGESTIONS)
        .collect()
}
