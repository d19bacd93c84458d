//! Catalog Discord commands - `products`, `sellers` and `seller_add`.
//!
//! Lets the sales team see which panels can be quoted at what price and manage the
//! seller list used on proposals.

use crate::{
    entities::{price, product},
    export::format::{format_currency, format_plain},
};

/// One catalog line: model, line, application and current prices.
#[must_use]
pub fn describe_product(product: &product::Model, price: Option<&price::Model>) -> String {
    let pricing = price.map_or_else(
        || "no price".to_string(),
        |p| {
            format!(
                "{} / cabinet + {} accessories",
                format_currency(p.unit_value),
                format_currency(p.accessories_value)
            )
        },
    );
    format!(
        "**{}** (P{}, {}, {}): {pricing}",
        product.model,
        format_plain(product.pixel_pitch),
        product.line,
        product.application
    )
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::describe_product;
    use crate::{
        bot::{BotData, commands::choices::ApplicationChoice},
        core::catalog,
        entities::ApplicationCategory,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Lists the panel catalog with current prices.
    #[poise::command(slash_command)]
    pub async fn products(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only show products for this application"] application: Option<
            ApplicationChoice,
        >,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let products = match application {
            Some(choice) => {
                catalog::list_products_for_application(db, ApplicationCategory::from(choice))
                    .await?
            }
            None => catalog::list_products(db).await?,
        };

        if products.is_empty() {
            ctx.say("No products found.").await?;
            return Ok(());
        }

        let mut lines = Vec::with_capacity(products.len());
        for product in &products {
            let price = catalog::find_price(db, product.id).await?;
            lines.push(describe_product(product, price.as_ref()));
        }

        let list_embed = serenity::CreateEmbed::default()
            .title("LED Panel Catalog")
            .description(lines.join("\n"))
            .color(0x0000_99FF);

        ctx.send(poise::CreateReply::default().embed(list_embed))
            .await?;
        Ok(())
    }

    /// Lists the sellers who can issue proposals.
    #[poise::command(slash_command)]
    pub async fn sellers(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let sellers = catalog::list_sellers(&ctx.data().database).await?;

        if sellers.is_empty() {
            ctx.say("No sellers registered yet. Use `/seller_add` to add one.")
                .await?;
            return Ok(());
        }

        let names: Vec<String> = sellers.iter().map(|s| format!("• {}", s.name)).collect();
        ctx.say(format!("**Sellers**\n{}", names.join("\n"))).await?;
        Ok(())
    }

    /// Registers a new seller.
    #[poise::command(slash_command)]
    pub async fn seller_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Seller's full name"] name: String,
    ) -> Result<()> {
        let seller = catalog::create_seller(&ctx.data().database, &name).await?;
        ctx.say(format!("✅ Seller '{}' added.", seller.name))
            .await?;
        Ok(())
    }
}

pub use inner::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::catalog, entities::ApplicationCategory, errors::Result, test_utils::*};

    #[tokio::test]
    async fn test_describe_product_with_and_without_price() -> Result<()> {
        let db = setup_with_catalog().await?;
        let product = catalog::find_product(&db, ApplicationCategory::OutdoorRental, 4.0)
            .await?
            .ok_or_else(|| crate::errors::Error::invalid("pixel_pitch", "missing"))?;
        let price = catalog::find_price(&db, product.id).await?;

        let line = describe_product(&product, price.as_ref());
        assert!(line.contains("P4"));
        assert!(line.contains("R$ 1.800,00 / cabinet + R$ 800,00 accessories"));
        assert!(line.contains("Outdoor Rental"));

        let unpriced = describe_product(&product, None);
        assert!(unpriced.ends_with("no price"));
        Ok(())
    }
}
