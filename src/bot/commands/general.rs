//! General Discord commands - ping and help.
//! These commands don't touch the database and provide basic bot functionality.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**LED Quoter Help**\n\
        Quotes LED panels from the product catalog and issues numbered proposals.\n\n\
        **Quotes**\n\
        • `/quote_calc <application> <pitch> <width> <height> <tax>` - Calculates a panel without saving.\n\
        • `/quote_save <seller> <application> <pitch> <width> <height> <tax> [client]` - Saves a quote and assigns its proposal number.\n\
        • `/quotes [limit]` - Lists the most recent quotes.\n\
        • `/quote_export <number> <format>` - Downloads a proposal as XLSX or PDF.\n\
        • `/quote_report <kind> <format> [from] [to] [application] [tax] [seller]` - Bulk export as CSV or JSON.\n\n\
        **Catalog**\n\
        • `/products [application]` - Lists products with their current prices.\n\
        • `/sellers` - Lists sellers.\n\
        • `/seller_add <name>` - Registers a seller.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.\n\n\
        Widths and heights are in meters. Quotes without DIFAL get a 15% discount.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
