//! Bot layer - Discord-specific interface and command handlers
//!
//! This module exposes the quoting operations as slash commands for the sales team:
//! catalog browsing, calculating and saving quotes, and downloading proposals and bulk
//! exports as attachments.

/// Discord command implementations (catalog, quote, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    errors::{Error, ErrorKind, Result},
    export::pdf::HeadlessRenderer,
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Renderer used for PDF proposals
    pub renderer: HeadlessRenderer,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(database: DatabaseConnection, renderer: HeadlessRenderer) -> Self {
        Self { database, renderer }
    }
}

/// User-facing message for a failed command.
///
/// Input problems and missing records are explained; conflicts ask the user to try
/// again; anything else gets a generic message, with details left to the logs.
#[must_use]
pub fn describe_error(error: &Error) -> String {
    match error.kind() {
        ErrorKind::InvalidInput | ErrorKind::NotFound => format!("❌ {error}"),
        ErrorKind::Conflict => format!("⚠️ {error}. Please try again."),
        ErrorKind::ExternalFailure => {
            "❌ Something went wrong on our side. The error has been logged.".to_string()
        }
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!(error = %error, "Failed to start bot");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            if error.kind() == ErrorKind::ExternalFailure {
                error!(command = %ctx.command().name, error = %error, "Command failed");
            } else {
                info!(command = %ctx.command().name, error = %error, "Command rejected");
            }
            if let Err(e) = ctx.say(describe_error(&error)).await {
                error!(error = %e, "Failed to send error message");
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!(error = %e, "Error while handling error");
            }
        }
    }
}

/// Connects to Discord and serves commands until the client stops.
///
/// # Errors
/// Returns [`Error::Framework`] if the client cannot be built or disconnects with an error.
#[instrument(skip_all)]
pub async fn run_bot(token: &str, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::products(),
                commands::sellers(),
                commands::seller_add(),
                commands::quote_calc(),
                commands::quote_save(),
                commands::quotes(),
                commands::quote_export(),
                commands::quote_report(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered slash commands globally");
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!(error = %e, "Error creating client"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!(error = %e, "Client error"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_error_by_kind() {
        let invalid = describe_error(&Error::invalid("nominal_width", "must be positive"));
        assert!(invalid.starts_with("❌"));
        assert!(invalid.contains("nominal_width"));

        let conflict = describe_error(&Error::Conflict {
            message: "quotes.proposal_number".into(),
        });
        assert!(conflict.starts_with("⚠️"));

        let external = describe_error(&Error::Database("disk I/O error at /var/db".into()));
        assert!(!external.contains("/var/db"));
    }
}
