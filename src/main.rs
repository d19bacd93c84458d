use led_quoter::{
    bot::{self, BotData},
    config::{self, renderer::RendererSettings},
    core::catalog,
    errors::{Error, Result},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenvy::dotenv().ok();

    // 3. Load the catalog configuration
    let catalog_config = config::catalog::load_default_config()
        .inspect_err(|e| error!("Failed to load catalog configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed sellers, products and prices into empty tables
    catalog::seed_catalog(&db, &catalog_config)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;

    // 6. PDF renderer settings
    let settings = RendererSettings::from_env()
        .inspect_err(|e| error!("Invalid PDF renderer settings: {}", e))?;
    info!(browser = %settings.browser, "PDF renderer configured");

    // 7. Run the bot
    let token = std::env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(&token, BotData::new(db, settings.renderer())).await
}
