use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;

use coursebot::core::{config, init_logger, PremiumRegistry, Settings};
use coursebot::storage::open_store;
use coursebot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (logging, configuration, storage).
#[tokio::main]
async fn main() -> Result<()> {
    // Set up global panic handler to catch panics in dispatcher
    // This allows us to log the panic and continue working instead of terminating
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Load environment variables from .env if present
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    log::info!("🚀 Starting course bot...");

    let settings = Arc::new(Settings::from_env()?);
    log::info!("👑 Owner ID: {}", settings.owner_id);
    log::info!("🤖 Bot Username: {}", settings.bot_username);

    let store = open_store(&settings)?;

    // Premium registry: owner + admins, plus every persisted active grant
    let registry = Arc::new(PremiumRegistry::seeded(&settings));
    match registry.reload_from(store.as_ref()) {
        Ok(loaded) => log::info!("💎 Loaded {} premium grants from storage", loaded),
        Err(e) => log::error!("Failed to reload premium grants: {}", e),
    }

    let bot = create_bot(&settings);
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let deps = HandlerDeps::new(store, registry, settings);

    log::info!("✅ Bot is starting...");
    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
