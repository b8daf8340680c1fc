//! Bot initialization and command registration
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command menu registration in the Telegram UI

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config::Settings;

/// Bot commands enum with descriptions
///
/// Commands that take arguments (/premium, /add_channel, /broadcast) are
/// matched by text-prefix handlers instead, so they are not listed here.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "show the main menu")]
    Start,
    #[command(description = "show the main menu")]
    Help,
    #[command(description = "bot statistics (admins only)")]
    Stats,
    #[command(description = "your downloaded files")]
    Myfiles,
}

/// Creates a Bot instance from the configured token
///
/// # Arguments
/// * `settings` - Loaded bot configuration
///
/// # Returns
/// * `Bot` - Bot instance ready for dispatching
pub fn create_bot(settings: &Settings) -> Bot {
    Bot::new(settings.bot_token.clone())
}

/// Sets up bot commands in Telegram UI
///
/// Registers the argument-taking commands too, so they show up in the menu
/// even though they are routed by text prefix.
///
/// # Arguments
/// * `bot` - Bot instance to configure
///
/// # Returns
/// * `Ok(())` - Commands set successfully
/// * `Err(RequestError)` - Failed to set commands
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "show the main menu"),
        BotCommand::new("help", "show the main menu"),
        BotCommand::new("premium", "manage premium users (admins only)"),
        BotCommand::new("stats", "bot statistics (admins only)"),
        BotCommand::new("myfiles", "your downloaded files"),
        BotCommand::new("add_channel", "add an upload channel (owner only)"),
        BotCommand::new("broadcast", "broadcast a message (owner only)"),
    ])
    .await?;

    Ok(())
}
