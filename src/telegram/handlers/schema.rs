//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{sender_id, HandlerDeps, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::commands::{handle_message, handle_myfiles_command, handle_start_command};

/// Creates the main dispatcher schema for the Telegram bot.
///
/// This function returns a handler tree that can be used with teloxide's
/// Dispatcher. The argument-taking admin commands are matched by text prefix
/// before the Command enum, since they are not part of it.
///
/// # Arguments
/// * `deps` - Handler dependencies (store, premium registry, settings)
///
/// # Returns
/// The complete handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_premium = deps.clone();
    let deps_add_channel = deps.clone();
    let deps_broadcast = deps.clone();
    let deps_commands = deps.clone();
    let deps_messages = deps;

    dptree::entry()
        // Argument-taking admin commands (not in Command enum)
        .branch(premium_handler(deps_premium))
        .branch(add_channel_handler(deps_add_channel))
        .branch(broadcast_handler(deps_broadcast))
        // Command handler
        .branch(command_handler(deps_commands))
        // Message handler for Mega links and other text
        .branch(message_handler(deps_messages))
}

/// True when `text` invokes `command` as its first whitespace-delimited
/// token, so "/premiumfoo" does not match "/premium".
fn command_matches(text: &str, command: &str) -> bool {
    text.split_whitespace().next() == Some(command)
}

/// Handler for the /premium admin command (not in Command enum)
fn premium_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|text| command_matches(text, "/premium")).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                use crate::telegram::admin::handle_premium_command;

                if let Err(e) = handle_premium_command(&bot, &msg, &deps).await {
                    log::error!("❌ /premium handler failed for user {}: {}", sender_id(&msg), e);
                }
                Ok(())
            }
        })
}

/// Handler for the /add_channel owner command (not in Command enum)
fn add_channel_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| {
            msg.text()
                .map(|text| command_matches(text, "/add_channel"))
                .unwrap_or(false)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                use crate::telegram::admin::handle_add_channel_command;

                if let Err(e) = handle_add_channel_command(&bot, &msg, &deps).await {
                    log::error!("❌ /add_channel handler failed for user {}: {}", sender_id(&msg), e);
                }
                Ok(())
            }
        })
}

/// Handler for the /broadcast owner command (not in Command enum)
fn broadcast_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|text| command_matches(text, "/broadcast")).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                use crate::telegram::admin::handle_broadcast_command;

                if let Err(e) = handle_broadcast_command(&bot, &msg, &deps).await {
                    log::error!("❌ /broadcast handler failed for user {}: {}", sender_id(&msg), e);
                }
                Ok(())
            }
        })
}

/// Handler for bot commands (/start, /help, /stats, /myfiles)
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    use crate::telegram::admin::handle_stats_command;

    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);

                match cmd {
                    // /help shows the same tiered menu as /start
                    Command::Start | Command::Help => {
                        handle_start_command(&bot, &msg, &deps).await?;
                    }
                    Command::Stats => {
                        handle_stats_command(&bot, &msg, &deps).await?;
                    }
                    Command::Myfiles => {
                        handle_myfiles_command(&bot, &msg, &deps).await?;
                    }
                }
                Ok(())
            }
        },
    ))
}

/// Handler for regular text messages (Mega links and everything else)
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|text| !text.starts_with('/')).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_message(&bot, &msg, &deps).await {
                    log::error!("❌ Message handler failed for user {}: {}", sender_id(&msg), e);
                }
                Ok(())
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_matches_whole_token_only() {
        assert!(command_matches("/premium", "/premium"));
        assert!(command_matches("/premium add 333", "/premium"));
        assert!(command_matches("/broadcast hello", "/broadcast"));
        assert!(command_matches("/add_channel -100123 Archive", "/add_channel"));

        assert!(!command_matches("/premiumfoo", "/premium"));
        assert!(!command_matches("/broadcastx hello", "/broadcast"));
        assert!(!command_matches("/add_channels -100123 x", "/add_channel"));
        assert!(!command_matches("", "/premium"));
        assert!(!command_matches("premium add 333", "/premium"));
    }
}
