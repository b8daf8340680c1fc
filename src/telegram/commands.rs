//! Command handler implementations (/start, /help, /myfiles) and free-text routing

use teloxide::prelude::*;
use teloxide::types::Message;

use crate::core::access::resolve_tier;
use crate::storage::models::NewUser;
use crate::telegram::handlers::{sender_id, HandlerDeps, HandlerError};
use crate::telegram::menus;
use crate::telegram::transfer::process_mega_link;

/// Extracts profile fields for the user upsert; chat id is the fallback when
/// the message carries no sender.
fn new_user_from_message(msg: &Message) -> NewUser {
    NewUser {
        user_id: sender_id(msg),
        first_name: msg.from.as_ref().map(|u| u.first_name.clone()).unwrap_or_default(),
        username: msg.from.as_ref().and_then(|u| u.username.clone()),
    }
}

/// Handle /start and /help commands
///
/// Records the user and replies with the menu for their tier. A storage
/// failure is logged but never blocks the welcome.
pub async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user_id = sender_id(msg);

    if let Err(e) = deps.store.upsert_user(&new_user_from_message(msg)) {
        log::error!("Failed to save user {}: {}", user_id, e);
    }

    let tier = resolve_tier(&deps.settings, &deps.registry, user_id);
    log::info!("👋 /start from user {} resolved as {:?}", user_id, tier);

    bot.send_message(
        msg.chat.id,
        menus::welcome_for_tier(tier, &deps.settings.owner_username, user_id),
    )
    .await?;
    Ok(())
}

/// Handle /myfiles command
pub async fn handle_myfiles_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user_id = sender_id(msg);
    let tier = resolve_tier(&deps.settings, &deps.registry, user_id);

    if !tier.can_download() {
        bot.send_message(
            msg.chat.id,
            format!(
                "❌ Premium feature. Contact @{} for access.",
                deps.settings.owner_username
            ),
        )
        .await?;
        return Ok(());
    }

    let files = match deps.store.list_active_user_files(user_id) {
        Ok(files) => files,
        Err(e) => {
            log::error!("Failed to list files for user {}: {}", user_id, e);
            Vec::new()
        }
    };

    bot.send_message(msg.chat.id, menus::myfiles_text(&files)).await?;
    Ok(())
}

/// Handle free-text messages, including Mega links
///
/// Public users get the upgrade prompt with their id. Premium and above get
/// either the simulated transfer (text mentions mega.nz) or a nudge to send
/// a valid link.
pub async fn handle_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user_id = sender_id(msg);
    let text = msg.text().unwrap_or_default();

    if let Err(e) = deps.store.upsert_user(&new_user_from_message(msg)) {
        log::error!("Failed to save user {}: {}", user_id, e);
    }

    let tier = resolve_tier(&deps.settings, &deps.registry, user_id);
    if !tier.can_download() {
        bot.send_message(
            msg.chat.id,
            menus::premium_required(&deps.settings.owner_username, user_id),
        )
        .await?;
        return Ok(());
    }

    if text.contains("mega.nz") {
        process_mega_link(bot, msg, deps, text).await?;
    } else {
        bot.send_message(msg.chat.id, "Please send a valid Mega.nz link to download files.")
            .await?;
    }
    Ok(())
}
