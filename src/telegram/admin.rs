//! Admin command implementations (/premium, /stats, /add_channel, /broadcast)
//!
//! Argument parsing and the state transitions are plain functions so the
//! access rules can be tested without a bot. The handlers wrap them with the
//! tier checks and replies.

use teloxide::prelude::*;
use teloxide::types::Message;
use tokio::time::sleep;

use crate::core::access::{resolve_tier, PremiumRegistry};
use crate::core::config::{broadcast, Settings};
use crate::storage::models::{Channel, PremiumGrant};
use crate::storage::{Store, StoreResult};
use crate::telegram::handlers::{sender_id, HandlerDeps, HandlerError};
use crate::telegram::menus;
use crate::telegram::notifications::notify_premium_granted;

/// A parsed /premium invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PremiumAction {
    /// Bare /premium: show the management panel.
    Panel,
    Add(i64),
    AddInvalid,
    Remove(i64),
    RemoveInvalid,
    List,
    Check(i64),
    CheckInvalid,
    /// Unrecognized subcommand or missing argument; answered with silence.
    Unknown,
}

/// Parses the text of a /premium message.
pub fn parse_premium_command(text: &str) -> PremiumAction {
    let mut args = text.split_whitespace().skip(1);
    let action = match args.next() {
        Some(action) => action.to_lowercase(),
        None => return PremiumAction::Panel,
    };

    match action.as_str() {
        "add" => match args.next() {
            Some(id) => id.parse().map(PremiumAction::Add).unwrap_or(PremiumAction::AddInvalid),
            None => PremiumAction::Unknown,
        },
        "remove" => match args.next() {
            Some(id) => id
                .parse()
                .map(PremiumAction::Remove)
                .unwrap_or(PremiumAction::RemoveInvalid),
            None => PremiumAction::Unknown,
        },
        "list" => PremiumAction::List,
        "check" => match args.next() {
            Some(id) => id
                .parse()
                .map(PremiumAction::Check)
                .unwrap_or(PremiumAction::CheckInvalid),
            None => PremiumAction::Unknown,
        },
        _ => PremiumAction::Unknown,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PremiumAddOutcome {
    Granted,
    AlreadyPremium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PremiumRemoveOutcome {
    Removed,
    /// Owner and admins cannot lose premium access.
    Protected,
    NotPremium,
}

/// Grants premium access: registry first, then the durable grant record.
/// If the grant cannot be persisted the registry insertion is undone, so
/// in-memory access never outlives its durable log entry.
pub fn apply_premium_add(
    store: &dyn Store,
    registry: &PremiumRegistry,
    target_id: i64,
    added_by: i64,
) -> StoreResult<PremiumAddOutcome> {
    if !registry.insert(target_id) {
        return Ok(PremiumAddOutcome::AlreadyPremium);
    }
    if let Err(e) = store.upsert_premium_grant(&PremiumGrant::new(target_id, added_by)) {
        registry.remove(target_id);
        return Err(e);
    }
    Ok(PremiumAddOutcome::Granted)
}

/// Revokes premium access, refusing to touch the owner or an admin. The
/// persisted grant is deactivated, never deleted.
pub fn apply_premium_remove(
    store: &dyn Store,
    registry: &PremiumRegistry,
    settings: &Settings,
    target_id: i64,
) -> StoreResult<PremiumRemoveOutcome> {
    if settings.is_admin(target_id) {
        return Ok(PremiumRemoveOutcome::Protected);
    }
    if !registry.remove(target_id) {
        return Ok(PremiumRemoveOutcome::NotPremium);
    }
    store.deactivate_premium_grant(target_id)?;
    Ok(PremiumRemoveOutcome::Removed)
}

/// Handle the /premium command and its subcommands
pub async fn handle_premium_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user_id = sender_id(msg);
    let tier = resolve_tier(&deps.settings, &deps.registry, user_id);

    if !tier.can_manage() {
        bot.send_message(msg.chat.id, "❌ Only owner and admins can manage premium users.")
            .await?;
        return Ok(());
    }

    let action = parse_premium_command(msg.text().unwrap_or_default());
    log::info!("💎 /premium {:?} from user {}", action, user_id);

    match action {
        PremiumAction::Panel => {
            let panel = menus::premium_panel(
                &deps.settings.owner_username,
                deps.registry.granted_count(&deps.settings),
            );
            bot.send_message(msg.chat.id, panel).await?;
        }
        PremiumAction::Add(target_id) => {
            match apply_premium_add(deps.store.as_ref(), &deps.registry, target_id, user_id) {
                Ok(PremiumAddOutcome::Granted) => {
                    notify_premium_granted(bot, deps, target_id).await;
                    bot.send_message(msg.chat.id, format!("✅ Premium access granted to user {}", target_id))
                        .await?;
                }
                Ok(PremiumAddOutcome::AlreadyPremium) => {
                    bot.send_message(msg.chat.id, "✅ User already has premium access")
                        .await?;
                }
                Err(e) => {
                    log::error!("Failed to persist premium grant for {}: {}", target_id, e);
                    bot.send_message(msg.chat.id, "❌ Failed to save premium user").await?;
                }
            }
        }
        PremiumAction::Remove(target_id) => {
            match apply_premium_remove(deps.store.as_ref(), &deps.registry, &deps.settings, target_id) {
                Ok(PremiumRemoveOutcome::Removed) => {
                    bot.send_message(msg.chat.id, format!("✅ Premium access removed from user {}", target_id))
                        .await?;
                }
                Ok(PremiumRemoveOutcome::Protected) | Ok(PremiumRemoveOutcome::NotPremium) => {
                    bot.send_message(msg.chat.id, "❌ User not found or cannot remove owner/admin")
                        .await?;
                }
                Err(e) => {
                    log::error!("Failed to deactivate premium grant for {}: {}", target_id, e);
                    bot.send_message(msg.chat.id, "❌ Failed to remove premium user").await?;
                }
            }
        }
        PremiumAction::List => {
            let entries: Vec<_> = deps
                .registry
                .snapshot()
                .into_iter()
                .map(|member_id| {
                    let username = deps
                        .store
                        .get_user(member_id)
                        .ok()
                        .flatten()
                        .and_then(|u| u.username);
                    let member_tier = resolve_tier(&deps.settings, &deps.registry, member_id);
                    (member_id, username, member_tier)
                })
                .collect();
            bot.send_message(msg.chat.id, menus::premium_list(&entries)).await?;
        }
        PremiumAction::Check(target_id) => {
            let username = deps.store.get_user(target_id).ok().flatten().and_then(|u| u.username);
            let is_premium = deps.registry.contains(target_id);
            bot.send_message(
                msg.chat.id,
                menus::premium_check(target_id, username.as_deref(), is_premium),
            )
            .await?;
        }
        PremiumAction::AddInvalid => {
            bot.send_message(msg.chat.id, "❌ Invalid user ID. Please provide a numeric ID.")
                .await?;
        }
        PremiumAction::RemoveInvalid | PremiumAction::CheckInvalid => {
            bot.send_message(msg.chat.id, "❌ Invalid user ID").await?;
        }
        PremiumAction::Unknown => {
            log::warn!("Unrecognized /premium invocation from user {}", user_id);
        }
    }
    Ok(())
}

/// Handle the /stats command
pub async fn handle_stats_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user_id = sender_id(msg);
    let tier = resolve_tier(&deps.settings, &deps.registry, user_id);

    if !tier.can_manage() {
        bot.send_message(msg.chat.id, "❌ Admin access required.").await?;
        return Ok(());
    }

    let total_users = match deps.store.count_users() {
        Ok(count) => count,
        Err(e) => {
            log::error!("Failed to count users: {}", e);
            0
        }
    };

    let text = menus::stats_text(
        total_users,
        deps.registry.granted_count(&deps.settings),
        deps.settings.admin_count(),
        &deps.settings.owner_username,
        &deps.settings.bot_username,
    );
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Parses "/add_channel <channel_id> <name...>"; the name may span words.
pub fn parse_add_channel(text: &str) -> Option<(String, String)> {
    let mut args = text.split_whitespace().skip(1);
    let channel_id = args.next()?.to_string();
    let name = args.collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return None;
    }
    Some((channel_id, name))
}

/// Handle the /add_channel command (owner only)
pub async fn handle_add_channel_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user_id = sender_id(msg);

    if !deps.settings.is_owner(user_id) {
        bot.send_message(msg.chat.id, "❌ Only owner can add channels.").await?;
        return Ok(());
    }

    let Some((channel_id, name)) = parse_add_channel(msg.text().unwrap_or_default()) else {
        bot.send_message(
            msg.chat.id,
            "Usage: /add_channel <channel_id> <channel_name>\n\n\
             Example: /add_channel -1001234567890 \"My Course Channel\"",
        )
        .await?;
        return Ok(());
    };

    let channel = Channel {
        channel_id,
        name: name.clone(),
        added_by: user_id,
        added_date: chrono::Utc::now(),
    };

    match deps.store.upsert_channel(&channel) {
        Ok(()) => {
            log::info!("🔗 Channel '{}' registered by owner {}", name, user_id);
            bot.send_message(msg.chat.id, format!("✅ Channel '{}' added successfully!", name))
                .await?;
        }
        Err(e) => {
            log::error!("Failed to save channel '{}': {}", name, e);
            bot.send_message(msg.chat.id, "❌ Failed to add channel").await?;
        }
    }
    Ok(())
}

/// Extracts the broadcast payload, None when it is missing or blank.
pub fn parse_broadcast(text: &str) -> Option<&str> {
    let payload = text.strip_prefix("/broadcast")?.trim();
    if payload.is_empty() {
        None
    } else {
        Some(payload)
    }
}

/// Handle the /broadcast command (owner only)
///
/// Sends the announcement to every known user with a short delay between
/// sends to stay under Telegram rate limits, then edits the progress message
/// with the delivered/total tally.
pub async fn handle_broadcast_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user_id = sender_id(msg);

    if !deps.settings.is_owner(user_id) {
        bot.send_message(msg.chat.id, "❌ Only owner can broadcast messages.")
            .await?;
        return Ok(());
    }

    let Some(message) = parse_broadcast(msg.text().unwrap_or_default()) else {
        bot.send_message(msg.chat.id, "Usage: /broadcast <message>").await?;
        return Ok(());
    };

    let users = match deps.store.list_users() {
        Ok(users) => users,
        Err(e) => {
            log::error!("Failed to list users for broadcast: {}", e);
            Vec::new()
        }
    };

    let status = bot
        .send_message(msg.chat.id, format!("📢 Broadcasting to {} users...", users.len()))
        .await?;

    let announcement = menus::broadcast_announcement(message, &deps.settings.owner_username);
    let mut success_count = 0usize;
    for user in &users {
        match bot.send_message(ChatId(user.user_id), announcement.clone()).await {
            Ok(_) => success_count += 1,
            Err(e) => log::warn!("Failed to send broadcast to {}: {}", user.user_id, e),
        }
        sleep(broadcast::send_delay()).await;
    }

    log::info!(
        "📢 Broadcast by owner {} delivered to {}/{} users",
        user_id,
        success_count,
        users.len()
    );
    bot.edit_message_text(
        msg.chat.id,
        status.id,
        format!("✅ Broadcast completed: {}/{} users received", success_count, users.len()),
    )
    .await?;
    Ok(())
}
