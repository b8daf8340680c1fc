//! Best-effort user notifications

use teloxide::prelude::*;

use crate::telegram::handlers::HandlerDeps;
use crate::telegram::menus;

/// Tells a freshly granted user about their premium access.
///
/// Delivery is best-effort: the user may never have opened the bot, in which
/// case Telegram refuses the message. The grant stands either way.
pub async fn notify_premium_granted(bot: &Bot, deps: &HandlerDeps, target_id: i64) {
    let notice = menus::premium_granted_notice(&deps.settings.owner_username);
    if let Err(e) = bot.send_message(ChatId(target_id), notice).await {
        log::warn!("Could not notify user {} about premium grant: {}", target_id, e);
    }
}
