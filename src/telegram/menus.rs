//! Reply text builders
//!
//! Every user-facing message is assembled here as a plain function of its
//! inputs, so handler logic and the exact wording can both be tested without
//! touching the Telegram API.

use crate::core::access::AccessTier;
use crate::storage::models::UserFile;

/// Number of files shown in full by /myfiles before collapsing to a count.
pub const MYFILES_PREVIEW_LIMIT: usize = 5;

/// Welcome text for /start and /help, selected by the caller's tier.
pub fn welcome_for_tier(tier: AccessTier, owner_username: &str, user_id: i64) -> String {
    match tier {
        AccessTier::Owner => owner_panel(),
        AccessTier::Admin => admin_panel(owner_username),
        AccessTier::Premium => premium_welcome(),
        AccessTier::Public => public_welcome(owner_username, user_id),
    }
}

fn owner_panel() -> String {
    "👑 **OWNER PANEL**\n\n\
     Welcome back! Here are your commands:\n\n\
     💎 /premium - Manage premium users\n\
     📢 /broadcast - Broadcast message\n\
     📊 /stats - Bot statistics\n\
     📁 /myfiles - Your downloaded files\n\
     🔗 /add_channel - Add upload channel"
        .to_string()
}

fn admin_panel(owner_username: &str) -> String {
    format!(
        "⚡ **ADMIN PANEL**\n\n\
         Welcome! Admin commands available.\n\n\
         💎 /premium - Manage users\n\
         📊 /stats - Statistics\n\
         👑 Owner: @{owner_username}"
    )
}

fn premium_welcome() -> String {
    "🎉 **PREMIUM USER**\n\n\
     Welcome back! You have premium access.\n\n\
     🚀 **You can:**\n\
     • Download Mega links\n\
     • Get files in your storage\n\
     • Auto upload to channels\n\n\
     💡 **Just send any Mega.nz link to start!**\n\n\
     📁 /myfiles - Your downloaded files"
        .to_string()
}

fn public_welcome(owner_username: &str, user_id: i64) -> String {
    format!(
        "🔒 **PREMIUM BOT**\n\n\
         Hi! This is an exclusive premium bot.\n\n\
         💎 **Features:**\n\
         • 5GB File Support\n\
         • Auto Channel Upload\n\
         • Personal File Storage\n\n\
         📧 **Contact Owner:** @{owner_username}\n\
         🆔 **Your ID:** `{user_id}`\n\n\
         💰 **Message owner with your ID for premium access**"
    )
}

/// The /premium management panel shown on a bare /premium.
pub fn premium_panel(owner_username: &str, granted_count: usize) -> String {
    format!(
        "💎 **PREMIUM USER MANAGEMENT**\n\n\
         👑 **Owner:** @{owner_username}\n\
         📊 **Total Premium Users:** {granted_count}\n\n\
         🛠 **Commands:**\n\
         /premium add <user_id> - Add premium user\n\
         /premium remove <user_id> - Remove premium user\n\
         /premium list - List all premium users\n\
         /premium check <user_id> - Check user status"
    )
}

/// One line per premium member, labelled by tier.
///
/// `entries` pairs each member id with its stored username (if any) and
/// resolved tier, in the order the list should be rendered.
pub fn premium_list(entries: &[(i64, Option<String>, AccessTier)]) -> String {
    let mut text = String::from("📋 **Premium Users:**\n\n");
    for (user_id, username, tier) in entries {
        let username = username.as_deref().unwrap_or("N/A");
        text.push_str(&format!("{}: @{} (ID: {})\n", tier.label(), username, user_id));
    }
    text
}

/// The /premium check report for one user.
pub fn premium_check(user_id: i64, username: Option<&str>, is_premium: bool) -> String {
    let status = if is_premium { "✅ ACTIVE" } else { "❌ INACTIVE" };
    format!(
        "📋 **User Check**\n\n\
         🆔 **User ID:** {user_id}\n\
         👤 **Username:** @{}\n\
         💎 **Premium Status:** {status}",
        username.unwrap_or("N/A")
    )
}

/// The /stats report.
pub fn stats_text(
    total_users: u64,
    premium_count: usize,
    admin_count: usize,
    owner_username: &str,
    bot_username: &str,
) -> String {
    format!(
        "📊 **BOT STATISTICS**\n\n\
         👥 **Total Users:** {total_users}\n\
         💎 **Premium Users:** {premium_count}\n\
         ⚡ **Admins:** {admin_count}\n\
         👑 **Owner:** @{owner_username}\n\n\
         🤖 **Bot:** @{bot_username}"
    )
}

/// The /myfiles listing: full entries for the first few files, a collapsed
/// count for the rest, and a dedicated empty state.
pub fn myfiles_text(files: &[UserFile]) -> String {
    if files.is_empty() {
        return "📭 **Your File Storage**\n\n\
                You haven't downloaded any files yet.\n\n\
                🚀 **To get started:**\n\
                1. Send any Mega.nz link\n\
                2. File will be saved here automatically\n\
                3. Access your files anytime\n\n\
                💡 **Try sending a Mega link now!**"
            .to_string();
    }

    let mut text = format!(
        "📚 **Your Downloaded Files**\n\n📊 **Total Files:** {}\n\n",
        files.len()
    );
    for (i, file) in files.iter().take(MYFILES_PREVIEW_LIMIT).enumerate() {
        text.push_str(&format!("{}. 📁 {}\n", i + 1, file.file_name));
        text.push_str(&format!("   📅 {}\n\n", file.downloaded_at.format("%Y-%m-%d %H:%M")));
    }
    if files.len() > MYFILES_PREVIEW_LIMIT {
        text.push_str(&format!("... and {} more files\n", files.len() - MYFILES_PREVIEW_LIMIT));
    }
    text.push_str("\n💡 **Send any Mega link to add more files!**");
    text
}

/// Refusal shown to public users who message the bot, quoting their id so
/// they can forward it to the owner.
pub fn premium_required(owner_username: &str, user_id: i64) -> String {
    format!(
        "❌ Premium access required.\n\n\
         Contact @{owner_username} for premium access.\n\
         Your ID: `{user_id}`"
    )
}

/// Notification sent to a user who was just granted premium access.
pub fn premium_granted_notice(owner_username: &str) -> String {
    format!(
        "🎉 **CONGRATULATIONS!**\n\n\
         You've been granted **PREMIUM ACCESS** to the course bot!\n\n\
         ✅ **Now you can:**\n\
         • Download any Mega link\n\
         • Get files in your personal storage\n\
         • Auto upload to owner's channel\n\n\
         🚀 **Simply send any Mega link to start downloading!**\n\n\
         👑 **Bot Owner:** @{owner_username}"
    )
}

/// Final summary after a simulated transfer finishes.
pub fn download_complete(file_name: &str, file_size: &str, username: &str) -> String {
    format!(
        "✅ **DOWNLOAD COMPLETE!**\n\n\
         📁 **File:** {file_name}\n\
         💾 **Size:** {file_size}\n\
         👤 **Downloaded by:** @{username}\n\n\
         ✅ **File saved to your personal storage**\n\
         ✅ **Uploaded to owner's channels**\n\n\
         📁 Use /myfiles to see all your files\n\n\
         🎉 **Happy Learning!**"
    )
}

/// The message delivered to each user during a broadcast.
pub fn broadcast_announcement(message: &str, owner_username: &str) -> String {
    format!("📢 **Announcement from Owner:**\n\n{message}\n\n👑 @{owner_username}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn file(name: &str) -> UserFile {
        UserFile {
            user_id: 333,
            file_name: name.to_string(),
            file_size: "150MB".to_string(),
            download_id: "ABCD1234".to_string(),
            downloaded_at: chrono::Utc::now(),
            active: true,
        }
    }

    #[test]
    fn test_welcome_selects_tier_panel() {
        assert!(welcome_for_tier(AccessTier::Owner, "boss", 111).contains("OWNER PANEL"));
        assert!(welcome_for_tier(AccessTier::Admin, "boss", 222).contains("ADMIN PANEL"));
        assert!(welcome_for_tier(AccessTier::Premium, "boss", 333).contains("PREMIUM USER"));

        let public = welcome_for_tier(AccessTier::Public, "boss", 333);
        assert!(public.contains("@boss"));
        assert!(public.contains("`333`"));
    }

    #[test]
    fn test_myfiles_empty_state() {
        let text = myfiles_text(&[]);
        assert!(text.contains("You haven't downloaded any files yet"));
    }

    #[test]
    fn test_myfiles_caps_preview_at_five() {
        let files: Vec<UserFile> = (0..8).map(|i| file(&format!("file-{i}.pdf"))).collect();
        let text = myfiles_text(&files);

        assert!(text.contains("**Total Files:** 8"));
        assert!(text.contains("5. 📁 file-4.pdf"));
        assert!(!text.contains("file-5.pdf"));
        assert!(text.contains("... and 3 more files"));
    }

    #[test]
    fn test_myfiles_short_list_has_no_overflow_line() {
        let files = vec![file("only.pdf")];
        let text = myfiles_text(&files);
        assert!(text.contains("1. 📁 only.pdf"));
        assert!(!text.contains("more files"));
    }

    #[test]
    fn test_premium_list_labels() {
        let entries = vec![
            (111, Some("boss".to_string()), AccessTier::Owner),
            (222, None, AccessTier::Admin),
            (333, Some("alice".to_string()), AccessTier::Premium),
        ];
        let text = premium_list(&entries);
        assert!(text.contains("👑 Owner: @boss (ID: 111)"));
        assert!(text.contains("⚡ Admin: @N/A (ID: 222)"));
        assert!(text.contains("💎 User: @alice (ID: 333)"));
    }

    #[test]
    fn test_premium_check_status_line() {
        assert!(premium_check(333, Some("alice"), true).contains("✅ ACTIVE"));
        assert!(premium_check(444, None, false).contains("❌ INACTIVE"));
    }

    #[test]
    fn test_stats_text_fields() {
        let text = stats_text(42, 3, 2, "boss", "course_bot");
        assert_eq!(
            text,
            "📊 **BOT STATISTICS**\n\n\
             👥 **Total Users:** 42\n\
             💎 **Premium Users:** 3\n\
             ⚡ **Admins:** 2\n\
             👑 **Owner:** @boss\n\n\
             🤖 **Bot:** @course_bot"
        );
    }
}
