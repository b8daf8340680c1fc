use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

use crate::core::error::AppError;

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: coursebot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "coursebot.log".to_string()));

/// Environment-sourced bot settings, read once at startup.
///
/// `BOT_TOKEN` and a nonzero `OWNER_ID` are required; startup aborts with a
/// diagnostic if either is missing. Everything else has a sensible default.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Telegram bot token (required)
    pub bot_token: String,
    /// Telegram id of the single owner (required, nonzero)
    pub owner_id: i64,
    /// Owner's @username for user-facing contact hints
    pub owner_username: String,
    /// Bot's own @username
    pub bot_username: String,
    /// Admin ids from ADMIN_IDS (comma-separated); always includes the owner
    pub admin_ids: Vec<i64>,
    /// SQLite database path; when unset the flat-file backend is used
    pub database_path: Option<String>,
    /// Directory for the flat-file backend's per-collection JSON files
    pub data_dir: String,
    /// Mega credentials (declared for future use, unused by current logic)
    pub mega_email: String,
    pub mega_password: String,
}

impl Settings {
    /// Reads settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `BOT_TOKEN` is missing or `OWNER_ID` is
    /// missing, non-numeric, or zero.
    pub fn from_env() -> Result<Self, AppError> {
        let bot_token = env::var("BOT_TOKEN")
            .map_err(|_| AppError::Config("BOT_TOKEN environment variable is required".to_string()))?;
        if bot_token.is_empty() {
            return Err(AppError::Config("BOT_TOKEN environment variable is required".to_string()));
        }

        let owner_id: i64 = env::var("OWNER_ID")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);
        if owner_id == 0 {
            return Err(AppError::Config("OWNER_ID environment variable is required".to_string()));
        }

        let mut admin_ids: Vec<i64> = env::var("ADMIN_IDS")
            .unwrap_or_default()
            .split(',')
            .filter_map(|id| id.trim().parse().ok())
            .collect();
        // The owner is always an admin
        if !admin_ids.contains(&owner_id) {
            admin_ids.push(owner_id);
        }

        Ok(Settings {
            bot_token,
            owner_id,
            owner_username: env::var("OWNER_USERNAME").unwrap_or_else(|_| "owner_username".to_string()),
            bot_username: env::var("BOT_USERNAME").unwrap_or_else(|_| "your_bot_username".to_string()),
            admin_ids,
            database_path: env::var("DATABASE_PATH").ok().filter(|p| !p.is_empty()),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            mega_email: env::var("MEGA_EMAIL").unwrap_or_default(),
            mega_password: env::var("MEGA_PASSWORD").unwrap_or_default(),
        })
    }

    /// Returns true if `user_id` is the configured owner.
    pub fn is_owner(&self, user_id: i64) -> bool {
        user_id == self.owner_id
    }

    /// Returns true if `user_id` is in the admin set (the owner always is).
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// Admins other than the owner.
    pub fn admin_count(&self) -> usize {
        self.admin_ids.iter().filter(|id| **id != self.owner_id).count()
    }
}

/// File size limits
///
/// Declared for parity with the planned real transfer pipeline; the
/// simulator does not enforce them.
pub mod limits {
    /// Maximum file size accepted by the standard Telegram Bot API (50 MB)
    pub const TELEGRAM_MAX_SIZE_BYTES: u64 = 50 * 1024 * 1024;

    /// Logical maximum file size advertised to users (5 GB)
    pub const MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024 * 1024;
}

/// Broadcast configuration
pub mod broadcast {
    use super::Duration;

    /// Delay between individual broadcast sends (rate limiting)
    pub const SEND_DELAY_MS: u64 = 100;

    /// Broadcast send delay duration
    pub fn send_delay() -> Duration {
        Duration::from_millis(SEND_DELAY_MS)
    }
}

/// Transfer simulator configuration
pub mod transfer {
    use super::Duration;

    /// Simulated download phase duration (in seconds)
    pub const DOWNLOAD_DELAY_SECS: u64 = 2;

    /// Simulated upload phase duration (in seconds)
    pub const UPLOAD_DELAY_SECS: u64 = 3;

    /// File name fabricated for every simulated transfer
    pub const SIMULATED_FILE_NAME: &str = "course-file.pdf";

    /// File size fabricated for every simulated transfer
    pub const SIMULATED_FILE_SIZE: &str = "150MB";

    /// Simulated download phase duration
    pub fn download_delay() -> Duration {
        Duration::from_secs(DOWNLOAD_DELAY_SECS)
    }

    /// Simulated upload phase duration
    pub fn upload_delay() -> Duration {
        Duration::from_secs(UPLOAD_DELAY_SECS)
    }
}

#[cfg(test)]
pub(crate) fn test_settings(owner_id: i64, admin_ids: Vec<i64>) -> Settings {
    let mut admin_ids = admin_ids;
    if !admin_ids.contains(&owner_id) {
        admin_ids.push(owner_id);
    }
    Settings {
        bot_token: "test-token".to_string(),
        owner_id,
        owner_username: "owner_username".to_string(),
        bot_username: "course_bot".to_string(),
        admin_ids,
        database_path: None,
        data_dir: "data".to_string(),
        mega_email: String::new(),
        mega_password: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_is_always_admin() {
        let settings = test_settings(111, vec![222]);
        assert!(settings.is_admin(111));
        assert!(settings.is_admin(222));
        assert!(!settings.is_admin(333));
    }

    #[test]
    fn test_admin_count_excludes_owner() {
        let settings = test_settings(111, vec![111, 222, 333]);
        assert_eq!(settings.admin_count(), 2);
    }
}
