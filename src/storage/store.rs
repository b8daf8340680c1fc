//! The storage contract and backend selection.
//!
//! Every operation behaves identically on both backends. Methods return an
//! explicit `StoreResult` so failure handling is visible at each call site;
//! handlers log storage failures and degrade gracefully (zero counts, empty
//! lists) instead of aborting the command.

use std::sync::Arc;
use thiserror::Error;

use crate::core::config::Settings;
use crate::storage::jsonfile::JsonFileStore;
use crate::storage::models::{
    Channel, DownloadRecord, DownloadStatus, NewUser, PremiumGrant, UserFile, UserRecord,
};
use crate::storage::sqlite::SqliteStore;

/// Errors raised by either storage backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Uniform record-store contract implemented by both backends.
///
/// Upsert semantics: the same identifying key replaces the record (users,
/// premium grants, channels). Append semantics: no identity merge (user
/// files, download records).
pub trait Store: Send + Sync {
    /// Creates the user on first sight, otherwise refreshes the name fields
    /// and `last_activity`. `created_at` and `download_count` are preserved.
    fn upsert_user(&self, user: &NewUser) -> StoreResult<()>;

    fn get_user(&self, user_id: i64) -> StoreResult<Option<UserRecord>>;

    fn count_users(&self) -> StoreResult<u64>;

    /// All known users, for broadcast.
    fn list_users(&self) -> StoreResult<Vec<UserRecord>>;

    /// Last-write-wins on `user_id`.
    fn upsert_premium_grant(&self, grant: &PremiumGrant) -> StoreResult<()>;

    /// Returns the grant for `user_id` regardless of its `active` flag.
    fn get_premium_grant(&self, user_id: i64) -> StoreResult<Option<PremiumGrant>>;

    fn list_active_premium_grants(&self) -> StoreResult<Vec<PremiumGrant>>;

    /// Soft delete: sets `active = false`, never removes the record.
    fn deactivate_premium_grant(&self, user_id: i64) -> StoreResult<()>;

    /// Replacing an existing `channel_id` overwrites the record wholesale.
    fn upsert_channel(&self, channel: &Channel) -> StoreResult<()>;

    fn list_channels(&self) -> StoreResult<Vec<Channel>>;

    /// Returns true if a channel was removed.
    fn delete_channel(&self, channel_id: &str) -> StoreResult<bool>;

    fn append_user_file(&self, file: &UserFile) -> StoreResult<()>;

    /// Only records with `active = true` are returned.
    fn list_active_user_files(&self, user_id: i64) -> StoreResult<Vec<UserFile>>;

    fn append_download_record(&self, record: &DownloadRecord) -> StoreResult<()>;

    /// Transitions a download to `status`, stamping `completed_at` and
    /// recording `error_message` when given.
    fn set_download_status(
        &self,
        download_id: &str,
        status: DownloadStatus,
        error_message: Option<&str>,
    ) -> StoreResult<()>;
}


/// Opens the storage backend selected by configuration.
///
/// When `DATABASE_PATH` is set the SQLite backend is tried first; an open
/// failure logs a warning and falls back to the flat-file backend in
/// `DATA_DIR`. The choice is made once here; callers only ever see the
/// `Store` trait.
pub fn open_store(settings: &Settings) -> StoreResult<Arc<dyn Store>> {
    if let Some(path) = &settings.database_path {
        match SqliteStore::open(path) {
            Ok(store) => {
                log::info!("✅ Using SQLite storage backend at {}", path);
                return Ok(Arc::new(store));
            }
            Err(e) => {
                log::warn!(
                    "⚠️ Failed to open SQLite database at {}: {}. Falling back to flat-file storage",
                    path,
                    e
                );
            }
        }
    }

    let store = JsonFileStore::open(&settings.data_dir)?;
    log::info!("⚠️ Using local JSON storage backend in {}/", settings.data_dir);
    Ok(Arc::new(store))
}
