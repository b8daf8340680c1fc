//! Flat-file JSON storage backend
//!
//! Fallback backend used when no database path is configured. Each collection
//! lives in one JSON file under the data directory and is kept fully in
//! memory; every mutation rewrites its file. Fine for the small datasets this
//! bot handles, and trivially inspectable with a text editor.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::storage::models::{
    Channel, DownloadRecord, DownloadStatus, NewUser, PremiumGrant, UserFile, UserRecord,
};
use crate::storage::store::{Store, StoreResult};

const USERS_FILE: &str = "users.json";
const PREMIUM_FILE: &str = "premium_users.json";
const CHANNELS_FILE: &str = "channels.json";
const USER_FILES_FILE: &str = "user_files.json";
const DOWNLOADS_FILE: &str = "downloads.json";

/// In-memory collections mirrored to JSON files on every mutation.
pub struct JsonFileStore {
    dir: PathBuf,
    users: Mutex<Vec<UserRecord>>,
    grants: Mutex<Vec<PremiumGrant>>,
    channels: Mutex<Vec<Channel>>,
    user_files: Mutex<Vec<UserFile>>,
    downloads: Mutex<Vec<DownloadRecord>>,
}

/// Reads a collection file, treating a missing file as an empty collection.
fn load_collection<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path)?;
    let items = serde_json::from_reader(BufReader::new(file))?;
    Ok(items)
}

impl JsonFileStore {
    /// Opens the store in `dir`, creating the directory if needed and loading
    /// any collection files already present.
    pub fn open(dir: &str) -> StoreResult<Self> {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        Ok(JsonFileStore {
            users: Mutex::new(load_collection(&dir.join(USERS_FILE))?),
            grants: Mutex::new(load_collection(&dir.join(PREMIUM_FILE))?),
            channels: Mutex::new(load_collection(&dir.join(CHANNELS_FILE))?),
            user_files: Mutex::new(load_collection(&dir.join(USER_FILES_FILE))?),
            downloads: Mutex::new(load_collection(&dir.join(DOWNLOADS_FILE))?),
            dir,
        })
    }

    /// Writes a collection to its file while the caller still holds the lock,
    /// so concurrent mutations cannot interleave a stale snapshot.
    fn persist<T: Serialize>(&self, file_name: &str, items: &[T]) -> StoreResult<()> {
        let file = File::create(self.dir.join(file_name))?;
        serde_json::to_writer_pretty(file, items)?;
        Ok(())
    }

    fn lock<'a, T>(&self, mutex: &'a Mutex<Vec<T>>) -> MutexGuard<'a, Vec<T>> {
        // A poisoned collection is still internally consistent; recover it.
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for JsonFileStore {
    fn upsert_user(&self, user: &NewUser) -> StoreResult<()> {
        let now = chrono::Utc::now();
        let mut users = self.lock(&self.users);
        match users.iter_mut().find(|u| u.user_id == user.user_id) {
            Some(existing) => {
                existing.first_name = user.first_name.clone();
                existing.username = user.username.clone();
                existing.last_activity = now;
            }
            None => users.push(UserRecord {
                user_id: user.user_id,
                first_name: user.first_name.clone(),
                username: user.username.clone(),
                created_at: now,
                last_activity: now,
                download_count: 0,
            }),
        }
        self.persist(USERS_FILE, &users)
    }

    fn get_user(&self, user_id: i64) -> StoreResult<Option<UserRecord>> {
        Ok(self.lock(&self.users).iter().find(|u| u.user_id == user_id).cloned())
    }

    fn count_users(&self) -> StoreResult<u64> {
        Ok(self.lock(&self.users).len() as u64)
    }

    fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        Ok(self.lock(&self.users).clone())
    }

    fn upsert_premium_grant(&self, grant: &PremiumGrant) -> StoreResult<()> {
        let mut grants = self.lock(&self.grants);
        grants.retain(|g| g.user_id != grant.user_id);
        grants.push(grant.clone());
        self.persist(PREMIUM_FILE, &grants)
    }

    fn get_premium_grant(&self, user_id: i64) -> StoreResult<Option<PremiumGrant>> {
        Ok(self.lock(&self.grants).iter().find(|g| g.user_id == user_id).cloned())
    }

    fn list_active_premium_grants(&self) -> StoreResult<Vec<PremiumGrant>> {
        Ok(self.lock(&self.grants).iter().filter(|g| g.active).cloned().collect())
    }

    fn deactivate_premium_grant(&self, user_id: i64) -> StoreResult<()> {
        let mut grants = self.lock(&self.grants);
        let mut changed = false;
        for grant in grants.iter_mut().filter(|g| g.user_id == user_id) {
            grant.active = false;
            changed = true;
        }
        if changed {
            self.persist(PREMIUM_FILE, &grants)?;
        }
        Ok(())
    }

    fn upsert_channel(&self, channel: &Channel) -> StoreResult<()> {
        let mut channels = self.lock(&self.channels);
        channels.retain(|c| c.channel_id != channel.channel_id);
        channels.push(channel.clone());
        self.persist(CHANNELS_FILE, &channels)
    }

    fn list_channels(&self) -> StoreResult<Vec<Channel>> {
        Ok(self.lock(&self.channels).clone())
    }

    fn delete_channel(&self, channel_id: &str) -> StoreResult<bool> {
        let mut channels = self.lock(&self.channels);
        let before = channels.len();
        channels.retain(|c| c.channel_id != channel_id);
        let removed = channels.len() < before;
        if removed {
            self.persist(CHANNELS_FILE, &channels)?;
        }
        Ok(removed)
    }

    fn append_user_file(&self, file: &UserFile) -> StoreResult<()> {
        let mut user_files = self.lock(&self.user_files);
        user_files.push(file.clone());
        self.persist(USER_FILES_FILE, &user_files)
    }

    fn list_active_user_files(&self, user_id: i64) -> StoreResult<Vec<UserFile>> {
        Ok(self
            .lock(&self.user_files)
            .iter()
            .filter(|f| f.user_id == user_id && f.active)
            .cloned()
            .collect())
    }

    fn append_download_record(&self, record: &DownloadRecord) -> StoreResult<()> {
        let mut downloads = self.lock(&self.downloads);
        downloads.push(record.clone());
        self.persist(DOWNLOADS_FILE, &downloads)
    }

    fn set_download_status(
        &self,
        download_id: &str,
        status: DownloadStatus,
        error_message: Option<&str>,
    ) -> StoreResult<()> {
        let mut downloads = self.lock(&self.downloads);
        let mut changed = false;
        for record in downloads.iter_mut().filter(|r| r.download_id == download_id) {
            record.status = status;
            record.completed_at = Some(chrono::Utc::now());
            record.error_message = error_message.map(str::to_string);
            changed = true;
        }
        if changed {
            self.persist(DOWNLOADS_FILE, &downloads)?;
        }
        Ok(())
    }
}
