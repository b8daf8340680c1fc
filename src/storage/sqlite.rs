//! SQLite storage backend
//!
//! The structured backend: one connection pool, one schema migration at open,
//! and a table per record collection. Timestamps are stored as RFC 3339 text
//! through rusqlite's `chrono` feature.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

use crate::storage::models::{
    Channel, DownloadRecord, DownloadStatus, NewUser, PremiumGrant, UserFile, UserRecord,
};
use crate::storage::store::{Store, StoreResult};

/// Connection pool wrapper implementing the `Store` contract over SQLite.
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and runs schema migration.
    pub fn open(path: &str) -> StoreResult<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;
        let store = SqliteStore { pool };
        store.migrate_schema()?;
        Ok(store)
    }

    /// In-memory database for tests.
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;
        let store = SqliteStore { pool };
        store.migrate_schema()?;
        Ok(store)
    }

    fn migrate_schema(&self) -> StoreResult<()> {
        let conn = self.pool.get()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                user_id        INTEGER PRIMARY KEY,
                first_name     TEXT NOT NULL,
                username       TEXT,
                created_at     TEXT NOT NULL,
                last_activity  TEXT NOT NULL,
                download_count INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS premium_users (
                user_id         INTEGER PRIMARY KEY,
                added_by        INTEGER NOT NULL,
                added_date      TEXT NOT NULL,
                active          INTEGER NOT NULL DEFAULT 1,
                downloads_count INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS channels (
                channel_id TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                added_by   INTEGER NOT NULL,
                added_date TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS user_files (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id       INTEGER NOT NULL,
                file_name     TEXT NOT NULL,
                file_size     TEXT NOT NULL,
                download_id   TEXT NOT NULL,
                downloaded_at TEXT NOT NULL,
                active        INTEGER NOT NULL DEFAULT 1
            );
            CREATE INDEX IF NOT EXISTS idx_user_files_user_id ON user_files(user_id);
            CREATE TABLE IF NOT EXISTS downloads (
                download_id   TEXT PRIMARY KEY,
                user_id       INTEGER NOT NULL,
                mega_link     TEXT NOT NULL,
                status        TEXT NOT NULL,
                started_at    TEXT NOT NULL,
                completed_at  TEXT,
                error_message TEXT,
                file_name     TEXT NOT NULL,
                file_size     TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl Store for SqliteStore {
    fn upsert_user(&self, user: &NewUser) -> StoreResult<()> {
        let conn = self.pool.get()?;
        let now = chrono::Utc::now();
        conn.execute(
            "INSERT INTO users (user_id, first_name, username, created_at, last_activity, download_count)
             VALUES (?1, ?2, ?3, ?4, ?4, 0)
             ON CONFLICT(user_id) DO UPDATE SET
                 first_name = excluded.first_name,
                 username = excluded.username,
                 last_activity = excluded.last_activity",
            params![user.user_id, user.first_name, user.username, now],
        )?;
        Ok(())
    }

    fn get_user(&self, user_id: i64) -> StoreResult<Option<UserRecord>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                "SELECT user_id, first_name, username, created_at, last_activity, download_count
                 FROM users WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(UserRecord {
                        user_id: row.get(0)?,
                        first_name: row.get(1)?,
                        username: row.get(2)?,
                        created_at: row.get(3)?,
                        last_activity: row.get(4)?,
                        download_count: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    fn count_users(&self) -> StoreResult<u64> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, first_name, username, created_at, last_activity, download_count
             FROM users ORDER BY user_id",
        )?;
        let users = stmt
            .query_map([], |row| {
                Ok(UserRecord {
                    user_id: row.get(0)?,
                    first_name: row.get(1)?,
                    username: row.get(2)?,
                    created_at: row.get(3)?,
                    last_activity: row.get(4)?,
                    download_count: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn upsert_premium_grant(&self, grant: &PremiumGrant) -> StoreResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT OR REPLACE INTO premium_users (user_id, added_by, added_date, active, downloads_count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                grant.user_id,
                grant.added_by,
                grant.added_date,
                grant.active,
                grant.downloads_count
            ],
        )?;
        Ok(())
    }

    fn get_premium_grant(&self, user_id: i64) -> StoreResult<Option<PremiumGrant>> {
        let conn = self.pool.get()?;
        let grant = conn
            .query_row(
                "SELECT user_id, added_by, added_date, active, downloads_count
                 FROM premium_users WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(PremiumGrant {
                        user_id: row.get(0)?,
                        added_by: row.get(1)?,
                        added_date: row.get(2)?,
                        active: row.get(3)?,
                        downloads_count: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(grant)
    }

    fn list_active_premium_grants(&self) -> StoreResult<Vec<PremiumGrant>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, added_by, added_date, active, downloads_count
             FROM premium_users WHERE active = 1 ORDER BY user_id",
        )?;
        let grants = stmt
            .query_map([], |row| {
                Ok(PremiumGrant {
                    user_id: row.get(0)?,
                    added_by: row.get(1)?,
                    added_date: row.get(2)?,
                    active: row.get(3)?,
                    downloads_count: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(grants)
    }

    fn deactivate_premium_grant(&self, user_id: i64) -> StoreResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE premium_users SET active = 0 WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(())
    }

    fn upsert_channel(&self, channel: &Channel) -> StoreResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT OR REPLACE INTO channels (channel_id, name, added_by, added_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![channel.channel_id, channel.name, channel.added_by, channel.added_date],
        )?;
        Ok(())
    }

    fn list_channels(&self) -> StoreResult<Vec<Channel>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT channel_id, name, added_by, added_date FROM channels ORDER BY added_date",
        )?;
        let channels = stmt
            .query_map([], |row| {
                Ok(Channel {
                    channel_id: row.get(0)?,
                    name: row.get(1)?,
                    added_by: row.get(2)?,
                    added_date: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(channels)
    }

    fn delete_channel(&self, channel_id: &str) -> StoreResult<bool> {
        let conn = self.pool.get()?;
        let deleted = conn.execute("DELETE FROM channels WHERE channel_id = ?1", params![channel_id])?;
        Ok(deleted > 0)
    }

    fn append_user_file(&self, file: &UserFile) -> StoreResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO user_files (user_id, file_name, file_size, download_id, downloaded_at, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                file.user_id,
                file.file_name,
                file.file_size,
                file.download_id,
                file.downloaded_at,
                file.active
            ],
        )?;
        Ok(())
    }

    fn list_active_user_files(&self, user_id: i64) -> StoreResult<Vec<UserFile>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, file_name, file_size, download_id, downloaded_at, active
             FROM user_files WHERE user_id = ?1 AND active = 1 ORDER BY downloaded_at",
        )?;
        let files = stmt
            .query_map(params![user_id], |row| {
                Ok(UserFile {
                    user_id: row.get(0)?,
                    file_name: row.get(1)?,
                    file_size: row.get(2)?,
                    download_id: row.get(3)?,
                    downloaded_at: row.get(4)?,
                    active: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(files)
    }

    fn append_download_record(&self, record: &DownloadRecord) -> StoreResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO downloads
             (download_id, user_id, mega_link, status, started_at, completed_at, error_message, file_name, file_size)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.download_id,
                record.user_id,
                record.mega_link,
                record.status.as_str(),
                record.started_at,
                record.completed_at,
                record.error_message,
                record.file_name,
                record.file_size
            ],
        )?;
        Ok(())
    }

    fn set_download_status(
        &self,
        download_id: &str,
        status: DownloadStatus,
        error_message: Option<&str>,
    ) -> StoreResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE downloads
             SET status = ?2, completed_at = ?3, error_message = ?4
             WHERE download_id = ?1",
            params![download_id, status.as_str(), chrono::Utc::now(), error_message],
        )?;
        Ok(())
    }
}
