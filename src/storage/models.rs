//! Record types persisted by the storage backends.
//!
//! All five record kinds serialize with serde so the flat-file backend can
//! store each collection as one JSON file. Timestamps are `chrono` UTC
//! instants (RFC 3339 on disk).

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Profile data extracted from an inbound message, used for user upserts.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

/// A known bot user. Created on first interaction; `last_activity` and the
/// name fields are refreshed on every message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: i64,
    pub first_name: String,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Reserved for future metering; never incremented by current logic.
    pub download_count: i64,
}

/// A persisted record of premium access having been extended to a user.
///
/// One logical grant per user: re-adding replaces the record. Removal sets
/// `active = false` instead of deleting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumGrant {
    pub user_id: i64,
    pub added_by: i64,
    pub added_date: DateTime<Utc>,
    pub active: bool,
    /// Reserved for future metering; never incremented by current logic.
    pub downloads_count: i64,
}

impl PremiumGrant {
    /// A fresh active grant for `user_id`, issued by `added_by`.
    pub fn new(user_id: i64, added_by: i64) -> Self {
        PremiumGrant {
            user_id,
            added_by,
            added_date: Utc::now(),
            active: true,
            downloads_count: 0,
        }
    }
}

/// An upload channel registered by the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub channel_id: String,
    pub name: String,
    pub added_by: i64,
    pub added_date: DateTime<Utc>,
}

/// A file placed in a user's personal storage. Append-only ledger; listing
/// filters to `active = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFile {
    pub user_id: i64,
    pub file_name: String,
    pub file_size: String,
    pub download_id: String,
    pub downloaded_at: DateTime<Utc>,
    pub active: bool,
}

/// Lifecycle state of a download. Created `Started`, transitioned once to a
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Started,
    Completed,
    Failed,
}

impl DownloadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadStatus::Started => "started",
            DownloadStatus::Completed => "completed",
            DownloadStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "started" => Some(DownloadStatus::Started),
            "completed" => Some(DownloadStatus::Completed),
            "failed" => Some(DownloadStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One download attempt, identified by a generated 8-character id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub download_id: String,
    pub user_id: i64,
    pub mega_link: String,
    pub status: DownloadStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub file_name: String,
    pub file_size: String,
}

/// Characters a download id is drawn from.
const DOWNLOAD_ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a generated download id.
pub const DOWNLOAD_ID_LEN: usize = 8;

/// Generates a download id: 8 characters drawn uniformly from `[A-Z0-9]`.
///
/// There is no collision detection; at 36^8 combinations the birthday-bound
/// risk is accepted for this workload.
pub fn generate_download_id() -> String {
    let mut rng = rand::thread_rng();
    (0..DOWNLOAD_ID_LEN)
        .map(|_| DOWNLOAD_ID_CHARSET[rng.gen_range(0..DOWNLOAD_ID_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_id_length_and_charset() {
        for _ in 0..200 {
            let id = generate_download_id();
            assert_eq!(id.len(), DOWNLOAD_ID_LEN);
            assert!(
                id.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
                "unexpected character in download id {}",
                id
            );
        }
    }

    #[test]
    fn test_download_status_round_trip() {
        for status in [DownloadStatus::Started, DownloadStatus::Completed, DownloadStatus::Failed] {
            assert_eq!(DownloadStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(DownloadStatus::parse("cancelled"), None);
    }

    #[test]
    fn test_new_grant_is_active() {
        let grant = PremiumGrant::new(333, 222);
        assert!(grant.active);
        assert_eq!(grant.added_by, 222);
        assert_eq!(grant.downloads_count, 0);
    }
}
