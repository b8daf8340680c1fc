//! Backend-matrix tests for the storage contract
//!
//! Every behavior here runs against both backends through `&dyn Store`, so a
//! semantic drift between SQLite and the flat-file backend fails the suite.

use coursebot::storage::models::{Channel, DownloadRecord, DownloadStatus, NewUser, PremiumGrant, UserFile};
use coursebot::storage::{JsonFileStore, SqliteStore, Store};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn with_each_backend(check: impl Fn(&dyn Store)) {
    let sqlite_dir = TempDir::new().unwrap();
    let db_path = sqlite_dir.path().join("coursebot.db");
    let sqlite = SqliteStore::open(db_path.to_str().unwrap()).unwrap();
    check(&sqlite);

    let json_dir = TempDir::new().unwrap();
    let json = JsonFileStore::open(json_dir.path().to_str().unwrap()).unwrap();
    check(&json);
}

fn new_user(user_id: i64, first_name: &str, username: Option<&str>) -> NewUser {
    NewUser {
        user_id,
        first_name: first_name.to_string(),
        username: username.map(str::to_string),
    }
}

#[test]
fn upsert_user_is_idempotent_on_id() {
    with_each_backend(|store| {
        store.upsert_user(&new_user(333, "Alice", None)).unwrap();
        store.upsert_user(&new_user(333, "Alicia", Some("alicia"))).unwrap();
        store.upsert_user(&new_user(444, "Bob", Some("bob"))).unwrap();

        assert_eq!(store.count_users().unwrap(), 2);
        let alice = store.get_user(333).unwrap().unwrap();
        assert_eq!(alice.first_name, "Alicia");
        assert_eq!(alice.username.as_deref(), Some("alicia"));
        assert_eq!(alice.download_count, 0);
        assert!(store.get_user(999).unwrap().is_none());
    });
}

#[test]
fn list_users_returns_every_record() {
    with_each_backend(|store| {
        for id in [10, 20, 30] {
            store.upsert_user(&new_user(id, "User", None)).unwrap();
        }
        let mut ids: Vec<i64> = store.list_users().unwrap().iter().map(|u| u.user_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![10, 20, 30]);
    });
}

#[test]
fn premium_grant_replace_and_soft_delete() {
    with_each_backend(|store| {
        store.upsert_premium_grant(&PremiumGrant::new(333, 111)).unwrap();
        // Re-adding replaces the grant, last writer wins
        store.upsert_premium_grant(&PremiumGrant::new(333, 222)).unwrap();

        let active = store.list_active_premium_grants().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].added_by, 222);

        store.deactivate_premium_grant(333).unwrap();
        assert!(store.list_active_premium_grants().unwrap().is_empty());

        // Soft delete keeps the record retrievable
        let grant = store.get_premium_grant(333).unwrap().unwrap();
        assert!(!grant.active);

        // Deactivating a missing grant is a no-op
        store.deactivate_premium_grant(999).unwrap();
    });
}

#[test]
fn channel_registry_round_trip() {
    with_each_backend(|store| {
        let channel = Channel {
            channel_id: "-1001234567890".to_string(),
            name: "My Course Channel".to_string(),
            added_by: 111,
            added_date: chrono::Utc::now(),
        };
        store.upsert_channel(&channel).unwrap();
        assert_eq!(store.list_channels().unwrap().len(), 1);

        assert!(store.delete_channel("-1001234567890").unwrap());
        assert!(!store.delete_channel("-1001234567890").unwrap());
        assert!(store.list_channels().unwrap().is_empty());
    });
}

#[test]
fn user_files_are_append_only_and_filtered() {
    with_each_backend(|store| {
        let file = UserFile {
            user_id: 333,
            file_name: "course-file.pdf".to_string(),
            file_size: "150MB".to_string(),
            download_id: "AAAA1111".to_string(),
            downloaded_at: chrono::Utc::now(),
            active: true,
        };
        store.append_user_file(&file).unwrap();
        // Same name again: no dedup, the ledger grows
        store.append_user_file(&file).unwrap();
        store
            .append_user_file(&UserFile {
                active: false,
                download_id: "BBBB2222".to_string(),
                ..file.clone()
            })
            .unwrap();

        assert_eq!(store.list_active_user_files(333).unwrap().len(), 2);
        assert!(store.list_active_user_files(444).unwrap().is_empty());
    });
}

#[test]
fn download_record_status_transitions() {
    with_each_backend(|store| {
        let record = DownloadRecord {
            download_id: "CCCC3333".to_string(),
            user_id: 333,
            mega_link: "https://mega.nz/file/abc#key".to_string(),
            status: DownloadStatus::Started,
            started_at: chrono::Utc::now(),
            completed_at: None,
            error_message: None,
            file_name: "course-file.pdf".to_string(),
            file_size: "150MB".to_string(),
        };
        store.append_download_record(&record).unwrap();
        store.set_download_status("CCCC3333", DownloadStatus::Completed, None).unwrap();

        // Updating an unknown id is a no-op
        store
            .set_download_status("ZZZZ9999", DownloadStatus::Failed, Some("nope"))
            .unwrap();
    });
}

#[test]
fn json_backend_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().to_str().unwrap();
    {
        let store = JsonFileStore::open(path).unwrap();
        store.upsert_user(&new_user(333, "Alice", Some("alice"))).unwrap();
        store.upsert_premium_grant(&PremiumGrant::new(333, 111)).unwrap();
        store
            .upsert_channel(&Channel {
                channel_id: "-100555".to_string(),
                name: "Archive".to_string(),
                added_by: 111,
                added_date: chrono::Utc::now(),
            })
            .unwrap();
    }

    let reopened = JsonFileStore::open(path).unwrap();
    assert_eq!(reopened.count_users().unwrap(), 1);
    assert_eq!(reopened.list_active_premium_grants().unwrap().len(), 1);
    assert_eq!(reopened.list_channels().unwrap()[0].name, "Archive");
}

#[test]
fn sqlite_backend_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("coursebot.db");
    let path = db_path.to_str().unwrap();
    {
        let store = SqliteStore::open(path).unwrap();
        store.upsert_user(&new_user(333, "Alice", None)).unwrap();
        store.upsert_premium_grant(&PremiumGrant::new(333, 111)).unwrap();
    }

    let reopened = SqliteStore::open(path).unwrap();
    assert_eq!(reopened.count_users().unwrap(), 1);
    assert_eq!(reopened.list_active_premium_grants().unwrap().len(), 1);
}
