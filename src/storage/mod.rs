//! Persistence layer: record models, the `Store` contract, and its two
//! interchangeable backends (SQLite and flat JSON files).

pub mod jsonfile;
pub mod models;
pub mod sqlite;
pub mod store;

// Re-exports for convenience
pub use jsonfile::JsonFileStore;
pub use models::{
    generate_download_id, Channel, DownloadRecord, DownloadStatus, NewUser, PremiumGrant, UserFile,
    UserRecord,
};
pub use sqlite::SqliteStore;
pub use store::{open_store, Store, StoreError, StoreResult};
