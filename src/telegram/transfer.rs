//! Simulated Mega.nz transfer pipeline
//!
//! No bytes move: the pipeline sleeps through a download and an upload
//! phase, then records a fixed placeholder file. The record-keeping is real
//! and identical to what an actual transfer would write, which is the point
//! of the simulation.

use teloxide::prelude::*;
use teloxide::types::Message;
use tokio::time::sleep;

use crate::core::config::transfer;
use crate::storage::models::{generate_download_id, DownloadRecord, DownloadStatus, UserFile};
use crate::storage::{Store, StoreResult};
use crate::telegram::handlers::{sender_id, HandlerDeps, HandlerError};
use crate::telegram::menus;

/// The records produced by one simulated transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedTransfer {
    pub download_id: String,
    pub file_name: String,
    pub file_size: String,
}

/// Writes the records for one simulated transfer: a download record that
/// transitions `started` to `completed`, and a file in the user's storage.
///
/// If any write after the initial download record fails, the record is
/// marked `failed` with the error message before the error propagates, so
/// the audit trail never shows a transfer stuck in `started`.
pub fn record_simulated_download(
    store: &dyn Store,
    user_id: i64,
    mega_link: &str,
) -> StoreResult<SimulatedTransfer> {
    let download_id = generate_download_id();
    let now = chrono::Utc::now();

    store.append_download_record(&DownloadRecord {
        download_id: download_id.clone(),
        user_id,
        mega_link: mega_link.to_string(),
        status: DownloadStatus::Started,
        started_at: now,
        completed_at: None,
        error_message: None,
        file_name: transfer::SIMULATED_FILE_NAME.to_string(),
        file_size: transfer::SIMULATED_FILE_SIZE.to_string(),
    })?;

    let finish = || -> StoreResult<()> {
        store.append_user_file(&UserFile {
            user_id,
            file_name: transfer::SIMULATED_FILE_NAME.to_string(),
            file_size: transfer::SIMULATED_FILE_SIZE.to_string(),
            download_id: download_id.clone(),
            downloaded_at: now,
            active: true,
        })?;
        store.set_download_status(&download_id, DownloadStatus::Completed, None)?;
        Ok(())
    };

    if let Err(e) = finish() {
        let reason = e.to_string();
        if let Err(mark_err) = store.set_download_status(&download_id, DownloadStatus::Failed, Some(&reason)) {
            log::error!("Failed to mark download {} as failed: {}", download_id, mark_err);
        }
        return Err(e);
    }

    Ok(SimulatedTransfer {
        download_id,
        file_name: transfer::SIMULATED_FILE_NAME.to_string(),
        file_size: transfer::SIMULATED_FILE_SIZE.to_string(),
    })
}

/// Runs the simulated transfer with live status edits in the chat.
pub async fn process_mega_link(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    mega_link: &str,
) -> Result<(), HandlerError> {
    let user_id = sender_id(msg);
    log::info!("⬇️ Simulated Mega transfer requested by user {}", user_id);

    let status = bot
        .send_message(msg.chat.id, "🔍 Processing your Mega link...")
        .await?;

    sleep(transfer::download_delay()).await;
    bot.edit_message_text(
        msg.chat.id,
        status.id,
        "⬇️ Downloading from Mega... (This is simulation)",
    )
    .await?;

    sleep(transfer::upload_delay()).await;
    bot.edit_message_text(msg.chat.id, status.id, "📤 Uploading to channels...")
        .await?;

    match record_simulated_download(deps.store.as_ref(), user_id, mega_link) {
        Ok(result) => {
            let username = deps
                .store
                .get_user(user_id)
                .ok()
                .flatten()
                .and_then(|u| u.username)
                .unwrap_or_else(|| "User".to_string());

            log::info!(
                "✅ Simulated transfer {} completed for user {}",
                result.download_id,
                user_id
            );
            bot.edit_message_text(
                msg.chat.id,
                status.id,
                menus::download_complete(&result.file_name, &result.file_size, &username),
            )
            .await?;
        }
        Err(e) => {
            log::error!("❌ Simulated transfer failed for user {}: {}", user_id, e);
            bot.edit_message_text(msg.chat.id, status.id, format!("❌ Error processing your request: {}", e))
                .await?;
        }
    }

    Ok(())
}
