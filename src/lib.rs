//! Coursebot - Tier-gated Telegram bot for course file distribution
//!
//! This library provides all the core functionality for the bot, including
//! tiered access control, dual-backend persistence, and the simulated
//! Mega.nz transfer pipeline.
//!
//! # Module Structure
//!
//! - `core`: Configuration, access tiers, errors, and logging
//! - `storage`: Record models and the interchangeable storage backends
//! - `telegram`: Telegram bot integration and handlers

pub mod core;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, init_logger, AccessTier, AppError, PremiumRegistry, Settings};
pub use storage::{open_store, Store, StoreError};
pub use telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
