//! Telegram bot integration and handlers

pub mod admin;
pub mod bot;
pub mod commands;
pub mod handlers;
pub mod menus;
pub mod notifications;
pub mod transfer;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use commands::{handle_message, handle_myfiles_command, handle_start_command};
pub use handlers::{schema, HandlerDeps, HandlerError};
