//! Core utilities, configuration, and common functionality

pub mod access;
pub mod config;
pub mod error;
pub mod logging;

// Re-exports for convenience
pub use access::{resolve_tier, AccessTier, PremiumRegistry};
pub use config::Settings;
pub use error::AppError;
pub use logging::init_logger;
