use thiserror::Error;

/// Startup-fatal application errors.
///
/// Runtime failures travel as `StoreError` (storage layer) or the boxed
/// handler error (dispatcher); this enum covers what can only be wrong
/// before the bot starts.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid required configuration (token, owner id)
    #[error("Configuration error: {0}")]
    Config(String),
}
