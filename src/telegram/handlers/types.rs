//! Handler types and shared dependencies

use std::sync::Arc;

use teloxide::types::Message;

use crate::core::access::PremiumRegistry;
use crate::core::config::Settings;
use crate::storage::Store;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub store: Arc<dyn Store>,
    pub registry: Arc<PremiumRegistry>,
    pub settings: Arc<Settings>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(store: Arc<dyn Store>, registry: Arc<PremiumRegistry>, settings: Arc<Settings>) -> Self {
        Self {
            store,
            registry,
            settings,
        }
    }
}

/// Extracts the sender's user id from a message, 0 when absent.
///
/// A zero id never matches the owner, an admin, or a premium member, so
/// senderless updates fall through to the public tier.
pub fn sender_id(msg: &Message) -> i64 {
    msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok()).unwrap_or(0)
}
