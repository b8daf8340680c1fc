//! Access tiers and the in-memory premium registry
//!
//! Tier precedence is strict: owner > admin > premium > public. The owner id
//! always resolves to `Owner` even when it also appears in the admin set or
//! the premium registry.
//!
//! The `PremiumRegistry` is the authoritative read path for "is this user
//! premium" while the process runs; persisted grants are the durable log.
//! It is seeded from owner + admin ids at startup and reloaded from the
//! active grants in storage so dynamically added users survive a restart.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::core::config::Settings;
use crate::storage::{Store, StoreResult};

/// A user's access tier, in strict precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTier {
    Owner,
    Admin,
    Premium,
    Public,
}

impl AccessTier {
    /// Human-readable label used in premium list output.
    pub fn label(&self) -> &'static str {
        match self {
            AccessTier::Owner => "👑 Owner",
            AccessTier::Admin => "⚡ Admin",
            AccessTier::Premium => "💎 User",
            AccessTier::Public => "🔒 Public",
        }
    }

    /// True for tiers allowed to manage premium users and view stats.
    pub fn can_manage(&self) -> bool {
        matches!(self, AccessTier::Owner | AccessTier::Admin)
    }

    /// True for tiers allowed to download (premium and above).
    pub fn can_download(&self) -> bool {
        !matches!(self, AccessTier::Public)
    }
}

/// Resolves a user's tier with strict owner > admin > premium > public precedence.
pub fn resolve_tier(settings: &Settings, registry: &PremiumRegistry, user_id: i64) -> AccessTier {
    if settings.is_owner(user_id) {
        AccessTier::Owner
    } else if settings.is_admin(user_id) {
        AccessTier::Admin
    } else if registry.contains(user_id) {
        AccessTier::Premium
    } else {
        AccessTier::Public
    }
}

/// In-memory premium membership set, shared across handler invocations.
///
/// All mutation goes through this registry; the mutex is never held across
/// an `.await`.
pub struct PremiumRegistry {
    members: Mutex<HashSet<i64>>,
}

impl PremiumRegistry {
    /// Creates a registry seeded with the owner and all admin ids.
    pub fn seeded(settings: &Settings) -> Self {
        let mut members = HashSet::new();
        members.insert(settings.owner_id);
        members.extend(settings.admin_ids.iter().copied());
        PremiumRegistry {
            members: Mutex::new(members),
        }
    }

    /// Loads every active persisted grant into the registry.
    ///
    /// Called once at startup so premium users added before a restart keep
    /// their access. Returns the number of grants loaded.
    pub fn reload_from(&self, store: &dyn Store) -> StoreResult<usize> {
        let grants = store.list_active_premium_grants()?;
        let mut members = self.lock();
        let mut loaded = 0;
        for grant in grants {
            if members.insert(grant.user_id) {
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    /// Returns true if `user_id` is currently premium.
    pub fn contains(&self, user_id: i64) -> bool {
        self.lock().contains(&user_id)
    }

    /// Adds `user_id`; returns false if it was already present.
    pub fn insert(&self, user_id: i64) -> bool {
        self.lock().insert(user_id)
    }

    /// Removes `user_id`; returns false if it was not present.
    pub fn remove(&self, user_id: i64) -> bool {
        self.lock().remove(&user_id)
    }

    /// Sorted snapshot of all member ids (owner and admins included).
    pub fn snapshot(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.lock().iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of premium members excluding the owner and admins.
    pub fn granted_count(&self, settings: &Settings) -> usize {
        self.lock().iter().filter(|id| !settings.is_admin(**id)).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<i64>> {
        // A poisoned set is still internally consistent; recover it.
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
