//! End-to-end flow tests at the handler-logic layer
//!
//! These walk the user journeys (public contact, premium grant, simulated
//! download, file listing, revocation) against a real backend, using the
//! same pure functions the Telegram handlers call.

use coursebot::core::{resolve_tier, AccessTier, PremiumRegistry, Settings};
use coursebot::storage::models::NewUser;
use coursebot::storage::{JsonFileStore, Store};
use coursebot::telegram::admin::{
    apply_premium_add, apply_premium_remove, parse_premium_command, PremiumAction, PremiumAddOutcome,
    PremiumRemoveOutcome,
};
use coursebot::telegram::menus;
use coursebot::telegram::transfer::record_simulated_download;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const OWNER: i64 = 111;
const ADMIN: i64 = 222;
const VISITOR: i64 = 333;

fn settings() -> Settings {
    Settings {
        bot_token: "test-token".to_string(),
        owner_id: OWNER,
        owner_username: "course_owner".to_string(),
        bot_username: "course_bot".to_string(),
        admin_ids: vec![OWNER, ADMIN],
        database_path: None,
        data_dir: "data".to_string(),
        mega_email: String::new(),
        mega_password: String::new(),
    }
}

fn record_visit(store: &dyn Store, user_id: i64, name: &str, username: Option<&str>) {
    store
        .upsert_user(&NewUser {
            user_id,
            first_name: name.to_string(),
            username: username.map(str::to_string),
        })
        .unwrap();
}

#[test]
fn public_visitor_is_gated_then_granted_then_downloads() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::open(dir.path().to_str().unwrap()).unwrap();
    let settings = settings();
    let registry = PremiumRegistry::seeded(&settings);

    // A stranger opens the bot: public tier, welcome quotes their id
    record_visit(&store, VISITOR, "Alice", Some("alice"));
    let tier = resolve_tier(&settings, &registry, VISITOR);
    assert_eq!(tier, AccessTier::Public);
    assert!(!tier.can_download());

    let welcome = menus::welcome_for_tier(tier, &settings.owner_username, VISITOR);
    assert!(welcome.contains("`333`"));
    assert!(welcome.contains("@course_owner"));

    // The admin grants premium
    let action = parse_premium_command("/premium add 333");
    assert_eq!(action, PremiumAction::Add(VISITOR));
    let outcome = apply_premium_add(&store, &registry, VISITOR, ADMIN).unwrap();
    assert_eq!(outcome, PremiumAddOutcome::Granted);
    assert_eq!(resolve_tier(&settings, &registry, VISITOR), AccessTier::Premium);

    // Now a Mega link goes through the simulated pipeline
    let transfer = record_simulated_download(&store, VISITOR, "https://mega.nz/file/abc#key").unwrap();
    assert_eq!(transfer.file_name, "course-file.pdf");
    assert_eq!(transfer.file_size, "150MB");

    // /myfiles shows the one stored file
    let files = store.list_active_user_files(VISITOR).unwrap();
    assert_eq!(files.len(), 1);
    let listing = menus::myfiles_text(&files);
    assert!(listing.contains("**Total Files:** 1"));
    assert!(listing.contains("course-file.pdf"));
}

#[test]
fn grant_survives_restart_via_registry_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().to_str().unwrap();
    let settings = settings();

    {
        let store = JsonFileStore::open(path).unwrap();
        let registry = PremiumRegistry::seeded(&settings);
        apply_premium_add(&store, &registry, VISITOR, OWNER).unwrap();
    }

    // Fresh process: new registry, reopened store
    let store = JsonFileStore::open(path).unwrap();
    let registry = PremiumRegistry::seeded(&settings);
    assert_eq!(resolve_tier(&settings, &registry, VISITOR), AccessTier::Public);

    let loaded = registry.reload_from(&store).unwrap();
    assert_eq!(loaded, 1);
    assert_eq!(resolve_tier(&settings, &registry, VISITOR), AccessTier::Premium);
}

#[test]
fn revocation_demotes_but_keeps_audit_trail() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::open(dir.path().to_str().unwrap()).unwrap();
    let settings = settings();
    let registry = PremiumRegistry::seeded(&settings);

    apply_premium_add(&store, &registry, VISITOR, ADMIN).unwrap();
    let outcome = apply_premium_remove(&store, &registry, &settings, VISITOR).unwrap();
    assert_eq!(outcome, PremiumRemoveOutcome::Removed);
    assert_eq!(resolve_tier(&settings, &registry, VISITOR), AccessTier::Public);

    // The deactivated grant still records who issued it
    let grant = store.get_premium_grant(VISITOR).unwrap().unwrap();
    assert!(!grant.active);
    assert_eq!(grant.added_by, ADMIN);

    // A reload after revocation must not resurrect access
    let fresh = PremiumRegistry::seeded(&settings);
    fresh.reload_from(&store).unwrap();
    assert_eq!(resolve_tier(&settings, &fresh, VISITOR), AccessTier::Public);
}

#[test]
fn owner_and_admin_tiers_are_immune_to_removal() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::open(dir.path().to_str().unwrap()).unwrap();
    let settings = settings();
    let registry = PremiumRegistry::seeded(&settings);

    for id in [OWNER, ADMIN] {
        assert_eq!(
            apply_premium_remove(&store, &registry, &settings, id).unwrap(),
            PremiumRemoveOutcome::Protected
        );
    }
    assert_eq!(resolve_tier(&settings, &registry, OWNER), AccessTier::Owner);
    assert_eq!(resolve_tier(&settings, &registry, ADMIN), AccessTier::Admin);
}

#[test]
fn stats_reflect_store_and_registry() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::open(dir.path().to_str().unwrap()).unwrap();
    let settings = settings();
    let registry = PremiumRegistry::seeded(&settings);

    record_visit(&store, OWNER, "Owner", Some("course_owner"));
    record_visit(&store, VISITOR, "Alice", Some("alice"));
    apply_premium_add(&store, &registry, VISITOR, OWNER).unwrap();

    let text = menus::stats_text(
        store.count_users().unwrap(),
        registry.granted_count(&settings),
        settings.admin_count(),
        &settings.owner_username,
        &settings.bot_username,
    );
    assert!(text.contains("**Total Users:** 2"));
    assert!(text.contains("**Premium Users:** 1"));
    assert!(text.contains("**Admins:** 1"));
    assert!(text.contains("@course_bot"));
}

#[test]
fn non_admin_cannot_reach_stats_and_store_is_untouched() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::open(dir.path().to_str().unwrap()).unwrap();
    let settings = settings();
    let registry = PremiumRegistry::seeded(&settings);

    record_visit(&store, VISITOR, "Alice", None);
    let before = store.count_users().unwrap();

    // The stats handler gates on can_manage before reading anything
    let tier = resolve_tier(&settings, &registry, VISITOR);
    assert!(!tier.can_manage());

    assert_eq!(store.count_users().unwrap(), before);
    assert!(store.get_premium_grant(VISITOR).unwrap().is_none());
}

#[test]
fn non_numeric_premium_arguments_are_rejected() {
    assert_eq!(parse_premium_command("/premium add alice"), PremiumAction::AddInvalid);
    assert_eq!(parse_premium_command("/premium remove alice"), PremiumAction::RemoveInvalid);
    assert_eq!(parse_premium_command("/premium check alice"), PremiumAction::CheckInvalid);
}
