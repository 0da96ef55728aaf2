//! Integration tests for the state store's persistence and broadcast
//! guarantees, run against both built-in backends.

use std::sync::{Arc, Mutex};

use serde_json::json;
use talentsphere_state::path::get_path;
use talentsphere_state::{
    APP_STATE_KEY, AppState, BlobStore, FileBlobStore, MemoryBlobStore, Role, StateError,
    StateStore,
};

/// Every leaf path in the default tree paired with a replacement value of
/// the same type.
fn leaf_updates() -> Vec<(&'static str, serde_json::Value)> {
    vec![
        ("user.id", json!("user_042")),
        ("user.name", json!("Jamie Rivera")),
        ("user.role", json!("customer")),
        ("user.status", json!("Member")),
        ("user.avatar", json!("neon-glow-pink")),
        ("user.stats.rating", json!(4.2)),
        ("user.stats.completedProjects", json!(46)),
        ("user.stats.trustQuotient", json!(77)),
        ("wallet.balance", json!(500)),
        ("wallet.currency", json!("€")),
        ("wallet.transactions.0.amount", json!(3600)),
        ("wallet.transactions.2.type", json!("incoming")),
        ("notifications.0.read", json!(true)),
        ("messages.unreadCount", json!(0)),
        ("messages.chats.1.online", json!(true)),
        ("activeProjects.0.progress", json!(100)),
    ]
}

#[test]
fn update_then_fresh_load_roundtrips_every_leaf() {
    let dir = tempfile::tempdir().expect("failed to create tmpdir");

    for (path, value) in leaf_updates() {
        let store = StateStore::open(FileBlobStore::new(dir.path())).expect("open");
        store.update(path, value.clone()).expect("update should succeed");
        drop(store);

        let reopened = StateStore::open(FileBlobStore::new(dir.path())).expect("reopen");
        let tree = serde_json::to_value(reopened.state()).expect("serialize");
        let stored = get_path(&tree, path).expect("path should resolve");

        // Integral inputs into float slots come back as the same number.
        match (stored.as_f64(), value.as_f64()) {
            (Some(got), Some(want)) => assert_eq!(got, want, "path {path}"),
            _ => assert_eq!(stored, &value, "path {path}"),
        }
    }
}

#[test]
fn wallet_balance_integral_value_is_exact() {
    let backend = MemoryBlobStore::new();
    let store = StateStore::open(backend.clone()).expect("open");
    store.update("wallet.balance", 500).expect("update");

    let reopened = StateStore::open(backend).expect("reopen");
    assert_eq!(reopened.state().wallet.balance, 500.0);
    assert_eq!(reopened.get("wallet.balance"), Some(json!(500.0)));
}

#[test]
fn role_update_leaves_siblings_untouched() {
    let store = StateStore::open(MemoryBlobStore::new()).expect("open");
    store.update("user.role", "customer").expect("update");

    let state = store.state();
    let defaults = AppState::initial();
    assert_eq!(state.user.role, Role::Customer);
    assert_eq!(state.user.stats, defaults.user.stats);
    assert_eq!(state.wallet, defaults.wallet);
    assert_eq!(state.messages, defaults.messages);
    assert_eq!(state.notifications, defaults.notifications);
    assert_eq!(state.active_projects, defaults.active_projects);
}

#[test]
fn reset_restores_defaults_after_mutations() {
    let store = StateStore::open(MemoryBlobStore::new()).expect("open");
    let before = store.state();

    store.update("user.name", "Someone Else").expect("update");
    store
        .update("wallet.transactions", json!([]))
        .expect("clear transactions");
    store.reset().expect("reset");

    let after = store.state();
    assert_eq!(after, AppState::initial());
    assert_eq!(after, before);

    // Mutating a returned copy never leaks back into the store or defaults.
    let mut copy = store.state();
    copy.wallet.transactions.clear();
    store.reset().expect("second reset");
    assert_eq!(store.state().wallet.transactions.len(), 3);
}

#[test]
fn observers_run_once_per_mutation_in_registration_order() {
    let store = StateStore::open(MemoryBlobStore::new()).expect("open");
    let log = Arc::new(Mutex::new(Vec::new()));

    for tag in ["header", "sidebar", "dashboard"] {
        let log = Arc::clone(&log);
        store.subscribe(move |state: &AppState| {
            log.lock()
                .unwrap()
                .push(format!("{tag}:{}", state.user.role.as_str()));
        });
    }

    store.update("user.role", "customer").expect("update");
    store.reset().expect("reset");

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "header:customer",
            "sidebar:customer",
            "dashboard:customer",
            "header:performer",
            "sidebar:performer",
            "dashboard:performer",
        ]
    );
}

#[test]
fn corrupted_blob_yields_defaults() {
    let dir = tempfile::tempdir().expect("failed to create tmpdir");
    let backend = FileBlobStore::new(dir.path());
    std::fs::write(backend.blob_path(APP_STATE_KEY), b"{\"user\": ").expect("write corrupt");

    let store = StateStore::open(backend.clone()).expect("corrupt state must not fail open");
    assert_eq!(store.state(), AppState::initial());

    // The next mutation overwrites the corrupt blob with a valid one.
    store.set_user_name("Fixed").expect("set name");
    let reopened = StateStore::open(backend).expect("reopen");
    assert_eq!(reopened.state().user.name, "Fixed");
}

#[test]
fn legacy_unversioned_blob_is_loaded() {
    let backend = MemoryBlobStore::new();
    let mut legacy = serde_json::to_value(AppState::initial()).expect("serialize");
    legacy["user"]["role"] = json!("customer");
    backend.insert(APP_STATE_KEY, legacy.to_string());

    let store = StateStore::open(backend).expect("open");
    assert_eq!(store.state().user.role, Role::Customer);
}

#[test]
fn invalid_path_is_surfaced() {
    let store = StateStore::open(MemoryBlobStore::new()).expect("open");

    for path in ["", "profile.name", "user.name.first", "user.nickname", "notifications.9.read"] {
        let err = store
            .update(path, "x")
            .expect_err("unresolvable path must fail");
        assert!(
            matches!(err, StateError::InvalidPath { .. }),
            "path {path:?} gave {err}"
        );
    }
    assert_eq!(store.state(), AppState::initial());
}

/// A backend whose writes always fail, like storage disabled by the browser.
struct ReadOnlyBackend;

impl BlobStore for ReadOnlyBackend {
    fn load(&self, _key: &str) -> std::io::Result<Option<String>> {
        Ok(None)
    }

    fn save(&self, _key: &str, _blob: &str) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "storage disabled",
        ))
    }
}

#[test]
fn storage_error_is_surfaced_and_state_rolled_back() {
    let store = StateStore::open(ReadOnlyBackend).expect("open");
    let err = store.reset().expect_err("save must fail");
    assert!(err.to_string().contains("storage disabled"), "got: {err}");

    let err = store
        .set_user_role(Role::Customer)
        .expect_err("save must fail");
    assert!(matches!(err, StateError::Storage(_)));
    assert_eq!(store.state().user.role, Role::Performer);
}

#[test]
fn store_is_shareable_across_threads() {
    let store = StateStore::open(MemoryBlobStore::new()).expect("open");

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = store.clone();
            std::thread::spawn(move || {
                store
                    .push_notification(format!("n{i}"), "text", "now")
                    .expect("push");
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(store.state().notifications.len(), 6);
}
