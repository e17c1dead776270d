mod common;

use common::{sorted, store_for, FaultyBackend, INTERACTION_NOT_ALLOWED};
use keychain_store::backend::{status, FileBackend, MemoryBackend};
use keychain_store::{Accessibility, KeychainStore, StoreConfig, StoreError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Card {
    number: String,
    cardholder: String,
}

#[test]
fn test_account_lifecycle() {
    let store = store_for(MemoryBackend::new(), "alice", None);

    store.set("card", b"4111").expect("set card");
    store.set("pin", b"0000").expect("set pin");
    assert_eq!(sorted(store.all_keys().expect("keys")), vec!["card", "pin"]);

    store.delete("card").expect("delete card");
    assert_eq!(store.all_keys().expect("keys"), vec!["pin"]);
    assert_eq!(store.get("card").expect("get"), None);
    assert_eq!(store.delete("card"), Err(StoreError::ItemNotFound));
}

#[test]
fn test_set_is_upsert() {
    let store = store_for(MemoryBackend::new(), "alice", None);

    store.set("pin", b"0000").expect("insert");
    store.set("pin", b"1111").expect("replace");

    assert_eq!(store.get("pin").expect("get"), Some(b"1111".to_vec()));
    assert_eq!(store.all_keys().expect("keys"), vec!["pin"]);
}

#[test]
fn test_update_never_creates() {
    let store = store_for(MemoryBackend::new(), "alice", None);

    assert_eq!(store.update("pin", b"0000"), Err(StoreError::ItemNotFound));
    assert!(!store.has_key("pin").expect("has_key"));
}

#[test]
fn test_scopes_are_isolated() {
    let backend = MemoryBackend::new();
    let alice = store_for(&backend, "alice", None);
    let bob = store_for(&backend, "bob", None);
    let shared = store_for(&backend, "alice", Some("group.shared"));

    alice.set("pin", b"a").expect("set");
    bob.set("pin", b"b").expect("set");
    shared.set("token", b"s").expect("set");

    assert_eq!(alice.get("pin").expect("get"), Some(b"a".to_vec()));
    assert_eq!(bob.get("pin").expect("get"), Some(b"b".to_vec()));
    assert_eq!(alice.all_keys().expect("keys"), vec!["pin"]);
    assert_eq!(shared.all_keys().expect("keys"), vec!["token"]);
    assert_eq!(shared.get("pin").expect("get"), None);

    let report = alice.delete_all().expect("delete_all");
    assert_eq!(report.deleted, 1);
    assert_eq!(bob.get("pin").expect("get"), Some(b"b".to_vec()));
    assert_eq!(shared.get("token").expect("get"), Some(b"s".to_vec()));
    assert_eq!(backend.len(), 2);
}

#[test]
fn test_same_key_in_two_groups() {
    let backend = MemoryBackend::new();
    let plain = store_for(&backend, "alice", None);
    let grouped = store_for(&backend, "alice", Some("groupA"));

    plain.set("x", b"1").expect("set");
    grouped.set("x", b"2").expect("set");

    assert_eq!(plain.get("x").expect("get"), Some(b"1".to_vec()));
    assert_eq!(grouped.get("x").expect("get"), Some(b"2".to_vec()));

    grouped.delete("x").expect("delete");
    assert_eq!(plain.get("x").expect("get"), Some(b"1".to_vec()));
    assert_eq!(grouped.get("x").expect("get"), None);
}

#[test]
fn test_delete_all_continues_past_failures() {
    let backend = FaultyBackend::new();
    let store = store_for(&backend, "alice", None);
    for key in ["a", "b", "c"] {
        store.set(key, key.as_bytes()).expect("set");
    }
    backend.fail_delete_of("b");

    let report = store.delete_all().expect("delete_all");

    assert_eq!(report.deleted, 2);
    assert!(!report.is_complete());
    assert_eq!(
        report.failed,
        vec![(
            "b".to_string(),
            StoreError::BackendFailure {
                code: INTERACTION_NOT_ALLOWED
            }
        )]
    );
    assert_eq!(store.all_keys().expect("keys"), vec!["b"]);
}

#[test]
fn test_enumeration_failure_propagates() {
    let backend = FaultyBackend::new();
    let store = store_for(&backend, "alice", None);
    store.set("a", b"1").expect("set");
    backend.fail_enumerate();

    let expected = StoreError::BackendFailure {
        code: status::INTERNAL_COMPONENT,
    };
    assert_eq!(store.all_keys(), Err(expected.clone()));
    assert_eq!(store.delete_all().map(|report| report.deleted), Err(expected));
    assert_eq!(backend.inner().len(), 1);
}

#[test]
fn test_read_failure_is_not_absence() {
    let backend = FaultyBackend::new();
    let store = store_for(&backend, "alice", None);
    backend.fail_fetch_with(INTERACTION_NOT_ALLOWED);

    let expected = StoreError::BackendFailure {
        code: INTERACTION_NOT_ALLOWED,
    };
    assert_eq!(store.get("pin"), Err(expected.clone()));
    assert_eq!(store.has_key("pin"), Err(expected.clone()));
    assert_eq!(store.strings().get_string("pin"), Err(expected));
}

#[test]
fn test_duplicate_outside_add_is_backend_failure() {
    let backend = FaultyBackend::new();
    let store = store_for(&backend, "alice", None);
    store.set("pin", b"0000").expect("set");
    backend.duplicate_on_update();

    assert_eq!(
        store.update("pin", b"1111"),
        Err(StoreError::BackendFailure {
            code: status::DUPLICATE_ITEM
        })
    );
    assert_eq!(
        store.set("pin", b"1111"),
        Err(StoreError::BackendFailure {
            code: status::DUPLICATE_ITEM
        })
    );
}

#[test]
fn test_one_backend_call_per_operation() {
    let backend = FaultyBackend::new();
    let store = store_for(&backend, "alice", None);

    store.set("pin", b"0000").expect("set");
    assert_eq!(backend.calls(), 1);
    store.get("pin").expect("get");
    assert_eq!(backend.calls(), 2);
    store.set("pin", b"1111").expect("upsert");
    assert_eq!(backend.calls(), 4);
}

#[test]
fn test_accessibility_is_kept_on_replace() {
    let backend = MemoryBackend::new();
    let store = store_for(&backend, "alice", None);
    let item = store.identity().descriptor("pin");

    store
        .set_with_accessibility("pin", b"0000", Accessibility::AfterFirstUnlockThisDeviceOnly)
        .expect("insert");
    store
        .set_with_accessibility("pin", b"1111", Accessibility::Always)
        .expect("replace");

    assert_eq!(
        backend.accessibility_of(&item),
        Some(Accessibility::AfterFirstUnlockThisDeviceOnly)
    );
    assert_eq!(store.get("pin").expect("get"), Some(b"1111".to_vec()));
}

#[test]
fn test_corrupt_structured_value_is_decode_failure() {
    let store = store_for(MemoryBackend::new(), "alice", None);
    store.set("test", &[0x00, 0x01, 0x02]).expect("set");

    let result = store.values::<Card>().get_value("test");
    assert!(matches!(result, Err(StoreError::DecodeFailure(_))));
    // The raw bytes are still there.
    assert_eq!(store.get("test").expect("get"), Some(vec![0x00, 0x01, 0x02]));
}

#[test]
fn test_structured_and_text_views() {
    let store = store_for(MemoryBackend::new(), "alice", None);
    let cards = store.values::<Card>();
    let card = Card {
        number: "4111111111111111".to_string(),
        cardholder: "Me".to_string(),
    };

    cards.set_value("test", &card).expect("set");
    assert_eq!(cards.get_value("test").expect("get"), Some(card));
    assert_eq!(
        store.strings().get_string("test").expect("get").as_deref(),
        Some(r#"{"number":"4111111111111111","cardholder":"Me"}"#)
    );
}

#[test]
fn test_store_from_config() {
    let config: StoreConfig = serde_json::from_str(
        r#"{ "account": "alice", "access_group": "group.shared", "accessibility": "always-this-device-only" }"#,
    )
    .expect("config");
    let backend = MemoryBackend::new();
    let store = KeychainStore::from_config(&backend, &config).expect("store");

    assert_eq!(store.account(), "alice");
    assert_eq!(store.access_group(), Some("group.shared"));
    store.set("pin", b"0000").expect("set");
    assert_eq!(
        backend.accessibility_of(&store.identity().descriptor("pin")),
        Some(Accessibility::AlwaysThisDeviceOnly)
    );
}

#[test]
fn test_file_backend_persists() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("store.json");

    {
        let store = store_for(FileBackend::new(&path).expect("backend"), "alice", None);
        store.set("card", b"4111").expect("set");
        store.strings().set_string("pin", "0000").expect("set");
        store.delete("card").expect("delete");
    }

    let store = store_for(FileBackend::new(&path).expect("backend"), "alice", None);
    assert_eq!(store.all_keys().expect("keys"), vec!["pin"]);
    assert_eq!(
        store.strings().get_string("pin").expect("get"),
        Some("0000".to_string())
    );
    assert_eq!(store.update("card", b"x"), Err(StoreError::ItemNotFound));
}
