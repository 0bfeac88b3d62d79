//! End-to-end store behavior: nesting, visibility, durability.

use nestkv_core::{Config, Store, StoreError, Value};
use tempfile::tempdir;

#[test]
fn nested_visibility() {
    let mut store = Store::in_memory().unwrap();

    store.begin();
    store.set("a", 50).unwrap();
    store.begin();
    store.set("a", 60).unwrap();
    assert_eq!(store.get("a").unwrap(), Value::Int(60));

    store.rollback().unwrap();
    assert_eq!(store.get("a").unwrap(), Value::Int(50));

    store.commit().unwrap();
    assert_eq!(store.committed_data().unwrap()["a"], Value::Int(50));
}

#[test]
fn inner_commit_propagates() {
    let mut store = Store::in_memory().unwrap();

    store.begin();
    store.set("a", 50).unwrap();
    store.begin();
    store.set("a", 60).unwrap();
    store.commit().unwrap();

    assert_eq!(store.get("a").unwrap(), Value::Int(60));

    store.commit().unwrap();
    assert_eq!(store.committed_data().unwrap()["a"], Value::Int(60));
}

#[test]
fn delete_then_undo_never_committed_key() {
    let mut store = Store::in_memory().unwrap();

    store.begin();
    store.set("k", "v").unwrap();
    store.begin();
    store.delete("k").unwrap();
    assert!(matches!(store.get("k"), Err(StoreError::NotFound { .. })));

    store.rollback().unwrap();
    assert_eq!(store.get("k").unwrap(), Value::from("v"));
    store.rollback().unwrap();
}

#[test]
fn delete_then_undo_committed_key() {
    let mut store = Store::in_memory().unwrap();

    store.begin();
    store.set("k", 7).unwrap();
    store.commit().unwrap();

    store.begin();
    store.delete("k").unwrap();
    assert!(matches!(store.get("k"), Err(StoreError::NotFound { .. })));

    store.rollback().unwrap();

    // The committed value is untouched by the discarded deletion.
    store.begin();
    assert_eq!(store.get("k").unwrap(), Value::Int(7));
}

#[test]
fn preconditions_resume_after_stack_drains() {
    let mut store = Store::in_memory().unwrap();

    store.begin();
    store.set("k", 1).unwrap();
    store.commit().unwrap();

    for result in [
        store.get("k").err(),
        store.set("k", 2).err(),
        store.delete("k").err(),
        store.commit().err(),
        store.rollback().err(),
    ] {
        assert!(matches!(result, Some(StoreError::NoActiveTransaction)));
    }
}

#[test]
fn deep_nesting_with_suffix_rollback() {
    let mut store = Store::in_memory().unwrap();
    let depth = 12;
    let keep = 8;

    for i in 0..depth {
        store.begin();
        store.set(format!("k{i}"), i as i64).unwrap();
    }
    assert_eq!(store.transaction_depth(), depth);
    for i in 0..depth {
        assert_eq!(store.get(&format!("k{i}")).unwrap(), Value::Int(i as i64));
    }

    // Rolling back a contiguous suffix of levels removes exactly
    // those levels' keys.
    for _ in keep..depth {
        store.rollback().unwrap();
    }
    for i in 0..keep {
        assert_eq!(store.get(&format!("k{i}")).unwrap(), Value::Int(i as i64));
    }
    for i in keep..depth {
        assert!(matches!(
            store.get(&format!("k{i}")),
            Err(StoreError::NotFound { .. })
        ));
    }

    for _ in 0..keep {
        store.commit().unwrap();
    }
    let committed = store.committed_data().unwrap();
    assert_eq!(committed.len(), keep);
}

#[test]
fn durable_roundtrip_all_value_shapes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.ndjson");

    let values = vec![
        ("null", Value::Null),
        ("bool", Value::Bool(true)),
        ("int", Value::Int(-9_007_199_254_740_993)),
        ("float", Value::Float(-0.015625)),
        ("text", Value::Text("héllo wörld \u{1F980}".to_string())),
        (
            "list",
            Value::Array(vec![Value::Int(1), Value::Null, Value::from("x")]),
        ),
        (
            "nested",
            Value::object(vec![
                ("zebra".to_string(), Value::Int(1)),
                (
                    "apple".to_string(),
                    Value::object(vec![("inner".to_string(), Value::Array(vec![]))]),
                ),
            ]),
        ),
    ];

    {
        let mut store = Store::open(&path).unwrap();
        store.begin();
        for (key, value) in &values {
            store.set(*key, value.clone()).unwrap();
        }
        store.commit().unwrap();
        store.close().unwrap();
    }

    let mut reopened = Store::open(&path).unwrap();
    reopened.begin();
    for (key, value) in &values {
        assert_eq!(&reopened.get(key).unwrap(), value, "key {key}");
    }
}

#[test]
fn rolled_back_data_never_persisted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.ndjson");

    {
        let mut store = Store::open(&path).unwrap();
        store.begin();
        store.set("keep", 1).unwrap();
        store.commit().unwrap();

        store.begin();
        store.set("discard", 2).unwrap();
        store.rollback().unwrap();
        store.close().unwrap();
    }

    let mut reopened = Store::open(&path).unwrap();
    reopened.begin();
    assert_eq!(reopened.get("keep").unwrap(), Value::Int(1));
    assert!(matches!(
        reopened.get("discard"),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn durable_deletion_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.ndjson");

    {
        let mut store = Store::open(&path).unwrap();
        store.begin();
        store.set("gone", 1).unwrap();
        store.set("kept", 2).unwrap();
        store.commit().unwrap();

        store.begin();
        store.delete("gone").unwrap();
        store.commit().unwrap();
        store.close().unwrap();
    }

    let mut reopened = Store::open(&path).unwrap();
    reopened.begin();
    assert!(matches!(
        reopened.get("gone"),
        Err(StoreError::NotFound { .. })
    ));
    assert_eq!(reopened.get("kept").unwrap(), Value::Int(2));
}

#[test]
fn open_missing_without_create_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.ndjson");

    let result = Store::open_with_config(&path, Config::new().create_if_missing(false));
    assert!(matches!(result, Err(StoreError::Backend(_))));
}

#[test]
fn second_store_on_same_file_is_locked() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.ndjson");

    let mut first = Store::open(&path).unwrap();
    assert!(matches!(
        Store::open(&path),
        Err(StoreError::Backend(
            nestkv_core::StorageError::Locked
        ))
    ));

    first.close().unwrap();
    Store::open(&path).unwrap();
}

#[test]
fn failed_commit_leaves_snapshot_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.ndjson");

    let mut store = Store::open(&path).unwrap();
    store.begin();
    store.set("a", 1).unwrap();
    store.commit().unwrap();

    // NaN cannot be encoded, so the whole top-level commit fails.
    store.begin();
    store.set("a", 2).unwrap();
    store.set("bad", Value::Float(f64::NAN)).unwrap();
    assert!(matches!(store.commit(), Err(StoreError::Backend(_))));

    // The failed payload is gone and the committed state unchanged;
    // the manager does not re-push the transaction.
    assert!(!store.has_active_transaction());
    assert_eq!(store.committed_data().unwrap()["a"], Value::Int(1));

    store.begin();
    assert_eq!(store.get("a").unwrap(), Value::Int(1));
    assert!(matches!(
        store.get("bad"),
        Err(StoreError::NotFound { .. })
    ));
}
