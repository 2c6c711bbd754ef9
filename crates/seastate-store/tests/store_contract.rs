// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Behaviour every `DocumentStore` adapter must share.
#![allow(clippy::unwrap_used)]

use seastate_core::filter::FieldValue;
use seastate_store::{DocumentStore, FsStore, MemoryStore, StoreError};
use serde_json::{json, Value};

fn vessel(name: &str, imo: i64) -> Value {
    json!({"name": name, "imo": imo})
}

// ── 1. create / get ────────────────────────────────────────────────

fn create_assigns_id_and_version(store: &dyn DocumentStore) {
    let created = store
        .create("vessels", json!({"id": "client-chosen", "name": "A", "imo": 1}))
        .unwrap();
    assert_eq!(created.version, 1);
    let id = created.body["id"].as_str().unwrap().to_owned();
    assert_ne!(id, "client-chosen");
    assert!(uuid::Uuid::parse_str(&id).is_ok());

    let fetched = store.get("vessels", &id).unwrap();
    assert_eq!(fetched, created);
}

fn missing_documents(store: &dyn DocumentStore) {
    assert!(matches!(
        store.get("vessels", "nope"),
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        store.get("vessels", "../../etc/passwd"),
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        store.delete("vessels", "nope"),
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        store.replace("vessels", "nope", vessel("x", 1), None),
        Err(StoreError::NotFound { .. })
    ));
    assert!(store.list("never_written").unwrap().is_empty());
}

// ── 2. replace and versions ────────────────────────────────────────

fn replace_bumps_version_and_pins_id(store: &dyn DocumentStore) {
    let created = store.create("vessels", vessel("A", 1)).unwrap();
    let id = created.body["id"].as_str().unwrap().to_owned();

    let replaced = store
        .replace("vessels", &id, json!({"id": "other", "name": "B", "imo": 2}), Some(1))
        .unwrap();
    assert_eq!(replaced.version, 2);
    assert_eq!(replaced.body["id"], id.as_str());
    assert_eq!(replaced.body["name"], "B");

    // stale writer loses
    let stale = store.replace("vessels", &id, vessel("C", 3), Some(1));
    assert!(matches!(
        stale,
        Err(StoreError::Conflict {
            expected: 1,
            actual: 2,
            ..
        })
    ));
    assert_eq!(store.get("vessels", &id).unwrap().body["name"], "B");

    // unconditional replace always wins
    let forced = store.replace("vessels", &id, vessel("D", 4), None).unwrap();
    assert_eq!(forced.version, 3);
}

fn non_object_bodies_are_rejected(store: &dyn DocumentStore) {
    assert!(matches!(
        store.create("vessels", json!("just a string")),
        Err(StoreError::InvalidDocument(_))
    ));
}

// ── 3. list / query / delete ───────────────────────────────────────

fn list_query_delete(store: &dyn DocumentStore) {
    let mut ids: Vec<String> = ["A", "B", "C"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let imo = i64::try_from(i).unwrap() + 10;
            let doc = store.create("soil", vessel(name, imo)).unwrap();
            doc.body["id"].as_str().unwrap().to_owned()
        })
        .collect();
    ids.sort();

    let listed: Vec<String> = store
        .list("soil")
        .unwrap()
        .iter()
        .map(|d| d["id"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(listed, ids);

    let hits = store
        .query("soil", &[("name", FieldValue::Text("B"))], None)
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["imo"], 11);

    store.delete("soil", &ids[0]).unwrap();
    assert_eq!(store.list("soil").unwrap().len(), 2);
    assert!(store.get("soil", &ids[0]).is_err());
}

fn run_contract(store: &dyn DocumentStore) {
    create_assigns_id_and_version(store);
    missing_documents(store);
    replace_bumps_version_and_pins_id(store);
    non_object_bodies_are_rejected(store);
    list_query_delete(store);
}

#[test]
fn memory_store_contract() {
    run_contract(&MemoryStore::new());
}

#[test]
fn fs_store_contract() {
    let dir = tempfile::tempdir().unwrap();
    run_contract(&FsStore::open(dir.path()).unwrap());
}

// ── 4. adapter specifics ───────────────────────────────────────────

#[test]
fn fs_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let id = {
        let store = FsStore::open(dir.path()).unwrap();
        let doc = store.create("analyses", json!({"metadata": {}})).unwrap();
        store
            .replace(
                "analyses",
                doc.body["id"].as_str().unwrap(),
                json!({"metadata": {"x": 1}}),
                Some(1),
            )
            .unwrap();
        doc.body["id"].as_str().unwrap().to_owned()
    };
    let reopened = FsStore::open(dir.path()).unwrap();
    let doc = reopened.get("analyses", &id).unwrap();
    assert_eq!(doc.version, 2);
    assert_eq!(doc.body["metadata"]["x"], 1);
    assert!(dir.path().join("analyses").join(format!("{id}.json")).exists());
}

#[test]
fn fs_store_rejects_unsafe_collection_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::open(dir.path()).unwrap();
    assert!(matches!(
        store.create("../escape", json!({})),
        Err(StoreError::InvalidKey(_))
    ));
}
