// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cuentas::Error;
use cuentas::store::{
    Batch, DocumentStore, FieldPath, MemoryStore, SqliteStore, split_doc_path,
};
use serde_json::{Map, Value, json};

const GOALS: &str = "users/u1/savingGoals";

fn stores() -> Vec<(&'static str, Box<dyn DocumentStore>)> {
    let memory: Box<dyn DocumentStore> = Box::new(MemoryStore::new());
    let sqlite: Box<dyn DocumentStore> = Box::new(SqliteStore::open_in_memory().unwrap());
    vec![("memory", memory), ("sqlite", sqlite)]
}

fn fields(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn insert_assigns_id_and_created_at() {
    for (name, store) in stores() {
        let a = store.insert(GOALS, json!({"name": "Trip", "id": "ignored"})).unwrap();
        let b = store.insert(GOALS, json!({"name": "Car"})).unwrap();
        assert_ne!(a, b, "{name}");

        let snap = store.fetch(GOALS, "createdAt").unwrap();
        assert_eq!(snap.len(), 2, "{name}");
        assert_eq!(snap.docs[0].id, a, "{name}");
        assert!(snap.docs[0].body.get("id").is_none(), "{name}");
        let first = snap.docs[0].body["createdAt"].as_u64().unwrap();
        let second = snap.docs[1].body["createdAt"].as_u64().unwrap();
        assert!(first < second, "{name}");
    }
}

#[test]
fn insert_rejects_non_objects() {
    for (name, store) in stores() {
        let err = store.insert(GOALS, json!([1, 2])).unwrap_err();
        assert_eq!(err, Error::NotAnObject(GOALS.to_string()), "{name}");
        assert!(store.fetch(GOALS, "createdAt").unwrap().is_empty(), "{name}");
    }
}

#[test]
fn orders_decimal_strings_numerically() {
    for (name, store) in stores() {
        store.insert(GOALS, json!({"targetAmount": "1000"})).unwrap();
        store.insert(GOALS, json!({"targetAmount": "250.5"})).unwrap();
        store.insert(GOALS, json!({"name": "no target"})).unwrap();
        store.insert(GOALS, json!({"targetAmount": "90"})).unwrap();

        let snap = store.fetch(GOALS, "targetAmount").unwrap();
        let order: Vec<Value> = snap
            .docs
            .iter()
            .map(|d| d.body.get("targetAmount").cloned().unwrap_or(Value::Null))
            .collect();
        assert_eq!(
            order,
            vec![Value::Null, json!("90"), json!("250.5"), json!("1000")],
            "{name}"
        );
    }
}

#[test]
fn patch_merges_and_removes_fields() {
    for (name, store) in stores() {
        let id = store
            .insert(GOALS, json!({"name": "Trip", "targetAmount": "500", "note": "x"}))
            .unwrap();
        let doc = format!("{GOALS}/{id}");
        store
            .patch(&doc, fields(&[("savedAmount", json!("20")), ("note", Value::Null)]))
            .unwrap();

        let body = &store.fetch(GOALS, "createdAt").unwrap().docs[0].body;
        assert_eq!(body["name"], "Trip", "{name}");
        assert_eq!(body["savedAmount"], "20", "{name}");
        assert!(body.get("note").is_none(), "{name}");
    }
}

#[test]
fn patch_missing_document_is_not_found() {
    for (name, store) in stores() {
        let doc = format!("{GOALS}/nope");
        let err = store.patch(&doc, fields(&[("a", json!(1))])).unwrap_err();
        assert_eq!(err, Error::NotFound(doc), "{name}");
    }
}

#[test]
fn delete_is_idempotent() {
    for (name, store) in stores() {
        let id = store.insert(GOALS, json!({"name": "Trip"})).unwrap();
        let doc = format!("{GOALS}/{id}");
        store.delete(&doc).unwrap();
        store.delete(&doc).unwrap();
        assert!(store.fetch(GOALS, "createdAt").unwrap().is_empty(), "{name}");
    }
}

#[test]
fn batch_is_all_or_nothing() {
    for (name, store) in stores() {
        let id = store.insert(GOALS, json!({"savedAmount": "0"})).unwrap();
        let mut batch = Batch::new();
        batch.insert(
            FieldPath::new(format!("{GOALS}/{id}"), "savedAmount"),
            json!("50"),
        );
        batch.insert(
            FieldPath::new(format!("{GOALS}/missing"), "savedAmount"),
            json!("50"),
        );
        assert!(store.batch_write(&batch).is_err(), "{name}");
        let body = &store.fetch(GOALS, "createdAt").unwrap().docs[0].body;
        assert_eq!(body["savedAmount"], "0", "{name}");

        batch.retain(|k, _| !k.doc.ends_with("missing"));
        store.batch_write(&batch).unwrap();
        let body = &store.fetch(GOALS, "createdAt").unwrap().docs[0].body;
        assert_eq!(body["savedAmount"], "50", "{name}");
    }
}

#[test]
fn subscribers_see_each_write() {
    for (name, store) in stores() {
        let mut rx = store.subscribe(GOALS, "createdAt").unwrap();
        assert!(rx.borrow_and_update().is_empty(), "{name}");

        let id = store.insert(GOALS, json!({"name": "Trip"})).unwrap();
        assert!(rx.has_changed().unwrap(), "{name}");
        assert_eq!(rx.borrow_and_update().docs[0].id, id, "{name}");

        store
            .patch(&format!("{GOALS}/{id}"), fields(&[("name", json!("Trip 2"))]))
            .unwrap();
        assert_eq!(rx.borrow_and_update().docs[0].body["name"], "Trip 2", "{name}");

        // Writes to other collections do not notify.
        store.insert("users/u1/loans", json!({"name": "Car"})).unwrap();
        assert!(!rx.has_changed().unwrap(), "{name}");
    }
}

#[test]
fn sqlite_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cuentas.sqlite");
    let id = {
        let store = SqliteStore::open(&path).unwrap();
        store.insert(GOALS, json!({"name": "Trip"})).unwrap()
    };
    let store = SqliteStore::open(&path).unwrap();
    let snap = store.fetch(GOALS, "createdAt").unwrap();
    assert_eq!(snap.docs[0].id, id);
    assert_eq!(snap.docs[0].body["name"], "Trip");

    let next = store.insert(GOALS, json!({"name": "Car"})).unwrap();
    assert!(next > id);
}

#[test]
fn doc_paths_split_on_last_segment() {
    assert_eq!(
        split_doc_path("users/u1/loans/abc").unwrap(),
        ("users/u1/loans", "abc")
    );
    assert!(split_doc_path("loans").is_err());
    assert!(split_doc_path("users/u1/loans/").is_err());
}
