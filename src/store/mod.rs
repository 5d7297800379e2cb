// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Reactive document store abstraction.
//!
//! Documents are JSON objects grouped in collections addressed by slash
//! separated paths (`users/{uid}/loans`). A document lives at
//! `{collection}/{id}`. Subscribers receive a fresh ordered [`Snapshot`] of a
//! collection after every committed write that touches it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::error::{Error, Result};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type DocId = String;

/// Field written by the store on insert.
pub const CREATED_AT: &str = "createdAt";

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocId,
    pub body: Value,
}

/// An ordered view of one collection at a point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub docs: Vec<Document>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Decodes every document into `T`, injecting the document id as `id`.
    /// Documents that do not decode are logged and skipped.
    pub fn decode<T: DeserializeOwned>(&self) -> Vec<T> {
        self.docs
            .iter()
            .filter_map(|doc| {
                let mut body = doc.body.clone();
                if let Value::Object(map) = &mut body {
                    map.insert("id".to_string(), Value::String(doc.id.clone()));
                }
                match serde_json::from_value(body) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::warn!(id = %doc.id, "skipping undecodable document: {e}");
                        None
                    }
                }
            })
            .collect()
    }
}

/// A single field of a single document, the unit of a batched write.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath {
    pub doc: String,
    pub field: String,
}

impl FieldPath {
    pub fn new(doc: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            doc: doc.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.doc, self.field)
    }
}

pub type Batch = BTreeMap<FieldPath, Value>;

pub trait DocumentStore: Send + Sync {
    /// Current snapshot of `collection` ordered by the `order_by` field, then
    /// a new snapshot after every write to the collection.
    fn subscribe(&self, collection: &str, order_by: &str) -> Result<watch::Receiver<Snapshot>>;

    /// Stores `record` under a fresh id and stamps `createdAt`.
    fn insert(&self, collection: &str, record: Value) -> Result<DocId>;

    /// Merges `fields` into the document; `null` values remove fields.
    fn patch(&self, doc: &str, fields: Map<String, Value>) -> Result<()>;

    /// Removes the document. Deleting a missing document is not an error.
    fn delete(&self, doc: &str) -> Result<()>;

    /// Applies every field update or none of them.
    fn batch_write(&self, updates: &Batch) -> Result<()>;

    fn fetch(&self, collection: &str, order_by: &str) -> Result<Snapshot> {
        let rx = self.subscribe(collection, order_by)?;
        let snapshot = rx.borrow().clone();
        Ok(snapshot)
    }
}

/// Splits `users/u/loans/abc` into (`users/u/loans`, `abc`).
pub fn split_doc_path(doc: &str) -> Result<(&str, &str)> {
    match doc.rsplit_once('/') {
        Some((collection, id)) if !collection.is_empty() && !id.is_empty() => Ok((collection, id)),
        _ => Err(Error::InvalidPath(doc.to_string())),
    }
}

/// Ids sort in insertion order.
pub(crate) fn doc_key(seq: u64) -> DocId {
    format!("k{seq:012x}")
}

pub(crate) fn stamp_created_at(collection: &str, record: &mut Value, seq: u64) -> Result<()> {
    match record {
        Value::Object(map) => {
            map.remove("id");
            map.insert(CREATED_AT.to_string(), Value::from(seq));
            Ok(())
        }
        _ => Err(Error::NotAnObject(collection.to_string())),
    }
}

pub(crate) fn merge_fields(doc: &str, body: &mut Value, fields: Map<String, Value>) -> Result<()> {
    let Value::Object(map) = body else {
        return Err(Error::NotAnObject(doc.to_string()));
    };
    for (field, value) in fields {
        if value.is_null() {
            map.remove(&field);
        } else {
            map.insert(field, value);
        }
    }
    Ok(())
}

/// Groups a batch by document so each document is read and written once.
pub(crate) fn group_batch(updates: &Batch) -> BTreeMap<&str, Map<String, Value>> {
    let mut grouped: BTreeMap<&str, Map<String, Value>> = BTreeMap::new();
    for (path, value) in updates {
        grouped
            .entry(path.doc.as_str())
            .or_default()
            .insert(path.field.clone(), value.clone());
    }
    grouped
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum OrderValue {
    Missing,
    Number(Decimal),
    Text(String),
}

fn order_value(body: &Value, field: &str) -> OrderValue {
    match body.get(field) {
        None | Some(Value::Null) => OrderValue::Missing,
        Some(Value::Number(n)) => n
            .to_string()
            .parse::<Decimal>()
            .map(OrderValue::Number)
            .unwrap_or_else(|_| OrderValue::Text(n.to_string())),
        Some(Value::String(s)) => s
            .parse::<Decimal>()
            .map(OrderValue::Number)
            .unwrap_or_else(|_| OrderValue::Text(s.clone())),
        Some(other) => OrderValue::Text(other.to_string()),
    }
}

/// Missing values first, then numbers (decimal strings included), then text;
/// ties by id.
pub(crate) fn ordered(mut docs: Vec<Document>, order_by: &str) -> Snapshot {
    docs.sort_by(|a, b| {
        order_value(&a.body, order_by)
            .cmp(&order_value(&b.body, order_by))
            .then_with(|| a.id.cmp(&b.id))
    });
    Snapshot { docs }
}

struct Subscriber {
    collection: String,
    order_by: String,
    sender: watch::Sender<Snapshot>,
}

/// Live subscriptions of one store.
#[derive(Default)]
pub(crate) struct Subscribers {
    subs: Vec<Subscriber>,
}

impl Subscribers {
    pub(crate) fn register(
        &mut self,
        collection: &str,
        order_by: &str,
        docs: Vec<Document>,
    ) -> watch::Receiver<Snapshot> {
        self.subs.retain(|s| !s.sender.is_closed());
        let (sender, receiver) = watch::channel(ordered(docs, order_by));
        self.subs.push(Subscriber {
            collection: collection.to_string(),
            order_by: order_by.to_string(),
            sender,
        });
        receiver
    }

    /// Pushes a fresh snapshot to every subscriber of a changed collection.
    pub(crate) fn notify<F>(&mut self, changed: &BTreeSet<String>, mut load: F)
    where
        F: FnMut(&str) -> Result<Vec<Document>>,
    {
        self.subs.retain(|s| !s.sender.is_closed());
        let mut loaded: BTreeMap<&str, Vec<Document>> = BTreeMap::new();
        for sub in &self.subs {
            if !changed.contains(&sub.collection) {
                continue;
            }
            let docs = match loaded.get(sub.collection.as_str()) {
                Some(docs) => docs.clone(),
                None => match load(&sub.collection) {
                    Ok(docs) => {
                        loaded.insert(sub.collection.as_str(), docs.clone());
                        docs
                    }
                    Err(e) => {
                        tracing::error!(collection = %sub.collection, "could not reload collection: {e}");
                        continue;
                    }
                },
            };
            sub.sender.send_replace(ordered(docs, &sub.order_by));
        }
    }
}
