// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use serde_json::{Map, Value};
use tokio::sync::watch;

use super::{
    doc_key, group_batch, merge_fields, split_doc_path, stamp_created_at, Batch, DocId,
    Document, DocumentStore, Snapshot, Subscribers,
};
use crate::error::{Error, Result};

/// Process-local document store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    collections: BTreeMap<String, BTreeMap<DocId, Value>>,
    seq: u64,
    subscribers: Subscribers,
}

impl Inner {
    fn docs(&self, collection: &str) -> Vec<Document> {
        docs_of(&self.collections, collection)
    }

    fn notify(&mut self, changed: BTreeSet<String>) {
        let Inner {
            collections,
            subscribers,
            ..
        } = self;
        subscribers.notify(&changed, |collection| Ok(docs_of(collections, collection)));
    }
}

fn docs_of(collections: &BTreeMap<String, BTreeMap<DocId, Value>>, collection: &str) -> Vec<Document> {
    collections
        .get(collection)
        .map(|docs| {
            docs.iter()
                .map(|(id, body)| Document {
                    id: id.clone(),
                    body: body.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| Error::DatabaseLock)
    }
}

impl DocumentStore for MemoryStore {
    fn subscribe(&self, collection: &str, order_by: &str) -> Result<watch::Receiver<Snapshot>> {
        let mut inner = self.lock()?;
        let docs = inner.docs(collection);
        Ok(inner.subscribers.register(collection, order_by, docs))
    }

    fn insert(&self, collection: &str, mut record: Value) -> Result<DocId> {
        let mut inner = self.lock()?;
        let seq = inner.seq + 1;
        stamp_created_at(collection, &mut record, seq)?;
        inner.seq = seq;
        let id = doc_key(seq);
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), record);
        inner.notify(BTreeSet::from([collection.to_string()]));
        Ok(id)
    }

    fn patch(&self, doc: &str, fields: Map<String, Value>) -> Result<()> {
        let (collection, id) = split_doc_path(doc)?;
        let mut inner = self.lock()?;
        let body = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| Error::NotFound(doc.to_string()))?;
        merge_fields(doc, body, fields)?;
        inner.notify(BTreeSet::from([collection.to_string()]));
        Ok(())
    }

    fn delete(&self, doc: &str) -> Result<()> {
        let (collection, id) = split_doc_path(doc)?;
        let mut inner = self.lock()?;
        let removed = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id));
        if removed.is_some() {
            inner.notify(BTreeSet::from([collection.to_string()]));
        }
        Ok(())
    }

    fn batch_write(&self, updates: &Batch) -> Result<()> {
        let grouped = group_batch(updates);
        let mut inner = self.lock()?;

        // Stage every document first so a missing one aborts the whole batch.
        let mut staged = Vec::with_capacity(grouped.len());
        for (doc, fields) in grouped {
            let (collection, id) = split_doc_path(doc)?;
            let mut body = inner
                .collections
                .get(collection)
                .and_then(|docs| docs.get(id))
                .cloned()
                .ok_or_else(|| Error::NotFound(doc.to_string()))?;
            merge_fields(doc, &mut body, fields)?;
            staged.push((collection.to_string(), id.to_string(), body));
        }

        let mut changed = BTreeSet::new();
        for (collection, id, body) in staged {
            inner
                .collections
                .entry(collection.clone())
                .or_default()
                .insert(id, body);
            changed.insert(collection);
        }
        inner.notify(changed);
        Ok(())
    }
}
