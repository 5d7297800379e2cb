// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use tokio::sync::watch;

use super::{
    doc_key, group_batch, merge_fields, split_doc_path, stamp_created_at, Batch, DocId,
    Document, DocumentStore, Snapshot, Subscribers,
};
use crate::error::{Error, Result};

/// Document store persisted in a single SQLite table. Change notifications
/// reach subscribers within the same process only.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    subscribers: Mutex<Subscribers>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        tracing::debug!("opening document store at {}", path.display());
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            subscribers: Mutex::new(Subscribers::default()),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::DatabaseLock)
    }

    fn notify(&self, conn: &Connection, changed: BTreeSet<String>) -> Result<()> {
        let mut subscribers = self.subscribers.lock().map_err(|_| Error::DatabaseLock)?;
        subscribers.notify(&changed, |collection| load(conn, collection));
        Ok(())
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS documents(
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        body TEXT NOT NULL,
        UNIQUE(collection, id)
    );
    CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
    "#,
    )?;
    Ok(())
}

fn load(conn: &Connection, collection: &str) -> Result<Vec<Document>> {
    let mut stmt =
        conn.prepare_cached("SELECT id, body FROM documents WHERE collection=?1 ORDER BY seq")?;
    let mut rows = stmt.query(params![collection])?;
    let mut docs = Vec::new();
    while let Some(r) = rows.next()? {
        let id: String = r.get(0)?;
        let body: String = r.get(1)?;
        docs.push(Document {
            id,
            body: serde_json::from_str(&body)?,
        });
    }
    Ok(docs)
}

fn load_one(conn: &Connection, collection: &str, id: &str) -> Result<Option<Value>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection=?1 AND id=?2",
            params![collection, id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(match body {
        Some(s) => Some(serde_json::from_str(&s)?),
        None => None,
    })
}

impl DocumentStore for SqliteStore {
    fn subscribe(&self, collection: &str, order_by: &str) -> Result<watch::Receiver<Snapshot>> {
        let conn = self.conn()?;
        let docs = load(&conn, collection)?;
        let mut subscribers = self.subscribers.lock().map_err(|_| Error::DatabaseLock)?;
        Ok(subscribers.register(collection, order_by, docs))
    }

    fn insert(&self, collection: &str, mut record: Value) -> Result<DocId> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO documents(collection, id, body) VALUES (?1, '', '{}')",
            params![collection],
        )?;
        let seq = tx.last_insert_rowid();
        stamp_created_at(collection, &mut record, seq as u64)?;
        let id = doc_key(seq as u64);
        tx.execute(
            "UPDATE documents SET id=?1, body=?2 WHERE seq=?3",
            params![id, serde_json::to_string(&record)?, seq],
        )?;
        tx.commit()?;
        self.notify(&conn, BTreeSet::from([collection.to_string()]))?;
        Ok(id)
    }

    fn patch(&self, doc: &str, fields: Map<String, Value>) -> Result<()> {
        let (collection, id) = split_doc_path(doc)?;
        let conn = self.conn()?;
        let mut body =
            load_one(&conn, collection, id)?.ok_or_else(|| Error::NotFound(doc.to_string()))?;
        merge_fields(doc, &mut body, fields)?;
        conn.execute(
            "UPDATE documents SET body=?1 WHERE collection=?2 AND id=?3",
            params![serde_json::to_string(&body)?, collection, id],
        )?;
        self.notify(&conn, BTreeSet::from([collection.to_string()]))
    }

    fn delete(&self, doc: &str) -> Result<()> {
        let (collection, id) = split_doc_path(doc)?;
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM documents WHERE collection=?1 AND id=?2",
            params![collection, id],
        )?;
        if removed > 0 {
            self.notify(&conn, BTreeSet::from([collection.to_string()]))?;
        }
        Ok(())
    }

    fn batch_write(&self, updates: &Batch) -> Result<()> {
        let grouped = group_batch(updates);
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut changed = BTreeSet::new();
        for (doc, fields) in grouped {
            let (collection, id) = split_doc_path(doc)?;
            let mut body =
                load_one(&tx, collection, id)?.ok_or_else(|| Error::NotFound(doc.to_string()))?;
            merge_fields(doc, &mut body, fields)?;
            tx.execute(
                "UPDATE documents SET body=?1 WHERE collection=?2 AND id=?3",
                params![serde_json::to_string(&body)?, collection, id],
            )?;
            changed.insert(collection.to_string());
        }
        // Dropping the transaction on an early return rolls it back.
        tx.commit()?;
        self.notify(&conn, changed)
    }
}
