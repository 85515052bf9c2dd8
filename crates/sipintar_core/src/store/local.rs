//! Local fallback store over the SQLite key-value table.
//!
//! # Responsibility
//! - Hold one JSON array of domain-shaped entities per namespaced key.
//! - Serve the bundled seed for a collection whose key was never written.
//!
//! # Invariants
//! - Reading a seed never persists it.
//! - Read-modify-write runs under one connection lock, so concurrent upserts
//!   of the same key resolve as last-write-wins without losing other records.
//! - A record that fails to parse is skipped and reported, not fatal.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::Entity;
use crate::store::{StoreError, StoreResult};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Synchronous, namespaced, durable key-value store.
pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens (or creates) the store database at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a throwaway in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Returns the raw payload stored under `key`, if it was ever written.
    pub fn read_raw(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.lock()?;
        read_payload(&conn, key)
    }

    /// Overwrites the raw payload stored under `key`.
    pub fn write_raw(&self, key: &str, payload: &str) -> StoreResult<()> {
        let conn = self.lock()?;
        write_payload(&conn, key, payload)
    }

    /// Returns whether the collection's namespace key was ever written.
    pub fn is_written<E: Entity>(&self) -> StoreResult<bool> {
        Ok(self.read_raw(&E::COLLECTION.storage_key())?.is_some())
    }

    /// Returns every stored record, or the seed on first run.
    pub fn get_all<E: Entity>(&self) -> StoreResult<Vec<E>> {
        let conn = self.lock()?;
        load_or_seed::<E>(&conn)
    }

    /// Replaces the whole collection.
    pub fn replace_all<E: Entity>(&self, items: &[E]) -> StoreResult<()> {
        let conn = self.lock()?;
        store_items(&conn, items)
    }

    /// Creates or replaces the record with the same key.
    ///
    /// On first write the seed becomes the base collection, matching what
    /// `get_all` showed before the write.
    pub fn upsert<E: Entity>(&self, entity: &E) -> StoreResult<()> {
        let conn = self.lock()?;
        let mut items = load_or_seed::<E>(&conn)?;
        match items.iter_mut().find(|item| item.key() == entity.key()) {
            Some(existing) => *existing = entity.clone(),
            None => items.push(entity.clone()),
        }
        store_items(&conn, &items)
    }

    /// Removes the record with `key`; returns whether one was removed.
    pub fn delete<E: Entity>(&self, key: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        let mut items = load_or_seed::<E>(&conn)?;
        let before = items.len();
        items.retain(|item| item.key() != key);
        if items.len() == before {
            return Ok(false);
        }
        store_items(&conn, &items)?;
        Ok(true)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

fn read_payload(conn: &Connection, key: &str) -> StoreResult<Option<String>> {
    let payload = conn
        .query_row(
            "SELECT payload FROM local_collections WHERE namespace_key = ?1;",
            [key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(DbError::from)?;
    Ok(payload)
}

fn write_payload(conn: &Connection, key: &str, payload: &str) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO local_collections (namespace_key, payload, updated_at)
         VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
         ON CONFLICT(namespace_key) DO UPDATE SET
            payload = excluded.payload,
            updated_at = excluded.updated_at;",
        params![key, payload],
    )
    .map_err(DbError::from)?;
    Ok(())
}

fn load_or_seed<E: Entity>(conn: &Connection) -> StoreResult<Vec<E>> {
    let key = E::COLLECTION.storage_key();
    match read_payload(conn, &key)? {
        Some(payload) => parse_collection(&key, &payload),
        None => {
            debug!(
                "event=local_read module=store status=ok collection={} source=seed",
                E::COLLECTION
            );
            Ok(E::seed())
        }
    }
}

fn store_items<E: Entity>(conn: &Connection, items: &[E]) -> StoreResult<()> {
    let payload = serde_json::to_string(items).map_err(StoreError::Encode)?;
    write_payload(conn, &E::COLLECTION.storage_key(), &payload)
}

fn parse_collection<E: Entity>(key: &str, payload: &str) -> StoreResult<Vec<E>> {
    let records: Vec<Value> =
        serde_json::from_str(payload).map_err(|err| StoreError::CorruptCollection {
            key: key.to_string(),
            reason: err.to_string(),
        })?;

    let total = records.len();
    let items: Vec<E> = records
        .into_iter()
        .filter_map(|record| serde_json::from_value(record).ok())
        .collect();

    if items.len() < total {
        warn!(
            "event=local_read module=store status=degraded collection={} skipped={} total={}",
            E::COLLECTION,
            total - items.len(),
            total
        );
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::LocalStore;
    use crate::model::account::Account;
    use crate::model::Entity;
    use crate::store::StoreError;

    #[test]
    fn corrupt_payload_is_reported() {
        let store = LocalStore::open_in_memory().unwrap();
        store
            .write_raw(&Account::COLLECTION.storage_key(), "{not json")
            .unwrap();

        let err = store.get_all::<Account>().unwrap_err();
        assert!(matches!(err, StoreError::CorruptCollection { .. }));
    }

    #[test]
    fn unparsable_records_are_skipped() {
        let store = LocalStore::open_in_memory().unwrap();
        store
            .write_raw(
                &Account::COLLECTION.storage_key(),
                r#"[{"username":"admin","name":"A","role":"ADMIN","password":"x"},{"username":"broken"}]"#,
            )
            .unwrap();

        let accounts = store.get_all::<Account>().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].username, "admin");
    }
}
