#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use sipintar_core::config::LocalPersistence;
use sipintar_core::model::Entity;
use sipintar_core::repo::{EntityRepository, RepoResult};
use sipintar_core::store::{
    Backend, LocalStore, RemoteAdapter, RemoteError, RemoteOrder, RemoteResult,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// In-memory stand-in for the hosted backend, keyed by table name.
#[derive(Default)]
pub struct MemoryRemote {
    tables: Mutex<BTreeMap<String, Vec<Value>>>,
    calls: AtomicUsize,
}

impl MemoryRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn insert_row(&self, table: &str, row: Value) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    fn touch(&self) {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
    }
}

#[async_trait]
impl RemoteAdapter for MemoryRemote {
    fn adapter_tag(&self) -> &'static str {
        "memory"
    }

    async fn select_all(
        &self,
        table: &str,
        order: Option<RemoteOrder<'_>>,
    ) -> RemoteResult<Vec<Value>> {
        self.touch();
        let mut rows = self.rows(table);
        if let Some(order) = order {
            rows.sort_by(|a, b| {
                let ordering = compare(&a[order.column], &b[order.column]);
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        Ok(rows)
    }

    async fn upsert(&self, table: &str, key_column: &str, row: Value) -> RemoteResult<()> {
        self.touch();
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        match rows
            .iter_mut()
            .find(|existing| existing[key_column] == row[key_column])
        {
            Some(existing) => *existing = row,
            None => rows.push(row),
        }
        Ok(())
    }

    async fn delete_eq(&self, table: &str, key_column: &str, key: &str) -> RemoteResult<()> {
        self.touch();
        if let Some(rows) = self.tables.lock().unwrap().get_mut(table) {
            rows.retain(|row| row[key_column].as_str() != Some(key));
        }
        Ok(())
    }
}

/// Backend that answers every call with a server error.
#[derive(Default)]
pub struct UnavailableRemote {
    calls: AtomicUsize,
}

impl UnavailableRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    fn fail<T>(&self) -> RemoteResult<T> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        Err(RemoteError::Status {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}

#[async_trait]
impl RemoteAdapter for UnavailableRemote {
    fn adapter_tag(&self) -> &'static str {
        "unavailable"
    }

    async fn select_all(
        &self,
        _table: &str,
        _order: Option<RemoteOrder<'_>>,
    ) -> RemoteResult<Vec<Value>> {
        self.fail()
    }

    async fn upsert(&self, _table: &str, _key_column: &str, _row: Value) -> RemoteResult<()> {
        self.fail()
    }

    async fn delete_eq(&self, _table: &str, _key_column: &str, _key: &str) -> RemoteResult<()> {
        self.fail()
    }
}

/// Repository whose reads never complete.
pub struct PendingRepo;

#[async_trait]
impl<E: Entity> EntityRepository<E> for PendingRepo {
    async fn try_get_all(&self) -> RepoResult<Vec<E>> {
        std::future::pending().await
    }

    async fn save(&self, _entity: &E) -> RepoResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> RepoResult<()> {
        Ok(())
    }
}

/// Holds every read until `open` is called, then delegates.
pub struct GatedRepo<E> {
    inner: Arc<dyn EntityRepository<E>>,
    gate: Notify,
    reads: AtomicUsize,
}

impl<E: Entity> GatedRepo<E> {
    pub fn new(inner: Arc<dyn EntityRepository<E>>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            gate: Notify::new(),
            reads: AtomicUsize::new(0),
        })
    }

    pub fn open(&self) {
        self.gate.notify_waiters();
    }

    pub fn reads(&self) -> usize {
        self.reads.load(AtomicOrdering::SeqCst)
    }
}

#[async_trait]
impl<E: Entity> EntityRepository<E> for GatedRepo<E> {
    async fn try_get_all(&self) -> RepoResult<Vec<E>> {
        self.reads.fetch_add(1, AtomicOrdering::SeqCst);
        self.gate.notified().await;
        self.inner.try_get_all().await
    }

    async fn save(&self, entity: &E) -> RepoResult<()> {
        self.inner.save(entity).await
    }

    async fn delete(&self, key: &str) -> RepoResult<()> {
        self.inner.delete(key).await
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a.as_str(), b.as_str()) {
        (Some(left), Some(right)) => left.cmp(right),
        _ => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
    }
}

pub fn in_memory_store() -> Arc<LocalStore> {
    Arc::new(LocalStore::open_in_memory().unwrap())
}

pub fn remote_backend(remote: Arc<dyn RemoteAdapter>) -> Backend {
    Backend::remote(remote, in_memory_store())
}

pub fn local_backend(persistence: LocalPersistence) -> Backend {
    Backend::local(in_memory_store(), persistence)
}
