//! Generic entity repository over the selected backend.
//!
//! # Responsibility
//! - Implement the repository contract once for every entity type.
//! - Route each call to the remote adapter or the local fallback store.
//!
//! # Invariants
//! - Accounts are always routed to the local store.
//! - Loaded collections are returned in the entity's canonical order.
//! - Under `LocalPersistence::Session`, local-mode writes of non-account
//!   collections are accepted but not persisted.

use crate::config::LocalPersistence;
use crate::mapper::{from_storage, to_storage};
use crate::model::Entity;
use crate::repo::RepoResult;
use crate::store::{Backend, BackendMode, LocalStore, RemoteAdapter, RemoteOrder};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

/// Storage contract for one entity type.
#[async_trait]
pub trait EntityRepository<E: Entity>: Send + Sync {
    /// Returns every stored record, or the backend failure.
    async fn try_get_all(&self) -> RepoResult<Vec<E>>;

    /// Creates the record, or replaces the one with the same key.
    async fn save(&self, entity: &E) -> RepoResult<()>;

    /// Removes the record with `key`; a missing key is not an error.
    async fn delete(&self, key: &str) -> RepoResult<()>;

    /// Returns every stored record; a backend failure yields an empty list.
    ///
    /// Callers cannot tell "no data" from "read failed" here; use
    /// [`EntityRepository::try_get_all`] when that matters.
    async fn get_all(&self) -> Vec<E> {
        match self.try_get_all().await {
            Ok(items) => items,
            Err(err) => {
                warn!(
                    "event=repo_get_all module=repo status=degraded collection={} fallback=empty error={}",
                    E::COLLECTION,
                    err
                );
                Vec::new()
            }
        }
    }
}

enum Route<'a> {
    Remote(&'a dyn RemoteAdapter),
    Local(&'a LocalStore),
}

impl Route<'_> {
    fn mode(&self) -> BackendMode {
        match self {
            Self::Remote(_) => BackendMode::Remote,
            Self::Local(_) => BackendMode::Local,
        }
    }
}

/// The one repository implementation, parameterized by entity type.
pub struct CollectionRepository<E> {
    backend: Backend,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> CollectionRepository<E> {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            _entity: PhantomData,
        }
    }

    /// Boxes the repository behind the contract.
    pub fn shared(backend: Backend) -> Arc<dyn EntityRepository<E>> {
        Arc::new(Self::new(backend))
    }

    fn route(&self) -> Route<'_> {
        match self.backend.remote_adapter() {
            Some(adapter) if !E::COLLECTION.is_local_only() => Route::Remote(adapter.as_ref()),
            _ => Route::Local(self.backend.local_store().as_ref()),
        }
    }

    fn persists_locally(&self) -> bool {
        E::COLLECTION.is_local_only()
            || self.backend.local_persistence() == LocalPersistence::Durable
    }

    async fn load(&self, route: &Route<'_>) -> RepoResult<Vec<E>> {
        match route {
            Route::Remote(adapter) => {
                let order = E::ORDER.map(|spec| RemoteOrder {
                    column: E::SCHEMA.storage_column(spec.field).unwrap_or(spec.field),
                    descending: spec.descending,
                });
                let rows = adapter.select_all(E::SCHEMA.table, order).await?;
                let total = rows.len();
                let items: Vec<E> = rows
                    .iter()
                    .filter_map(|row| match from_storage::<E>(row) {
                        Ok(item) => Some(item),
                        Err(err) => {
                            debug!(
                                "event=remote_row_skipped module=repo collection={} error={}",
                                E::COLLECTION,
                                err
                            );
                            None
                        }
                    })
                    .collect();
                if items.len() < total {
                    warn!(
                        "event=repo_get_all module=repo status=degraded collection={} skipped={} total={}",
                        E::COLLECTION,
                        total - items.len(),
                        total
                    );
                }
                Ok(items)
            }
            Route::Local(store) => Ok(store.get_all::<E>()?),
        }
    }

    async fn write(&self, route: &Route<'_>, entity: &E) -> RepoResult<()> {
        match route {
            Route::Remote(adapter) => {
                let row = to_storage(entity)?;
                adapter
                    .upsert(E::SCHEMA.table, key_column::<E>(), row)
                    .await?;
            }
            Route::Local(store) if self.persists_locally() => store.upsert(entity)?,
            Route::Local(_) => log_session_only::<E>("save", entity.key()),
        }
        Ok(())
    }

    async fn remove(&self, route: &Route<'_>, key: &str) -> RepoResult<()> {
        match route {
            Route::Remote(adapter) => {
                adapter
                    .delete_eq(E::SCHEMA.table, key_column::<E>(), key)
                    .await?;
            }
            Route::Local(store) if self.persists_locally() => {
                store.delete::<E>(key)?;
            }
            Route::Local(_) => log_session_only::<E>("delete", key),
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> EntityRepository<E> for CollectionRepository<E> {
    async fn try_get_all(&self) -> RepoResult<Vec<E>> {
        let started_at = Instant::now();
        let route = self.route();
        let result = self.load(&route).await.map(|mut items| {
            E::sort_canonical(&mut items);
            items
        });

        match &result {
            Ok(items) => info!(
                "event=repo_get_all module=repo status=ok collection={} mode={} count={} duration_ms={}",
                E::COLLECTION,
                route.mode().as_str(),
                items.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=repo_get_all module=repo status=error collection={} mode={} duration_ms={} error={}",
                E::COLLECTION,
                route.mode().as_str(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    async fn save(&self, entity: &E) -> RepoResult<()> {
        if let Err(err) = entity.validate() {
            warn!(
                "event=repo_save module=repo status=rejected collection={} key={} error={}",
                E::COLLECTION,
                entity.key(),
                err
            );
            return Err(err.into());
        }

        let started_at = Instant::now();
        let route = self.route();
        let result = self.write(&route, entity).await;
        log_write_outcome::<E>("repo_save", &route, entity.key(), started_at, &result);
        result
    }

    async fn delete(&self, key: &str) -> RepoResult<()> {
        let started_at = Instant::now();
        let route = self.route();
        let result = self.remove(&route, key).await;
        log_write_outcome::<E>("repo_delete", &route, key, started_at, &result);
        result
    }
}

fn key_column<E: Entity>() -> &'static str {
    E::SCHEMA
        .storage_column(E::KEY_FIELD)
        .unwrap_or(E::KEY_FIELD)
}

fn log_session_only<E: Entity>(op: &str, key: &str) {
    debug!(
        "event=local_write module=repo status=skipped op={op} collection={} key={key} reason=session_only",
        E::COLLECTION
    );
}

fn log_write_outcome<E: Entity>(
    event: &str,
    route: &Route<'_>,
    key: &str,
    started_at: Instant,
    result: &RepoResult<()>,
) {
    match result {
        Ok(()) => info!(
            "event={event} module=repo status=ok collection={} mode={} key={key} duration_ms={}",
            E::COLLECTION,
            route.mode().as_str(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event={event} module=repo status=error collection={} mode={} key={key} duration_ms={} error={}",
            E::COLLECTION,
            route.mode().as_str(),
            started_at.elapsed().as_millis(),
            err
        ),
    }
}
