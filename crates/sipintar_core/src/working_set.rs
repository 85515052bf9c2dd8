//! In-memory working set per entity type.
//!
//! # Responsibility
//! - Hold the collection the presentation layer reads from.
//! - Load it once from a repository (`UNLOADED -> LOADING -> READY`).
//! - Apply the local transform of each repository write and notify
//!   subscribers.
//!
//! # Invariants
//! - The initial load runs at most once at a time; a concurrent call waits
//!   for the running load instead of issuing another read, and claims the
//!   load itself if that one ends `Unloaded`.
//! - Dropping a `load` future mid-read puts the set back to `Unloaded`.
//! - Under `SyncPolicy::Confirmed` the set changes only after the repository
//!   confirmed the write.
//! - Under `SyncPolicy::Optimistic` backend failures are swallowed and the
//!   transform is applied anyway, so the set may diverge from the store.

use crate::model::{Entity, Placement};
use crate::repo::{EntityRepository, RepoResult};
use log::warn;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Ready,
}

/// How repository outcomes gate working-set transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// Apply only confirmed writes; report failures to the caller.
    #[default]
    Confirmed,
    /// Apply every write regardless of the backend outcome.
    Optimistic,
}

/// State published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<E> {
    pub state: LoadState,
    pub items: Vec<E>,
}

/// Explicit store object for one entity collection.
pub struct WorkingSet<E> {
    tx: watch::Sender<Snapshot<E>>,
    policy: SyncPolicy,
}

impl<E: Entity> Default for WorkingSet<E> {
    fn default() -> Self {
        Self::new(SyncPolicy::default())
    }
}

impl<E: Entity> WorkingSet<E> {
    pub fn new(policy: SyncPolicy) -> Self {
        let (tx, _rx) = watch::channel(Snapshot {
            state: LoadState::Unloaded,
            items: Vec::new(),
        });
        Self { tx, policy }
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    pub fn state(&self) -> LoadState {
        self.tx.borrow().state
    }

    /// Returns a copy of the current items.
    pub fn get(&self) -> Vec<E> {
        self.tx.borrow().items.clone()
    }

    pub fn find(&self, key: &str) -> Option<E> {
        self.tx
            .borrow()
            .items
            .iter()
            .find(|item| item.key() == key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receives every later snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<E>> {
        self.tx.subscribe()
    }

    /// Applies an arbitrary transform and notifies subscribers.
    pub fn mutate(&self, transform: impl FnOnce(&mut Vec<E>)) {
        self.tx.send_modify(|snapshot| transform(&mut snapshot.items));
    }

    /// Loads the collection once from `repo`.
    ///
    /// Returns the resulting state. Under `Confirmed`, a failed read puts the
    /// set back to `Unloaded` and returns the error so the caller can retry.
    pub async fn load(&self, repo: &dyn EntityRepository<E>) -> RepoResult<LoadState> {
        loop {
            if self.claim_load() {
                break;
            }
            match self.settled_state().await {
                LoadState::Unloaded => continue,
                state => return Ok(state),
            }
        }

        let mut guard = LoadGuard {
            tx: &self.tx,
            armed: true,
        };
        let loaded = match self.policy {
            SyncPolicy::Optimistic => Ok(repo.get_all().await),
            SyncPolicy::Confirmed => repo.try_get_all().await,
        };
        guard.armed = false;

        match loaded {
            Ok(items) => {
                self.tx.send_modify(|snapshot| {
                    snapshot.state = LoadState::Ready;
                    snapshot.items = items;
                });
                Ok(LoadState::Ready)
            }
            Err(err) => {
                self.tx
                    .send_modify(|snapshot| snapshot.state = LoadState::Unloaded);
                Err(err)
            }
        }
    }

    fn claim_load(&self) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.state != LoadState::Unloaded {
                return false;
            }
            snapshot.state = LoadState::Loading;
            true
        })
    }

    /// Waits until no load is running and returns the state it left.
    async fn settled_state(&self) -> LoadState {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let settled = match rx
            .wait_for(|snapshot| snapshot.state != LoadState::Loading)
            .await
        {
            Ok(snapshot) => snapshot.state,
            Err(_) => self.state(),
        };
        settled
    }

    /// Saves `entity` through `repo`, then mirrors it locally.
    ///
    /// A new key is placed per `E::NEW_PLACEMENT`; an existing key is
    /// replaced in place.
    pub async fn save(&self, repo: &dyn EntityRepository<E>, entity: E) -> RepoResult<()> {
        let outcome = repo.save(&entity).await;
        if self.should_apply(&outcome) {
            self.apply_upsert(entity);
        }
        self.settle(outcome, "save")
    }

    /// Deletes `key` through `repo`, then removes it locally.
    pub async fn delete(&self, repo: &dyn EntityRepository<E>, key: &str) -> RepoResult<()> {
        let outcome = repo.delete(key).await;
        if self.should_apply(&outcome) {
            self.apply_remove(key);
        }
        self.settle(outcome, "delete")
    }

    /// Local transform for a save: id-match replace, else insert.
    pub fn apply_upsert(&self, entity: E) {
        self.mutate(|items| {
            if let Some(existing) = items.iter_mut().find(|item| item.key() == entity.key()) {
                *existing = entity;
                return;
            }
            match E::NEW_PLACEMENT {
                Placement::Prepend => items.insert(0, entity),
                Placement::Append => items.push(entity),
            }
        });
    }

    /// Local transform for a delete: id-match filter-out.
    pub fn apply_remove(&self, key: &str) {
        self.tx.send_if_modified(|snapshot| {
            let before = snapshot.items.len();
            snapshot.items.retain(|item| item.key() != key);
            snapshot.items.len() != before
        });
    }

    fn should_apply(&self, outcome: &RepoResult<()>) -> bool {
        match (self.policy, outcome) {
            (_, Ok(())) => true,
            (SyncPolicy::Optimistic, Err(err)) => err.is_backend_failure(),
            (SyncPolicy::Confirmed, Err(_)) => false,
        }
    }

    fn settle(&self, outcome: RepoResult<()>, op: &str) -> RepoResult<()> {
        match (self.policy, outcome) {
            (SyncPolicy::Optimistic, Err(err)) if err.is_backend_failure() => {
                warn!(
                    "event=working_set_{op} module=working_set status=diverged collection={} error={}",
                    E::COLLECTION,
                    err
                );
                Ok(())
            }
            (_, outcome) => outcome,
        }
    }
}

/// Resets an abandoned `Loading` claim so the next caller can load.
struct LoadGuard<'a, E> {
    tx: &'a watch::Sender<Snapshot<E>>,
    armed: bool,
}

impl<E> Drop for LoadGuard<'_, E> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.tx.send_if_modified(|snapshot| {
            if snapshot.state != LoadState::Loading {
                return false;
            }
            snapshot.state = LoadState::Unloaded;
            true
        });
    }
}
