//! Per-type repository wiring.

use crate::model::account::Account;
use crate::model::announcement::Announcement;
use crate::model::resident::Resident;
use crate::model::transaction::Transaction;
use crate::repo::{CollectionRepository, EntityRepository};
use crate::store::{Backend, BackendMode};
use std::sync::Arc;

/// One repository per entity type, all bound to the same backend.
#[derive(Clone)]
pub struct Repositories {
    pub residents: Arc<dyn EntityRepository<Resident>>,
    pub transactions: Arc<dyn EntityRepository<Transaction>>,
    pub announcements: Arc<dyn EntityRepository<Announcement>>,
    pub accounts: Arc<dyn EntityRepository<Account>>,
    mode: BackendMode,
}

impl Repositories {
    pub fn new(backend: &Backend) -> Self {
        Self {
            residents: CollectionRepository::shared(backend.clone()),
            transactions: CollectionRepository::shared(backend.clone()),
            announcements: CollectionRepository::shared(backend.clone()),
            accounts: CollectionRepository::shared(backend.clone()),
            mode: backend.mode(),
        }
    }

    /// Mode the backend selector chose; informational only.
    pub fn mode(&self) -> BackendMode {
        self.mode
    }
}
