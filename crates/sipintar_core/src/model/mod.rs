//! Domain model for the district records store.
//!
//! # Responsibility
//! - Define the entity shapes held in working sets and persisted by adapters.
//! - Describe, per entity type, how it is keyed, ordered and mapped to storage.
//!
//! # Invariants
//! - Every entity is identified by one opaque string key (`id`, or `username`
//!   for accounts) assigned client-side.
//! - The serde shape of an entity is the domain shape stored verbatim by the
//!   local fallback store.

use crate::mapper::SchemaTable;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod account;
pub mod announcement;
pub mod resident;
pub mod seed;
pub mod transaction;

/// Persisted collections known to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Residents,
    Transactions,
    Announcements,
    Accounts,
}

impl Collection {
    /// Collection (remote table) name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Residents => "residents",
            Self::Transactions => "transactions",
            Self::Announcements => "announcements",
            Self::Accounts => "accounts",
        }
    }

    /// Namespaced key used by the local fallback store.
    pub fn storage_key(self) -> String {
        format!("sipintar_{}", self.as_str())
    }

    /// Accounts never leave the local store, whatever the active mode.
    pub fn is_local_only(self) -> bool {
        matches!(self, Self::Accounts)
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a newly created record lands in a working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Prepend,
    Append,
}

/// Canonical ordering on a domain field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    /// Domain field name; the remote adapter maps it to its storage column.
    pub field: &'static str,
    pub descending: bool,
}

/// Invariant violation detected on an entity value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityValidationError {
    EmptyKey { collection: Collection },
    NegativeAmount { id: String, amount: i64 },
}

impl Display for EntityValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyKey { collection } => {
                write!(f, "{collection} record has an empty key")
            }
            Self::NegativeAmount { id, amount } => {
                write!(f, "transaction `{id}` has negative amount {amount}")
            }
        }
    }
}

impl Error for EntityValidationError {}

/// Contract shared by every persisted entity type.
///
/// One generic repository implementation serves all collections; this trait
/// carries the only per-type knowledge it needs.
pub trait Entity: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;
    /// Declarative domain <-> storage field table.
    const SCHEMA: SchemaTable;
    /// Domain field holding the key.
    const KEY_FIELD: &'static str = "id";
    const NEW_PLACEMENT: Placement = Placement::Append;
    const ORDER: Option<SortSpec> = None;

    fn key(&self) -> &str;

    /// Bundled first-run dataset for the local fallback store.
    fn seed() -> Vec<Self>;

    /// Sorts a loaded collection into its canonical order.
    fn sort_canonical(_items: &mut [Self]) {}

    /// Checks invariants that must hold for every stored record.
    fn validate(&self) -> Result<(), EntityValidationError> {
        if self.key().trim().is_empty() {
            return Err(EntityValidationError::EmptyKey {
                collection: Self::COLLECTION,
            });
        }
        Ok(())
    }
}

/// Generates a new client-side record id.
///
/// Ids are time-ordered (UUID v7) so they sort by creation time like the
/// timestamp ids already present in stored data, without colliding when two
/// records are created in the same millisecond.
pub fn new_record_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::{new_record_id, Collection};

    #[test]
    fn storage_keys_are_namespaced() {
        assert_eq!(Collection::Residents.storage_key(), "sipintar_residents");
        assert_eq!(Collection::Accounts.storage_key(), "sipintar_accounts");
    }

    #[test]
    fn only_accounts_are_local_only() {
        assert!(Collection::Accounts.is_local_only());
        assert!(!Collection::Residents.is_local_only());
        assert!(!Collection::Transactions.is_local_only());
        assert!(!Collection::Announcements.is_local_only());
    }

    #[test]
    fn new_record_ids_are_distinct() {
        let first = new_record_id();
        let second = new_record_id();
        assert_ne!(first, second);
        assert_eq!(first.len(), 36);
    }
}
