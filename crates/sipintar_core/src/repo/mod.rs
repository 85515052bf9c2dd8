//! Entity repositories: the storage contract consumed by working sets.
//!
//! # Responsibility
//! - Expose `get_all`, `save` (upsert) and `delete` per entity type.
//! - Delegate to the selected adapter, mapping fields only on the remote path.
//!
//! # Invariants
//! - Writes re-check entity invariants before touching any store.
//! - Backend failures are logged at this boundary; `get_all` degrades to an
//!   empty collection, every other operation returns the error.

use crate::mapper::MapError;
use crate::model::EntityValidationError;
use crate::store::{RemoteError, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod entity_repo;
pub mod registry;

pub use entity_repo::{CollectionRepository, EntityRepository};
pub use registry::Repositories;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository boundary error.
#[derive(Debug)]
pub enum RepoError {
    Validation(EntityValidationError),
    Local(StoreError),
    Remote(RemoteError),
    Mapping(MapError),
}

impl RepoError {
    /// Whether the failure came from a store rather than the entity itself.
    pub fn is_backend_failure(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Local(err) => write!(f, "local store: {err}"),
            Self::Remote(err) => write!(f, "remote store: {err}"),
            Self::Mapping(err) => write!(f, "schema mapping: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Local(err) => Some(err),
            Self::Remote(err) => Some(err),
            Self::Mapping(err) => Some(err),
        }
    }
}

impl From<EntityValidationError> for RepoError {
    fn from(value: EntityValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Local(value)
    }
}

impl From<RemoteError> for RepoError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

impl From<MapError> for RepoError {
    fn from(value: MapError) -> Self {
        Self::Mapping(value)
    }
}
