//! Durable store adapters and the backend selector.
//!
//! # Responsibility
//! - Provide the local fallback store (SQLite key-value, domain shape).
//! - Provide the remote adapter (hosted relational backend, storage shape).
//! - Decide once per process which adapter entity repositories delegate to.
//!
//! # Invariants
//! - Nothing outside this module and `repo` branches on the active mode.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod backend;
pub mod local;
pub mod remote;

pub use backend::{init_process_backend, process_backend, select_mode, Backend, BackendMode};
pub use local::LocalStore;
pub use remote::{PostgrestAdapter, RemoteAdapter, RemoteError, RemoteOrder, RemoteResult};

pub type StoreResult<T> = Result<T, StoreError>;

/// Local fallback store error.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Encode(serde_json::Error),
    CorruptCollection { key: String, reason: String },
    LockPoisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode collection: {err}"),
            Self::CorruptCollection { key, reason } => {
                write!(f, "stored collection `{key}` is not a JSON array: {reason}")
            }
            Self::LockPoisoned => write!(f, "local store lock poisoned by a panicked writer"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::CorruptCollection { .. } | Self::LockPoisoned => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}
