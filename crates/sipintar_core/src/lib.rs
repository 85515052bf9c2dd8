//! Entity persistence layer for the SiPintar district administration tool.
//!
//! Residents, ledger transactions and announcements are stored through a
//! hosted relational backend when one is configured, and through a local
//! SQLite fallback store otherwise. Accounts always stay local.

pub mod config;
pub mod db;
pub mod logging;
pub mod mapper;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod working_set;

pub use config::{ConfigError, LocalPersistence, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::account::{Account, Role};
pub use model::announcement::Announcement;
pub use model::resident::{Gender, MaritalStatus, Resident};
pub use model::transaction::{Transaction, TransactionType};
pub use model::{Collection, Entity, EntityValidationError};
pub use repo::{CollectionRepository, EntityRepository, RepoError, RepoResult, Repositories};
pub use service::{ServiceError, ServiceResult, ValidationError};
pub use store::{init_process_backend, Backend, BackendMode, LocalStore, PostgrestAdapter};
pub use working_set::{LoadState, SyncPolicy, WorkingSet};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
