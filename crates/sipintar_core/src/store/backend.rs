//! Backend selector.
//!
//! # Responsibility
//! - Choose remote or local mode from the endpoint/credential pair.
//! - Hold the chosen adapters for the rest of the process.
//!
//! # Invariants
//! - Remote mode iff both endpoint and credential are present and non-empty.
//! - The process-wide decision is made once; later calls return it unchanged.
//! - Selection constructs clients only; it never probes the network.

use crate::config::{LocalPersistence, StoreConfig};
use crate::store::local::LocalStore;
use crate::store::remote::{PostgrestAdapter, RemoteAdapter, RemoteError};
use crate::store::StoreError;
use log::{info, warn};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

static PROCESS_BACKEND: OnceCell<Backend> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Remote,
    Local,
}

impl BackendMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

#[derive(Debug)]
pub enum BackendError {
    Local(StoreError),
    Remote(RemoteError),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local(err) => write!(f, "failed to open local store: {err}"),
            Self::Remote(err) => write!(f, "failed to build remote adapter: {err}"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Local(err) => Some(err),
            Self::Remote(err) => Some(err),
        }
    }
}

impl From<StoreError> for BackendError {
    fn from(value: StoreError) -> Self {
        Self::Local(value)
    }
}

impl From<RemoteError> for BackendError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

/// Mode decision from configuration alone.
pub fn select_mode(config: &StoreConfig) -> BackendMode {
    if config.remote_credentials().is_some() {
        BackendMode::Remote
    } else {
        BackendMode::Local
    }
}

/// The adapters chosen for this process.
///
/// The local store is always present: accounts live there in both modes.
#[derive(Clone)]
pub struct Backend {
    remote: Option<Arc<dyn RemoteAdapter>>,
    local: Arc<LocalStore>,
    local_persistence: LocalPersistence,
}

impl Backend {
    /// Applies the selection rule to `config`.
    pub fn select(config: &StoreConfig, local: Arc<LocalStore>) -> Result<Self, BackendError> {
        let backend = match config.remote_credentials() {
            Some((endpoint, key)) => {
                let adapter = PostgrestAdapter::new(endpoint, key, config.remote_timeout)?;
                Self::remote(Arc::new(adapter), local)
            }
            None => {
                warn!(
                    "event=backend_select module=store status=ok mode=local reason=remote_not_configured"
                );
                Self::local(local, config.local_persistence)
            }
        };
        if let Some(adapter) = &backend.remote {
            info!(
                "event=backend_select module=store status=ok mode=remote adapter={}",
                adapter.adapter_tag()
            );
        }
        Ok(backend)
    }

    /// Local mode over `local`.
    pub fn local(local: Arc<LocalStore>, local_persistence: LocalPersistence) -> Self {
        Self {
            remote: None,
            local,
            local_persistence,
        }
    }

    /// Remote mode through `adapter`; accounts still use `local`.
    pub fn remote(adapter: Arc<dyn RemoteAdapter>, local: Arc<LocalStore>) -> Self {
        Self {
            remote: Some(adapter),
            local,
            local_persistence: LocalPersistence::Session,
        }
    }

    pub fn mode(&self) -> BackendMode {
        if self.remote.is_some() {
            BackendMode::Remote
        } else {
            BackendMode::Local
        }
    }

    pub fn remote_adapter(&self) -> Option<&Arc<dyn RemoteAdapter>> {
        self.remote.as_ref()
    }

    pub fn local_store(&self) -> &Arc<LocalStore> {
        &self.local
    }

    pub fn local_persistence(&self) -> LocalPersistence {
        self.local_persistence
    }
}

/// Makes the process-wide backend decision, or returns the one already made.
///
/// The first successful call wins; configuration passed to later calls is
/// ignored.
pub fn init_process_backend(config: &StoreConfig) -> Result<&'static Backend, BackendError> {
    PROCESS_BACKEND.get_or_try_init(|| {
        let local = Arc::new(LocalStore::open(&config.local_db_path)?);
        Backend::select(config, local)
    })
}

/// Returns the process-wide backend when it has been initialized.
pub fn process_backend() -> Option<&'static Backend> {
    PROCESS_BACKEND.get()
}
