//! Login and password maintenance for local accounts.
//!
//! # Invariants
//! - Credentials are compared as stored; accounts never leave the local store.
//! - Log events carry the outcome and role only, never the username or
//!   password.

use crate::model::account::Account;
use crate::repo::EntityRepository;
use crate::service::{ServiceResult, ValidationError};
use crate::working_set::{LoadState, WorkingSet};
use log::{info, warn};
use std::sync::Arc;

pub const MIN_PASSWORD_CHARS: usize = 4;

/// Change-password form input.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordChange {
    pub username: String,
    pub current_password: String,
    pub new_password: String,
    pub confirmation: String,
}

pub struct AccountService {
    repo: Arc<dyn EntityRepository<Account>>,
    set: Arc<WorkingSet<Account>>,
}

impl AccountService {
    pub fn new(repo: Arc<dyn EntityRepository<Account>>, set: Arc<WorkingSet<Account>>) -> Self {
        Self { repo, set }
    }

    pub async fn load(&self) -> ServiceResult<LoadState> {
        Ok(self.set.load(self.repo.as_ref()).await?)
    }

    /// Returns the account matching `username` and `password`.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<Account> {
        self.ensure_loaded().await?;
        match self.authenticate(username, password) {
            Some(account) => {
                info!(
                    "event=login module=service status=ok role={:?}",
                    account.role
                );
                Ok(account)
            }
            None => {
                warn!("event=login module=service status=rejected");
                Err(ValidationError::InvalidCredentials.into())
            }
        }
    }

    /// Replaces the password after re-checking the current credentials.
    pub async fn change_password(&self, request: &PasswordChange) -> ServiceResult<()> {
        self.ensure_loaded().await?;
        let mut account = self
            .authenticate(&request.username, &request.current_password)
            .ok_or(ValidationError::InvalidCredentials)?;
        check_new_password(&request.new_password, &request.confirmation)?;

        account.password = request.new_password.clone();
        self.set.save(self.repo.as_ref(), account).await?;
        info!("event=password_change module=service status=ok");
        Ok(())
    }

    async fn ensure_loaded(&self) -> ServiceResult<()> {
        if self.set.state() != LoadState::Ready {
            self.load().await?;
        }
        Ok(())
    }

    fn authenticate(&self, username: &str, password: &str) -> Option<Account> {
        self.set
            .find(username.trim())
            .filter(|account| account.password == password)
    }
}

fn check_new_password(new_password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if new_password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ValidationError::PasswordTooShort {
            min_chars: MIN_PASSWORD_CHARS,
        });
    }
    if new_password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}
