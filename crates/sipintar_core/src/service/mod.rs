//! Use-case services over working sets and repositories.
//!
//! # Responsibility
//! - Validate user input before any repository call.
//! - Enforce role rules (only administrators delete records).
//! - Route accepted writes through the entity's working set.
//!
//! # Invariants
//! - A rejected input never reaches a repository or a store.
//! - Services stay storage-agnostic; they see only `EntityRepository`.

use crate::model::account::Account;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod account_service;
pub mod announcement_service;
pub mod ledger_service;
pub mod resident_service;

pub use account_service::{AccountService, PasswordChange};
pub use announcement_service::{AnnouncementService, DraftError, DraftGenerator, Tone};
pub use ledger_service::{LedgerEntry, LedgerService, LedgerSummary};
pub use resident_service::{Demographics, ResidentService};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Input rejected before it reached a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField { field: &'static str },
    /// Field must be 1 to 16 decimal digits.
    InvalidNumber { field: &'static str },
    DuplicateNik,
    NonPositiveAmount { amount: i64 },
    PasswordTooShort { min_chars: usize },
    PasswordMismatch,
    InvalidCredentials,
    Forbidden { action: &'static str },
    NotFound { key: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "{field} is required"),
            Self::InvalidNumber { field } => {
                write!(f, "{field} must contain 1 to 16 digits only")
            }
            Self::DuplicateNik => write!(f, "NIK is already registered to another resident"),
            Self::NonPositiveAmount { amount } => {
                write!(f, "amount must be greater than zero, got {amount}")
            }
            Self::PasswordTooShort { min_chars } => {
                write!(f, "new password must be at least {min_chars} characters")
            }
            Self::PasswordMismatch => write!(f, "password confirmation does not match"),
            Self::InvalidCredentials => write!(f, "username or password is incorrect"),
            Self::Forbidden { action } => write!(f, "only administrators may {action}"),
            Self::NotFound { key } => write!(f, "record `{key}` not found"),
        }
    }
}

impl Error for ValidationError {}

/// Service boundary error.
#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    Repo(RepoError),
}

impl ServiceError {
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(_) => None,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Rejects `action` unless `actor` may delete records.
pub(crate) fn require_admin(actor: &Account, action: &'static str) -> Result<(), ValidationError> {
    if actor.role.can_delete_records() {
        Ok(())
    } else {
        Err(ValidationError::Forbidden { action })
    }
}

/// Trims `value`, rejecting it when nothing is left.
pub(crate) fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{required, require_admin, ValidationError};
    use crate::model::seed;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("  Budi ", "name").unwrap(), "Budi");
        assert_eq!(
            required("   ", "name").unwrap_err(),
            ValidationError::MissingField { field: "name" }
        );
    }

    #[test]
    fn staff_cannot_delete() {
        let accounts = seed::accounts();
        let admin = accounts.iter().find(|a| a.username == "admin").unwrap();
        let staff = accounts.iter().find(|a| a.username == "staff").unwrap();
        assert!(require_admin(admin, "delete residents").is_ok());
        assert_eq!(
            require_admin(staff, "delete residents").unwrap_err(),
            ValidationError::Forbidden {
                action: "delete residents"
            }
        );
    }
}
