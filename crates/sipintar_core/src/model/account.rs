//! Login account record.
//!
//! # Invariants
//! - `username` is the key and is unique.
//! - Accounts are persisted only through the local fallback store.
//! - `Debug` output never includes the password.

use crate::mapper::{field, SchemaTable};
use crate::model::{seed, Collection, Entity};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    /// Only administrators may remove registry or ledger records.
    pub fn can_delete_records(self) -> bool {
        matches!(self, Self::Admin)
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub name: String,
    pub role: Role,
    pub password: String,
}

impl Debug for Account {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Entity for Account {
    const COLLECTION: Collection = Collection::Accounts;
    const SCHEMA: SchemaTable = SchemaTable {
        table: "accounts",
        fields: &[
            field("username", "username"),
            field("name", "name"),
            field("role", "role"),
            field("password", "password"),
        ],
    };
    const KEY_FIELD: &'static str = "username";

    fn key(&self) -> &str {
        &self.username
    }

    fn seed() -> Vec<Self> {
        seed::accounts()
    }
}

#[cfg(test)]
mod tests {
    use super::{Account, Role};

    #[test]
    fn debug_redacts_password() {
        let account = Account {
            username: "admin".to_string(),
            name: "Ketua RT".to_string(),
            role: Role::Admin,
            password: "password123".to_string(),
        };
        let rendered = format!("{account:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("password123"));
    }

    #[test]
    fn only_admin_can_delete() {
        assert!(Role::Admin.can_delete_records());
        assert!(!Role::Staff.can_delete_records());
    }
}
