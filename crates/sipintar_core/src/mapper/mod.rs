//! Schema mapper between domain entities and remote storage records.
//!
//! # Responsibility
//! - Translate an entity's domain shape to its storage row and back, driven by
//!   one declarative field table per entity type.
//! - Detect table defects (unmapped or duplicated fields) instead of silently
//!   dropping data.
//!
//! # Invariants
//! - `from_storage(to_storage(e)) == e` for every valid entity `e`.
//! - An absent optional domain value is written as JSON `null`; a `null` or
//!   missing storage column reads back as absent (or the field default).
//! - Storage columns not named in the table are ignored on read.
//!
//! The local fallback store never goes through this module; it stores the
//! domain shape verbatim.

use crate::model::Entity;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type MapResult<T> = Result<T, MapError>;

/// One domain field and its storage column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub domain: &'static str,
    pub storage: &'static str,
}

/// Builds one [`FieldMapping`] row.
pub const fn field(domain: &'static str, storage: &'static str) -> FieldMapping {
    FieldMapping { domain, storage }
}

/// Declarative field table for one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaTable {
    pub table: &'static str,
    pub fields: &'static [FieldMapping],
}

#[derive(Debug)]
pub enum MapError {
    NotAnObject {
        table: &'static str,
    },
    UnmappedField {
        table: &'static str,
        field: String,
    },
    MissingField {
        table: &'static str,
        field: &'static str,
    },
    DuplicateName {
        table: &'static str,
        name: &'static str,
    },
    Serde {
        table: &'static str,
        source: serde_json::Error,
    },
}

impl Display for MapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject { table } => write!(f, "{table}: record is not a JSON object"),
            Self::UnmappedField { table, field } => {
                write!(f, "{table}: domain field `{field}` has no storage column")
            }
            Self::MissingField { table, field } => {
                write!(f, "{table}: mapped domain field `{field}` missing from entity")
            }
            Self::DuplicateName { table, name } => {
                write!(f, "{table}: `{name}` appears more than once in the field table")
            }
            Self::Serde { table, source } => write!(f, "{table}: {source}"),
        }
    }
}

impl Error for MapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serde { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl SchemaTable {
    /// Returns the storage column for one domain field.
    pub fn storage_column(&self, domain: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|mapping| mapping.domain == domain)
            .map(|mapping| mapping.storage)
    }

    /// Checks that the table is a bijection covering every field of `sample`.
    ///
    /// `sample` should be a fully populated domain value (all optionals set),
    /// so a field added to the entity without a table row is reported.
    pub fn check_total(&self, sample: &Value) -> MapResult<()> {
        let mut domain_names = BTreeSet::new();
        let mut storage_names = BTreeSet::new();
        for mapping in self.fields {
            if !domain_names.insert(mapping.domain) {
                return Err(MapError::DuplicateName {
                    table: self.table,
                    name: mapping.domain,
                });
            }
            if !storage_names.insert(mapping.storage) {
                return Err(MapError::DuplicateName {
                    table: self.table,
                    name: mapping.storage,
                });
            }
        }

        let object = sample.as_object().ok_or(MapError::NotAnObject { table: self.table })?;
        self.rename_to_storage(object).map(|_| ())
    }

    fn rename_to_storage(&self, object: &Map<String, Value>) -> MapResult<Map<String, Value>> {
        if let Some(unmapped) = object
            .keys()
            .find(|key| self.storage_column(key.as_str()).is_none())
        {
            return Err(MapError::UnmappedField {
                table: self.table,
                field: unmapped.clone(),
            });
        }

        let mut row = Map::with_capacity(self.fields.len());
        for mapping in self.fields {
            let value = object.get(mapping.domain).ok_or(MapError::MissingField {
                table: self.table,
                field: mapping.domain,
            })?;
            row.insert(mapping.storage.to_string(), value.clone());
        }
        Ok(row)
    }

    fn rename_to_domain(&self, row: &Map<String, Value>) -> Map<String, Value> {
        self.fields
            .iter()
            .filter_map(|mapping| match row.get(mapping.storage) {
                None | Some(Value::Null) => None,
                Some(value) => Some((mapping.domain.to_string(), value.clone())),
            })
            .collect()
    }
}

/// Converts an entity into its storage row.
pub fn to_storage<E: Entity>(entity: &E) -> MapResult<Value> {
    let table = E::SCHEMA.table;
    let domain = serde_json::to_value(entity).map_err(|source| MapError::Serde { table, source })?;
    let object = domain.as_object().ok_or(MapError::NotAnObject { table })?;
    E::SCHEMA.rename_to_storage(object).map(Value::Object)
}

/// Converts one storage row into an entity.
pub fn from_storage<E: Entity>(record: &Value) -> MapResult<E> {
    let table = E::SCHEMA.table;
    let row = record.as_object().ok_or(MapError::NotAnObject { table })?;
    let domain = E::SCHEMA.rename_to_domain(row);
    serde_json::from_value(Value::Object(domain))
        .map_err(|source| MapError::Serde { table, source })
}
