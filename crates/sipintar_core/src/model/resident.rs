//! Resident registry record.
//!
//! # Invariants
//! - `nik` is unique across the collection. Uniqueness is checked by the
//!   resident service against the working set, not by the store.
//! - Serialized enum values are the labels already present in stored data;
//!   symbolic names are accepted on read.

use crate::mapper::{field, SchemaTable};
use crate::model::{seed, Collection, Entity};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "Laki-laki", alias = "MALE")]
    Male,
    #[serde(rename = "Perempuan", alias = "FEMALE")]
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaritalStatus {
    #[serde(rename = "Belum Kawin", alias = "SINGLE")]
    Single,
    #[serde(rename = "Kawin", alias = "MARRIED")]
    Married,
    #[serde(rename = "Cerai", alias = "DIVORCED")]
    Divorced,
}

/// One registered resident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    pub id: String,
    /// 16-digit personal identity number.
    pub nik: String,
    /// Household (family card) number shared by co-resident family members.
    #[serde(default)]
    pub kk_number: String,
    pub name: String,
    pub gender: Gender,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub job: String,
    /// Older records store this under `status`.
    #[serde(alias = "status")]
    pub marital_status: MaritalStatus,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl Resident {
    /// Creates a resident with the given identity and neutral defaults.
    pub fn new(id: impl Into<String>, nik: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nik: nik.into(),
            kk_number: String::new(),
            name: name.into(),
            gender: Gender::Male,
            birth_date: None,
            address: String::new(),
            job: String::new(),
            marital_status: MaritalStatus::Single,
            phone: String::new(),
            photo_url: None,
        }
    }
}

impl Entity for Resident {
    const COLLECTION: Collection = Collection::Residents;
    const SCHEMA: SchemaTable = SchemaTable {
        table: "residents",
        fields: &[
            field("id", "id"),
            field("nik", "nik"),
            field("kkNumber", "kk_number"),
            field("name", "name"),
            field("gender", "gender"),
            field("birthDate", "birth_date"),
            field("address", "address"),
            field("job", "job"),
            field("maritalStatus", "status"),
            field("phone", "phone"),
            field("photoUrl", "photo_url"),
        ],
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn seed() -> Vec<Self> {
        seed::residents()
    }
}

// Form input leaves an empty string when no birth date was picked.
fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
