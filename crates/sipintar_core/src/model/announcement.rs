//! Public announcement record.

use crate::mapper::{field, SchemaTable};
use crate::model::{seed, Collection, Entity, Placement, SortSpec};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
    /// Whether the content was drafted by the text-generation collaborator.
    #[serde(rename = "isAIGenerated", default)]
    pub is_ai_generated: bool,
}

impl Entity for Announcement {
    const COLLECTION: Collection = Collection::Announcements;
    const SCHEMA: SchemaTable = SchemaTable {
        table: "announcements",
        fields: &[
            field("id", "id"),
            field("title", "title"),
            field("content", "content"),
            field("date", "date"),
            field("isAIGenerated", "is_ai_generated"),
        ],
    };
    const NEW_PLACEMENT: Placement = Placement::Prepend;
    const ORDER: Option<SortSpec> = Some(SortSpec {
        field: "date",
        descending: true,
    });

    fn key(&self) -> &str {
        &self.id
    }

    fn seed() -> Vec<Self> {
        seed::announcements()
    }

    fn sort_canonical(items: &mut [Self]) {
        items.sort_by(|a, b| b.date.cmp(&a.date));
    }
}
