//! Cash-ledger transaction record.

use crate::mapper::{field, SchemaTable};
use crate::model::{seed, Collection, Entity, EntityValidationError, Placement, SortSpec};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
}

/// One ledger entry. `amount` is in whole rupiah and never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub amount: i64,
    /// Serialized as `type` to match the stored shape.
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl Entity for Transaction {
    const COLLECTION: Collection = Collection::Transactions;
    const SCHEMA: SchemaTable = SchemaTable {
        table: "transactions",
        fields: &[
            field("id", "id"),
            field("date", "date"),
            field("description", "description"),
            field("category", "category"),
            field("amount", "amount"),
            field("type", "type"),
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
        seed::transactions()
    }

    fn sort_canonical(items: &mut [Self]) {
        items.sort_by(|a, b| b.date.cmp(&a.date));
    }

    fn validate(&self) -> Result<(), EntityValidationError> {
        if self.id.trim().is_empty() {
            return Err(EntityValidationError::EmptyKey {
                collection: Self::COLLECTION,
            });
        }
        if self.amount < 0 {
            return Err(EntityValidationError::NegativeAmount {
                id: self.id.clone(),
                amount: self.amount,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Transaction, TransactionType};
    use crate::model::{Entity, EntityValidationError};
    use chrono::NaiveDate;

    fn entry(id: &str, date: &str, amount: i64) -> Transaction {
        Transaction {
            id: id.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: "Iuran".to_string(),
            category: "Umum".to_string(),
            amount,
            kind: TransactionType::Income,
        }
    }

    #[test]
    fn canonical_order_is_date_descending_and_stable() {
        let mut items = vec![
            entry("a", "2023-10-01", 1),
            entry("b", "2023-10-15", 1),
            entry("c", "2023-10-05", 1),
            entry("d", "2023-10-15", 1),
        ];
        Transaction::sort_canonical(&mut items);
        let ids: Vec<_> = items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b", "d", "c", "a"]);
    }

    #[test]
    fn negative_amount_is_invalid_and_zero_is_allowed() {
        assert!(entry("z", "2023-10-01", 0).validate().is_ok());
        let err = entry("n", "2023-10-01", -5).validate().unwrap_err();
        assert_eq!(
            err,
            EntityValidationError::NegativeAmount {
                id: "n".to_string(),
                amount: -5
            }
        );
    }

    #[test]
    fn kind_serializes_as_type() {
        let value = serde_json::to_value(entry("t", "2023-10-01", 10)).unwrap();
        assert_eq!(value["type"], "INCOME");
        assert_eq!(value["date"], "2023-10-01");
    }
}
