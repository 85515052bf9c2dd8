//! Cash ledger use cases.
//!
//! # Invariants
//! - Entered amounts are strictly positive; the direction lives in the type.
//! - New entries are prepended to the working set.

use crate::model::account::Account;
use crate::model::new_record_id;
use crate::model::transaction::{Transaction, TransactionType};
use crate::repo::EntityRepository;
use crate::service::{require_admin, required, ServiceResult, ValidationError};
use crate::working_set::{LoadState, WorkingSet};
use chrono::{Local, NaiveDate};
use std::sync::Arc;

const DEFAULT_CATEGORY: &str = "Umum";

/// Form input for one ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub description: String,
    pub amount: i64,
    pub kind: TransactionType,
    /// Blank falls back to `Umum`.
    pub category: Option<String>,
    /// `None` means today.
    pub date: Option<NaiveDate>,
}

/// Totals over the loaded ledger, in whole rupiah.
///
/// Summed in `i128` so any ledger of valid `i64` amounts totals exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerSummary {
    pub income: i128,
    pub expense: i128,
    pub balance: i128,
}

pub struct LedgerService {
    repo: Arc<dyn EntityRepository<Transaction>>,
    set: Arc<WorkingSet<Transaction>>,
}

impl LedgerService {
    pub fn new(
        repo: Arc<dyn EntityRepository<Transaction>>,
        set: Arc<WorkingSet<Transaction>>,
    ) -> Self {
        Self { repo, set }
    }

    pub fn working_set(&self) -> &Arc<WorkingSet<Transaction>> {
        &self.set
    }

    pub async fn load(&self) -> ServiceResult<LoadState> {
        Ok(self.set.load(self.repo.as_ref()).await?)
    }

    /// Validates `entry` and records it as a new transaction.
    pub async fn record(&self, entry: LedgerEntry) -> ServiceResult<Transaction> {
        let transaction = build_transaction(entry, Local::now().date_naive())?;
        self.set
            .save(self.repo.as_ref(), transaction.clone())
            .await?;
        Ok(transaction)
    }

    pub async fn remove(&self, actor: &Account, id: &str) -> ServiceResult<()> {
        require_admin(actor, "delete transactions")?;
        self.set.delete(self.repo.as_ref(), id).await?;
        Ok(())
    }

    pub fn summary(&self) -> LedgerSummary {
        summarize(&self.set.get())
    }
}

fn build_transaction(entry: LedgerEntry, today: NaiveDate) -> Result<Transaction, ValidationError> {
    let description = required(&entry.description, "description")?;
    if entry.amount <= 0 {
        return Err(ValidationError::NonPositiveAmount {
            amount: entry.amount,
        });
    }
    let category = entry
        .category
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string();

    Ok(Transaction {
        id: new_record_id(),
        date: entry.date.unwrap_or(today),
        description,
        category,
        amount: entry.amount,
        kind: entry.kind,
    })
}

fn summarize(transactions: &[Transaction]) -> LedgerSummary {
    let mut summary = transactions
        .iter()
        .fold(LedgerSummary::default(), |mut acc, tx| {
            match tx.kind {
                TransactionType::Income => acc.income += i128::from(tx.amount),
                TransactionType::Expense => acc.expense += i128::from(tx.amount),
            }
            acc
        });
    summary.balance = summary.income - summary.expense;
    summary
}
