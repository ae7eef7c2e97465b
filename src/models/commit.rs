//! Commit payload and response

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::{AccountId, CategoryId, RowId, SubscriptionId};
use super::money::Money;

/// One audited row as posted to the backend
///
/// Rows with `delete: true` are still sent; the backend decides whether that
/// means "skip" or "remove".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRow {
    pub id: RowId,
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub amount: Money,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub subscription_id: Option<SubscriptionId>,
    pub tax_event: bool,
    pub delete: bool,
    /// Set on rows produced by splitting another row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_from: Option<RowId>,
    /// Expense this row reimburses, when linked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reimburses: Option<RowId>,
}

/// Body of `POST /imports/commit`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitRequest {
    pub rows: Vec<CommitRow>,
}

impl CommitRequest {
    /// Rows that will produce ledger effects
    pub fn posting_rows(&self) -> impl Iterator<Item = &CommitRow> {
        self.rows.iter().filter(|r| !r.delete)
    }
}

/// Result of `POST /imports/commit`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitResponse {
    #[serde(default)]
    pub created: usize,
    #[serde(default)]
    pub skipped: usize,
    #[serde(default)]
    pub removed: usize,
}
