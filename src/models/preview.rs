//! Import preview returned by the backend parser
//!
//! The preview is read-only: user edits live in the commit form overlay.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::{AccountId, CategoryId, RowId, SubscriptionId};
use super::money::Money;

/// Per-file parse outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewFile {
    pub file_name: String,
    pub account_id: AccountId,
    #[serde(default)]
    pub row_count: usize,
    #[serde(default)]
    pub error_count: usize,
    /// Human-readable parse errors ("line 12: unparseable date")
    #[serde(default)]
    pub errors: Vec<String>,
}

/// A server-parsed candidate transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRow {
    pub id: RowId,
    pub file_name: String,
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub amount: Money,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub suggested_category_id: Option<CategoryId>,
    #[serde(default)]
    pub suggested_subscription_id: Option<SubscriptionId>,
    /// The parser flags rows such as tax payments or refunds
    #[serde(default)]
    pub is_tax_event: bool,
}

/// Result of `POST /imports/preview`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportPreviewResponse {
    #[serde(default)]
    pub files: Vec<PreviewFile>,
    #[serde(default)]
    pub rows: Vec<PreviewRow>,
}

impl ImportPreviewResponse {
    /// Total file-level errors across all files
    pub fn file_error_count(&self) -> usize {
        self.files
            .iter()
            .map(|f| f.error_count.max(f.errors.len()))
            .sum()
    }

    /// Only an error-free preview may be audited
    pub fn is_clean(&self) -> bool {
        self.file_error_count() == 0
    }

    pub fn rows_for_file<'a>(&'a self, file_name: &'a str) -> impl Iterator<Item = &'a PreviewRow> {
        self.rows.iter().filter(move |r| r.file_name == file_name)
    }
}
