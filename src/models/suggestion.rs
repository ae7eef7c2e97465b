//! AI category/subscription suggestion exchange

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::{AccountId, CategoryId, RowId, SubscriptionId};
use super::money::Money;

/// One row sent for classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestRow {
    pub id: RowId,
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub amount: Money,
    pub description: String,
}

/// Body of `POST /imports/suggest`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub rows: Vec<SuggestRow>,
}

/// The classifier's answer for one row. Either field may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSuggestion {
    pub row_id: RowId,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub subscription_id: Option<SubscriptionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// Result of `POST /imports/suggest`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestResponse {
    #[serde(default)]
    pub suggestions: Vec<RowSuggestion>,
}
