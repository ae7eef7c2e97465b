//! Category and subscription models
//!
//! Both are backend-owned lookups. Import rows reference them by id; the CLI
//! resolves user input against these catalogs.

use serde::{Deserialize, Serialize};

use super::ids::{CategoryId, SubscriptionId};
use super::money::Money;

/// A spending or income category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,

    /// Parent group name (e.g., "Bills")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(default)]
    pub archived: bool,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            group: None,
            archived: false,
        }
    }

    /// Display name including the group, e.g. "Bills: Electric"
    pub fn full_name(&self) -> String {
        match &self.group {
            Some(group) => format!("{}: {}", group, self.name),
            None => self.name.clone(),
        }
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.name.eq_ignore_ascii_case(query)
            || self.full_name().eq_ignore_ascii_case(query)
            || query.parse::<CategoryId>().map(|id| id == self.id).unwrap_or(false)
            || (query.len() >= 4 && self.id.matches_prefix(query))
    }
}

/// A recurring charge the backend tracks (streaming, gym, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub name: String,

    /// Expected charge per period
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
}

impl Subscription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SubscriptionId::new(),
            name: name.into(),
            amount: None,
        }
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.name.eq_ignore_ascii_case(query)
            || query.parse::<SubscriptionId>().map(|id| id == self.id).unwrap_or(false)
            || (query.len() >= 4 && self.id.matches_prefix(query))
    }
}
