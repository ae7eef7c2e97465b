//! Local copy of the backend's accounts, categories and subscriptions
//!
//! Refreshed by `accounts`/`parse`; used to resolve names typed on the
//! command line without a round trip.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};
use crate::models::{
    find_account, Account, AccountId, Category, CategoryId, Subscription, SubscriptionId,
};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Catalog {
    pub fn new(
        accounts: Vec<Account>,
        categories: Vec<Category>,
        subscriptions: Vec<Subscription>,
    ) -> Self {
        Self {
            accounts,
            categories,
            subscriptions,
            fetched_at: Some(Utc::now()),
        }
    }

    pub fn account_ids(&self) -> impl Iterator<Item = AccountId> + '_ {
        self.accounts.iter().filter(|a| !a.archived).map(|a| a.id)
    }

    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn subscription(&self, id: SubscriptionId) -> Option<&Subscription> {
        self.subscriptions.iter().find(|s| s.id == id)
    }

    /// Name, id or id prefix; a full UUID is accepted even when not cached
    pub fn resolve_account(&self, query: &str) -> ImportResult<AccountId> {
        if let Some(account) = find_account(&self.accounts, query) {
            return Ok(account.id);
        }
        query
            .trim()
            .parse::<AccountId>()
            .map_err(|_| ImportError::account_not_found(query))
    }

    pub fn resolve_category(&self, query: &str) -> ImportResult<CategoryId> {
        if let Some(category) = self
            .categories
            .iter()
            .find(|c| !c.archived && c.matches(query))
        {
            return Ok(category.id);
        }
        query
            .trim()
            .parse::<CategoryId>()
            .map_err(|_| ImportError::category_not_found(query))
    }

    pub fn resolve_subscription(&self, query: &str) -> ImportResult<SubscriptionId> {
        if let Some(subscription) = self.subscriptions.iter().find(|s| s.matches(query)) {
            return Ok(subscription.id);
        }
        query
            .trim()
            .parse::<SubscriptionId>()
            .map_err(|_| ImportError::NotFound {
                entity_type: "Subscription",
                identifier: query.to_string(),
            })
    }

    pub fn account_name(&self, id: AccountId) -> String {
        self.account(id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn category_name(&self, id: CategoryId) -> String {
        self.category(id)
            .map(|c| c.full_name())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn subscription_name(&self, id: SubscriptionId) -> String {
        self.subscription(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The cached catalog, empty if never fetched
    pub fn load(&self) -> ImportResult<Catalog> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    pub fn save(&self, catalog: &Catalog) -> ImportResult<()> {
        write_json_atomic(&self.path, catalog)
    }
}
