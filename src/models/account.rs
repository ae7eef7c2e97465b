//! Account model
//!
//! Accounts are owned by the backend; the wizard only reads the catalog to map
//! statement files and to check that every committed row lands somewhere real.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::AccountId;

/// Type of financial account as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Checking,
    Savings,
    Credit,
    Cash,
    Investment,
    LineOfCredit,
    #[serde(other)]
    Other,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checking => write!(f, "Checking"),
            Self::Savings => write!(f, "Savings"),
            Self::Credit => write!(f, "Credit Card"),
            Self::Cash => write!(f, "Cash"),
            Self::Investment => write!(f, "Investment"),
            Self::LineOfCredit => write!(f, "Line of Credit"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A financial account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,

    /// Account name (e.g., "Chase Checking")
    pub name: String,

    #[serde(rename = "type", default)]
    pub account_type: AccountType,

    /// ISO currency code, when the backend tracks one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Archived accounts can't receive imports
    #[serde(default)]
    pub archived: bool,
}

impl Account {
    pub fn new(name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id: AccountId::new(),
            name: name.into(),
            account_type,
            currency: None,
            archived: false,
        }
    }

    /// Match a user-supplied reference: exact id, id prefix, or name (case-insensitive)
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.name.eq_ignore_ascii_case(query)
            || query.parse::<AccountId>().map(|id| id == self.id).unwrap_or(false)
            || (query.len() >= 4 && self.id.matches_prefix(query))
    }
}

/// Find an active account in a catalog by name or id
pub fn find_account<'a>(accounts: &'a [Account], query: &str) -> Option<&'a Account> {
    accounts
        .iter()
        .filter(|a| !a.archived)
        .find(|a| a.matches(query))
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_name_and_id() {
        let checking = Account::new("Chase Checking", AccountType::Checking);
        let card = Account::new("Visa", AccountType::Credit);
        let accounts = vec![checking.clone(), card.clone()];

        assert_eq!(find_account(&accounts, "chase checking"), Some(&checking));
        assert_eq!(
            find_account(&accounts, &card.id.as_uuid().to_string()),
            Some(&card)
        );
        assert_eq!(find_account(&accounts, &card.id.to_string()), Some(&card));
        assert!(find_account(&accounts, "Savings").is_none());
    }

    #[test]
    fn test_archived_accounts_are_skipped() {
        let mut old = Account::new("Old", AccountType::Savings);
        old.archived = true;
        assert!(find_account(&[old], "Old").is_none());
    }

    #[test]
    fn test_unknown_type_deserializes_as_other() {
        let json = r#"{"id":"550e8400-e29b-41d4-a716-446655440000","name":"Broker","type":"crypto"}"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.account_type, AccountType::Other);
        assert!(!account.archived);
    }
}
