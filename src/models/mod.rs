//! Data models for the import workflow
//!
//! Catalog entries (accounts, categories, subscriptions) and the wire types
//! exchanged with the backend during preview, suggestion and commit.

pub mod account;
pub mod category;
pub mod commit;
pub mod ids;
pub mod money;
pub mod preview;
pub mod suggestion;

pub use account::{find_account, Account, AccountType};
pub use category::{Category, Subscription};
pub use commit::{CommitRequest, CommitResponse, CommitRow};
pub use ids::{AccountId, CategoryId, RowId, SubscriptionId};
pub use money::{Money, MoneyParseError};
pub use preview::{ImportPreviewResponse, PreviewFile, PreviewRow};
pub use suggestion::{RowSuggestion, SuggestRequest, SuggestResponse, SuggestRow};
