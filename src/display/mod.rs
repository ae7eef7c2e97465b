//! Display formatting for terminal output
//!
//! Tables for the audit rows and the cached catalog, plus the status block
//! shown after every wizard command.

pub mod catalog;
pub mod rows;
pub mod status;

pub use catalog::{format_account_list, format_category_tree, format_subscription_list};
pub use rows::{format_candidates, format_row_details, format_row_table};
pub use status::{format_files, format_history, format_status, format_summary};

/// Truncate to `max` characters, marking the cut with "..."
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
