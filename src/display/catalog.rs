//! Catalog display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Account, Category, Subscription};

#[derive(Tabled)]
struct AccountLine {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    account_type: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

/// Format the cached accounts as a table
pub fn format_account_list(accounts: &[Account]) -> String {
    if accounts.is_empty() {
        return "No accounts cached. Run 'ledger-import accounts' to fetch them.".to_string();
    }

    let lines: Vec<AccountLine> = accounts
        .iter()
        .map(|a| AccountLine {
            id: a.id.to_string(),
            name: a.name.clone(),
            account_type: a.account_type.to_string(),
            status: if a.archived { "Archived" } else { "" },
        })
        .collect();

    let mut table = Table::new(lines);
    table.with(Style::psql());
    table.to_string()
}

/// Format categories as a tree grouped by their parent group
pub fn format_category_tree(categories: &[Category]) -> String {
    let visible: Vec<&Category> = categories.iter().filter(|c| !c.archived).collect();
    if visible.is_empty() {
        return "No categories cached.".to_string();
    }

    let mut groups: Vec<(&str, Vec<&Category>)> = Vec::new();
    for category in visible {
        let group = category.group.as_deref().unwrap_or("(ungrouped)");
        match groups.iter_mut().find(|(name, _)| *name == group) {
            Some((_, members)) => members.push(category),
            None => groups.push((group, vec![category])),
        }
    }

    let mut output = String::new();
    for (i, (group, members)) in groups.iter().enumerate() {
        output.push_str(&format!("{}\n", group));
        for (j, category) in members.iter().enumerate() {
            let prefix = if j == members.len() - 1 { "└── " } else { "├── " };
            output.push_str(&format!("  {}{} ({})\n", prefix, category.name, category.id));
        }
        if i < groups.len() - 1 {
            output.push('\n');
        }
    }

    output
}

#[derive(Tabled)]
struct SubscriptionLine {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Expected")]
    amount: String,
}

pub fn format_subscription_list(subscriptions: &[Subscription]) -> String {
    if subscriptions.is_empty() {
        return "No subscriptions cached.".to_string();
    }

    let lines: Vec<SubscriptionLine> = subscriptions
        .iter()
        .map(|s| SubscriptionLine {
            id: s.id.to_string(),
            name: s.name.clone(),
            amount: s.amount.map(|m| m.to_string()).unwrap_or_default(),
        })
        .collect();

    let mut table = Table::new(lines);
    table.with(Style::psql());
    table.to_string()
}
