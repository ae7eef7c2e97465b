//! Audit row display formatting
//!
//! The row table is what the user edits against: positions and id prefixes
//! printed here are what `edit`, `split` and `link` accept.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use super::truncate;
use crate::storage::Catalog;
use crate::wizard::{CommitForm, FormRow, ReimbursementState, RowField};

#[derive(Tabled)]
struct RowLine {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Subscription")]
    subscription: String,
    #[tabled(rename = "Flags")]
    flags: String,
}

fn row_flags(row: &FormRow, reimbursements: &ReimbursementState) -> String {
    let mut flags = Vec::new();
    if row.tax_event {
        flags.push("tax".to_string());
    }
    if row.consumed_by_split {
        flags.push("split".to_string());
    } else if row.delete {
        flags.push("deleted".to_string());
    }
    if row.split_from.is_some() {
        flags.push("part".to_string());
    }
    if let Some(link) = reimbursements.link_for(row.id) {
        flags.push(format!("reimbursed x{}", link.linked.len()));
    }
    if let Some(source) = reimbursements.source_of(row.id) {
        flags.push(format!("reimburses {}", source));
    }
    if row.dirty_fields().next().is_some() {
        flags.push("edited".to_string());
    }
    flags.join(", ")
}

/// Format the audit rows as a table
///
/// Deleted rows are hidden unless `include_deleted`; positions stay those of
/// the full form so they can be passed back to row commands.
pub fn format_row_table(
    form: &CommitForm,
    reimbursements: &ReimbursementState,
    catalog: &Catalog,
    include_deleted: bool,
) -> String {
    let lines: Vec<RowLine> = form
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| include_deleted || !row.delete)
        .map(|(i, row)| RowLine {
            position: i + 1,
            id: row.id.to_string(),
            date: row.date.format("%Y-%m-%d").to_string(),
            account: truncate(&catalog.account_name(row.account_id), 18),
            description: truncate(&row.description, 32),
            amount: row.amount.to_string(),
            category: row
                .category_id
                .map(|id| truncate(&catalog.category_name(id), 24))
                .unwrap_or_default(),
            subscription: row
                .subscription_id
                .map(|id| truncate(&catalog.subscription_name(id), 16))
                .unwrap_or_default(),
            flags: row_flags(row, reimbursements),
        })
        .collect();

    if lines.is_empty() {
        return "No rows to show.".to_string();
    }

    let mut table = Table::new(lines);
    table
        .with(Style::psql())
        .with(Modify::new(Columns::single(5)).with(Alignment::right()));
    table.to_string()
}

/// Format one row with everything the table abbreviates
pub fn format_row_details(
    row: &FormRow,
    reimbursements: &ReimbursementState,
    catalog: &Catalog,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Row:          {} ({})\n", row.id, row.id.as_uuid()));
    output.push_str(&format!("File:         {}\n", row.file_name));
    output.push_str(&format!("Date:         {}\n", row.date.format("%Y-%m-%d")));
    output.push_str(&format!("Account:      {}\n", catalog.account_name(row.account_id)));
    output.push_str(&format!("Amount:       {}\n", row.amount));
    output.push_str(&format!("Description:  {}\n", row.description));

    match row.category_id {
        Some(id) => output.push_str(&format!("Category:     {}\n", catalog.category_name(id))),
        None => output.push_str("Category:     (uncategorized)\n"),
    }
    if let Some(id) = row.subscription_id {
        output.push_str(&format!("Subscription: {}\n", catalog.subscription_name(id)));
    }
    if row.tax_event {
        output.push_str("Tax event:    yes\n");
    }
    if row.consumed_by_split {
        output.push_str("Status:       replaced by split parts\n");
    } else if row.delete {
        output.push_str("Status:       deleted\n");
    }
    if let Some(parent) = row.split_from {
        output.push_str(&format!("Split from:   {}\n", parent));
    }

    if let Some(link) = reimbursements.link_for(row.id) {
        let linked_total = row.amount - link.original_amount;
        output.push_str(&format!(
            "Reimbursed:   {} of {} by {} row(s)\n",
            linked_total, link.original_amount, link.linked.len()
        ));
    }
    if let Some(source) = reimbursements.source_of(row.id) {
        output.push_str(&format!("Reimburses:   {}\n", source));
    }

    let edited: Vec<String> = row.dirty_fields().map(field_name).map(String::from).collect();
    if !edited.is_empty() {
        output.push_str(&format!("Edited:       {}\n", edited.join(", ")));
    }

    output
}

fn field_name(field: RowField) -> &'static str {
    match field {
        RowField::Account => "account",
        RowField::Date => "date",
        RowField::Amount => "amount",
        RowField::Description => "description",
        RowField::Category => "category",
        RowField::Subscription => "subscription",
        RowField::TaxEvent => "tax event",
        RowField::Delete => "delete",
    }
}

#[derive(Tabled)]
struct CandidateLine {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Linked")]
    linked: &'static str,
}

/// Format the rows that may be linked to `source`
pub fn format_candidates(
    source: &FormRow,
    candidates: &[&FormRow],
    reimbursements: &ReimbursementState,
) -> String {
    if candidates.is_empty() {
        return format!("No reimbursement candidates for {}.", source.id);
    }

    let lines: Vec<CandidateLine> = candidates
        .iter()
        .map(|row| CandidateLine {
            id: row.id.to_string(),
            date: row.date.format("%Y-%m-%d").to_string(),
            description: truncate(&row.description, 32),
            amount: row.amount.to_string(),
            linked: if reimbursements.source_of(row.id) == Some(source.id) {
                "yes"
            } else {
                ""
            },
        })
        .collect();

    let mut table = Table::new(lines);
    table.with(Style::psql());
    format!(
        "Candidates for {} ({} {}):\n{}",
        source.id, source.description, source.amount, table
    )
}
