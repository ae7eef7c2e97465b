//! Wizard status display: progress, files, badges and the error banner

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::audit::AuditEntry;
use crate::storage::Catalog;
use crate::wizard::{ImportSummary, ImportWizard, RequestKind, UploadFile};

#[derive(Tabled)]
struct FileLine {
    #[tabled(rename = "File")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Account")]
    account: String,
}

fn format_size(bytes: u64) -> String {
    match bytes {
        0..=1023 => format!("{} B", bytes),
        1024..=1_048_575 => format!("{:.1} KB", bytes as f64 / 1024.0),
        _ => format!("{:.1} MB", bytes as f64 / 1_048_576.0),
    }
}

/// Format the uploaded files with their mapped accounts
pub fn format_files(files: &[UploadFile], catalog: &Catalog) -> String {
    if files.is_empty() {
        return "No files added.".to_string();
    }

    let lines: Vec<FileLine> = files
        .iter()
        .map(|f| FileLine {
            name: f.name.clone(),
            size: format_size(f.size),
            account: f
                .account_id
                .map(|id| catalog.account_name(id))
                .unwrap_or_else(|| "(unmapped)".to_string()),
        })
        .collect();

    let mut table = Table::new(lines);
    table.with(Style::psql());
    table.to_string()
}

/// Format the summary badges
pub fn format_summary(summary: &ImportSummary) -> String {
    let mut output = String::new();

    for badge in &summary.files {
        let errors = if badge.errors > 0 {
            format!(", {} error(s)", badge.errors)
        } else {
            String::new()
        };
        output.push_str(&format!("  {}: {} row(s){}\n", badge.file_name, badge.rows, errors));
    }

    if summary.total_rows == 0 {
        return output;
    }

    output.push_str(&format!(
        "Rows:         {} total, {} posting, {} deleted\n",
        summary.total_rows, summary.posting_rows, summary.deleted_rows
    ));
    if summary.uncategorized_rows > 0 {
        output.push_str(&format!("Uncategorized: {}\n", summary.uncategorized_rows));
    }
    if summary.split_rows > 0 {
        output.push_str(&format!("Split parts:  {}\n", summary.split_rows));
    }
    if summary.linked_reimbursements > 0 {
        output.push_str(&format!(
            "Reimbursements linked: {}\n",
            summary.linked_reimbursements
        ));
    }
    if summary.tax_events > 0 {
        output.push_str(&format!("Tax events:   {}\n", summary.tax_events));
    }
    output.push_str(&format!(
        "Inflow:       {}\nOutflow:      {}\nNet:          {}\n",
        summary.inflow, summary.outflow, summary.net_amount
    ));

    output
}

/// Format the full status block shown after wizard commands
pub fn format_status(wizard: &ImportWizard, catalog: &Catalog) -> String {
    let step = wizard.step();
    let total_steps = wizard.controller().commit_step().number();
    let mut output = format!(
        "Step {} of {}: {} ({} wizard)\n",
        step.number(),
        total_steps,
        step,
        wizard.variant()
    );

    for kind in [RequestKind::Parse, RequestKind::Suggest, RequestKind::Commit] {
        if wizard.is_in_flight(kind) {
            output.push_str(&format!("In progress: {:?}\n", kind));
        }
    }

    output.push('\n');
    output.push_str(&format_files(wizard.files(), catalog));
    output.push('\n');

    let summary = wizard.summary();
    if summary != ImportSummary::default() {
        output.push('\n');
        output.push_str(&format_summary(&summary));
    }

    if let Some(error) = wizard.last_error() {
        output.push_str(&format!("\nError: {}\n", error));
    }

    output
}

/// Format audit log entries, oldest first
pub fn format_history(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No import history.".to_string();
    }

    entries
        .iter()
        .map(|e| e.format_human_readable())
        .collect::<Vec<_>>()
        .join("\n")
}
