//! Summary badges derived from the current wizard state

use serde::Serialize;

use super::form::CommitForm;
use super::reimbursement::ReimbursementState;
use crate::models::{ImportPreviewResponse, Money};

/// Per-file badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileBadge {
    pub file_name: String,
    pub rows: usize,
    pub errors: usize,
}

/// Counts shown above the audit table. Always recomputed, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub posting_rows: usize,
    pub deleted_rows: usize,
    pub uncategorized_rows: usize,
    pub tax_events: usize,
    pub linked_reimbursements: usize,
    pub split_rows: usize,
    pub inflow: Money,
    pub outflow: Money,
    pub net_amount: Money,
    pub files: Vec<FileBadge>,
}

pub fn summarize(
    preview: Option<&ImportPreviewResponse>,
    form: Option<&CommitForm>,
    reimbursements: &ReimbursementState,
) -> ImportSummary {
    let mut summary = ImportSummary {
        linked_reimbursements: reimbursements.linked_count(),
        ..ImportSummary::default()
    };

    if let Some(preview) = preview {
        summary.files = preview
            .files
            .iter()
            .map(|f| FileBadge {
                file_name: f.file_name.clone(),
                rows: f.row_count.max(preview.rows_for_file(&f.file_name).count()),
                errors: f.error_count.max(f.errors.len()),
            })
            .collect();
    }

    let Some(form) = form else {
        return summary;
    };

    summary.total_rows = form.len();
    for row in form.rows() {
        if row.split_from.is_some() {
            summary.split_rows += 1;
        }
        if row.tax_event {
            summary.tax_events += 1;
        }
        if row.delete {
            summary.deleted_rows += 1;
            continue;
        }
        summary.posting_rows += 1;
        if row.category_id.is_none() {
            summary.uncategorized_rows += 1;
        }
        if row.amount.is_negative() {
            summary.outflow += row.amount;
        } else {
            summary.inflow += row.amount;
        }
    }
    summary.net_amount = summary.inflow + summary.outflow;
    summary
}
