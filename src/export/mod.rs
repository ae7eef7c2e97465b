//! Export of the audited rows
//!
//! - CSV: one line per commit row, names resolved, for spreadsheets
//! - JSON / YAML: the rows plus the summary, with a schema version

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_rows_csv;
pub use json::{export_json, ImportExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_yaml;

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::ImportResult;
use crate::models::CommitRow;
use crate::storage::Catalog;
use crate::wizard::ImportWizard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
    Yaml,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// A commit row with ids resolved to names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub position: usize,
    pub id: String,
    pub date: String,
    pub account: String,
    pub description: String,
    /// Decimal amount, negative for expenses
    pub amount: String,
    pub category: String,
    pub subscription: String,
    pub tax_event: bool,
    pub delete: bool,
    pub split_from: String,
    pub reimburses: String,
}

impl ExportRow {
    fn from_commit_row(position: usize, row: &CommitRow, catalog: &Catalog) -> Self {
        Self {
            position,
            id: row.id.as_uuid().to_string(),
            date: row.date.format("%Y-%m-%d").to_string(),
            account: catalog.account_name(row.account_id),
            description: row.description.clone(),
            amount: row.amount.format_with_symbol(""),
            category: row
                .category_id
                .map(|id| catalog.category_name(id))
                .unwrap_or_default(),
            subscription: row
                .subscription_id
                .map(|id| catalog.subscription_name(id))
                .unwrap_or_default(),
            tax_event: row.tax_event,
            delete: row.delete,
            split_from: row.split_from.map(|id| id.as_uuid().to_string()).unwrap_or_default(),
            reimburses: row.reimburses.map(|id| id.as_uuid().to_string()).unwrap_or_default(),
        }
    }
}

/// The current payload as export rows, in commit order
pub fn export_rows(wizard: &ImportWizard, catalog: &Catalog) -> ImportResult<Vec<ExportRow>> {
    let payload = wizard.payload()?;
    Ok(payload
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| ExportRow::from_commit_row(i + 1, row, catalog))
        .collect())
}

/// Write the current import in `format`
pub fn export<W: Write>(
    format: ExportFormat,
    wizard: &ImportWizard,
    catalog: &Catalog,
    writer: &mut W,
) -> ImportResult<usize> {
    let rows = export_rows(wizard, catalog)?;
    let count = rows.len();
    match format {
        ExportFormat::Csv => export_rows_csv(&rows, writer)?,
        ExportFormat::Json => export_json(&ImportExport::new(wizard, rows), writer)?,
        ExportFormat::Yaml => export_yaml(&ImportExport::new(wizard, rows), writer)?,
    }
    Ok(count)
}
