//! JSON export of the audited rows, with schema versioning

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};
use crate::wizard::{ImportSummary, ImportWizard};

use super::ExportRow;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize)]
pub struct ImportExport {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    pub app_version: String,
    pub files: Vec<String>,
    pub summary: ImportSummary,
    pub rows: Vec<ExportRow>,
}

impl ImportExport {
    pub fn new(wizard: &ImportWizard, rows: Vec<ExportRow>) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            files: wizard.files().iter().map(|f| f.name.clone()).collect(),
            summary: wizard.summary(),
            rows,
        }
    }
}

/// Shape accepted back when reading an export
#[derive(Debug, Clone, Deserialize)]
pub struct ExportedRows {
    pub schema_version: String,
    pub rows: Vec<ExportRow>,
}

pub fn export_json<W: Write>(export: &ImportExport, writer: &mut W) -> ImportResult<()> {
    serde_json::to_writer_pretty(&mut *writer, export)
        .map_err(|e| ImportError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| ImportError::Export(e.to_string()))?;
    Ok(())
}
