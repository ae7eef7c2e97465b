//! YAML export of the audited rows

use std::io::Write;

use crate::error::{ImportError, ImportResult};

use super::json::ImportExport;

pub fn export_yaml<W: Write>(export: &ImportExport, writer: &mut W) -> ImportResult<()> {
    writeln!(writer, "# ledger-import audit export")
        .and_then(|_| writeln!(writer, "# Generated: {}", export.exported_at))
        .and_then(|_| writeln!(writer))
        .map_err(|e| ImportError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, export).map_err(|e| ImportError::Export(e.to_string()))?;
    Ok(())
}
