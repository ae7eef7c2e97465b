//! CSV export of the audited rows

use std::io::Write;

use crate::error::{ImportError, ImportResult};

use super::ExportRow;

pub fn export_rows_csv<W: Write>(rows: &[ExportRow], writer: &mut W) -> ImportResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer
            .serialize(row)
            .map_err(|e| ImportError::Export(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| ImportError::Export(e.to_string()))?;
    Ok(())
}
