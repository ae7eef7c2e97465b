//! Audit log of import activity
//!
//! Every state-changing wizard action appends an `AuditEntry` to a
//! line-delimited JSON file (`audit.log`). Row edits carry the row before and
//! after plus a field diff.
//!
//! ```rust,ignore
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log(&AuditEntry::row(ImportEvent::RowEdited, row.id).with_change(&before, &after))?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, ImportEvent, Subject};
pub use logger::AuditLogger;
