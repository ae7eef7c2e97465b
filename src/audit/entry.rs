//! Audit entry data structures
//!
//! One entry per wizard event: what happened, to which file, row or import,
//! and for edits the row before and after.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::diff::generate_diff;

/// Things the wizard records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportEvent {
    FileAdded,
    FileRemoved,
    AccountMapped,
    StepChanged,
    Parsed,
    ParseFailed,
    SuggestionsMerged,
    RowEdited,
    RowSplit,
    RowUnsplit,
    ReimbursementLinked,
    ReimbursementUnlinked,
    Committed,
    CommitFailed,
    Reset,
}

impl std::fmt::Display for ImportEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ImportEvent::FileAdded => "FILE ADDED",
            ImportEvent::FileRemoved => "FILE REMOVED",
            ImportEvent::AccountMapped => "ACCOUNT MAPPED",
            ImportEvent::StepChanged => "STEP",
            ImportEvent::Parsed => "PARSED",
            ImportEvent::ParseFailed => "PARSE FAILED",
            ImportEvent::SuggestionsMerged => "SUGGESTIONS",
            ImportEvent::RowEdited => "EDIT",
            ImportEvent::RowSplit => "SPLIT",
            ImportEvent::RowUnsplit => "UNSPLIT",
            ImportEvent::ReimbursementLinked => "LINK",
            ImportEvent::ReimbursementUnlinked => "UNLINK",
            ImportEvent::Committed => "COMMIT",
            ImportEvent::CommitFailed => "COMMIT FAILED",
            ImportEvent::Reset => "RESET",
        };
        write!(f, "{}", label)
    }
}

/// What an event is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    /// The import as a whole
    Import,
    File,
    Row,
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subject::Import => write!(f, "Import"),
            Subject::File => write!(f, "File"),
            Subject::Row => write!(f, "Row"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,

    pub event: ImportEvent,

    pub subject: Subject,

    /// File name, row id, or empty for the import as a whole
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subject_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    /// Human-readable summary (diff for edits, counts for requests)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl AuditEntry {
    pub fn new(event: ImportEvent, subject: Subject, subject_id: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
            subject,
            subject_id: subject_id.into(),
            before: None,
            after: None,
            summary: None,
        }
    }

    /// An event about the import as a whole
    pub fn import(event: ImportEvent) -> Self {
        Self::new(event, Subject::Import, "")
    }

    pub fn file(event: ImportEvent, name: impl Into<String>) -> Self {
        Self::new(event, Subject::File, name)
    }

    pub fn row(event: ImportEvent, id: impl ToString) -> Self {
        Self::new(event, Subject::Row, id.to_string())
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_after<T: Serialize>(mut self, after: &T) -> Self {
        self.after = serde_json::to_value(after).ok();
        self
    }

    /// Record both states; the summary becomes their field diff
    pub fn with_change<T: Serialize>(mut self, before: &T, after: &T) -> Self {
        let before = serde_json::to_value(before).ok();
        let after = serde_json::to_value(after).ok();
        if let (Some(b), Some(a)) = (&before, &after) {
            self.summary = generate_diff(b, a);
        }
        self.before = before;
        self.after = after;
        self
    }

    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.event,
        );

        if !self.subject_id.is_empty() {
            output.push_str(&format!(" {} {}", self.subject, self.subject_id));
        }

        if let Some(summary) = &self.summary {
            output.push_str(&format!("\n  {}", summary));
        }

        output
    }
}
