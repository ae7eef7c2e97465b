//! Append-only audit log
//!
//! Each entry is one JSON line, flushed as soon as it is written.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::error::{ImportError, ImportResult};

use super::entry::{AuditEntry, ImportEvent};

pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    pub fn log(&self, entry: &AuditEntry) -> ImportResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| ImportError::Io(format!("Failed to open audit log: {}", e)))?;

        let json = serde_json::to_string(entry)
            .map_err(|e| ImportError::Json(format!("Failed to serialize audit entry: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| ImportError::Io(format!("Failed to write audit entry: {}", e)))?;

        file.flush()
            .map_err(|e| ImportError::Io(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// All entries, oldest first
    pub fn read_all(&self) -> ImportResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| ImportError::Io(format!("Failed to open audit log: {}", e)))?;

        let mut entries = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                ImportError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| {
                ImportError::Json(format!(
                    "Failed to parse audit entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            entries.push(entry);
        }

        Ok(entries)
    }

    /// The last `count` entries
    pub fn read_recent(&self, count: usize) -> ImportResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }

    /// The last `count` entries whose event is one of `events`
    pub fn read_events(
        &self,
        events: &[ImportEvent],
        count: usize,
    ) -> ImportResult<Vec<AuditEntry>> {
        let mut matching: Vec<AuditEntry> = self
            .read_all()?
            .into_iter()
            .filter(|entry| events.contains(&entry.event))
            .collect();
        let start = matching.len().saturating_sub(count);
        Ok(matching.split_off(start))
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::Subject;
    use tempfile::TempDir;

    fn create_test_logger() -> (AuditLogger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp_dir.path().join("audit.log"));
        (logger, temp_dir)
    }

    #[test]
    fn test_log_and_read() {
        let (logger, _temp) = create_test_logger();
        logger
            .log(&AuditEntry::file(ImportEvent::FileAdded, "march.csv"))
            .unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, ImportEvent::FileAdded);
        assert_eq!(entries[0].subject, Subject::File);
    }

    #[test]
    fn test_read_recent() {
        let (logger, _temp) = create_test_logger();
        for i in 0..10 {
            logger
                .log(&AuditEntry::file(ImportEvent::FileAdded, format!("{}.csv", i)))
                .unwrap();
        }

        let recent = logger.read_recent(3).unwrap();
        let names: Vec<&str> = recent.iter().map(|e| e.subject_id.as_str()).collect();
        assert_eq!(names, vec!["7.csv", "8.csv", "9.csv"]);
    }

    #[test]
    fn test_read_events_keeps_commit_outcomes() {
        let (logger, _temp) = create_test_logger();
        logger
            .log(&AuditEntry::file(ImportEvent::FileAdded, "march.csv"))
            .unwrap();
        logger
            .log(&AuditEntry::import(ImportEvent::CommitFailed).with_summary("409"))
            .unwrap();
        logger.log(&AuditEntry::import(ImportEvent::Reset)).unwrap();
        logger
            .log(&AuditEntry::import(ImportEvent::Committed).with_summary("3 created"))
            .unwrap();

        let commits = [ImportEvent::Committed, ImportEvent::CommitFailed];
        let all = logger.read_events(&commits, 10).unwrap();
        let events: Vec<ImportEvent> = all.iter().map(|e| e.event).collect();
        assert_eq!(events, vec![ImportEvent::CommitFailed, ImportEvent::Committed]);

        let last = logger.read_events(&commits, 1).unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].event, ImportEvent::Committed);

        assert!(logger
            .read_events(&[ImportEvent::RowSplit], 5)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_empty_log() {
        let (logger, _temp) = create_test_logger();
        assert!(logger.read_all().unwrap().is_empty());
        assert!(logger.read_recent(5).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_line_reported() {
        let (logger, _temp) = create_test_logger();
        logger.log(&AuditEntry::import(ImportEvent::Reset)).unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(logger.path())
            .and_then(|mut f| writeln!(f, "not json"))
            .unwrap();

        let err = logger.read_all().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
