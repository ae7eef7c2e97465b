//! Storage layer for ledger-import
//!
//! JSON files with atomic writes: the import draft and the cached catalog.

pub mod catalog;
pub mod draft;
pub mod file_io;

pub use catalog::{Catalog, CatalogStore};
pub use draft::DraftStore;
pub use file_io::{read_json, write_json_atomic};

use crate::audit::{AuditEntry, AuditLogger};
use crate::config::paths::ImportPaths;
use crate::error::ImportResult;

/// Gives access to everything ledger-import keeps on disk
pub struct Storage {
    paths: ImportPaths,
    pub draft: DraftStore,
    pub catalog: CatalogStore,
    audit: AuditLogger,
}

impl Storage {
    pub fn new(paths: ImportPaths) -> ImportResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            draft: DraftStore::new(paths.draft_file()),
            catalog: CatalogStore::new(paths.catalog_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Whether `init` has written a settings file
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Append an entry to the audit log
    pub fn log(&self, entry: AuditEntry) -> ImportResult<()> {
        self.audit.log(&entry)
    }
}
