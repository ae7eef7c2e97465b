//! Path management for ledger-import
//!
//! ## Path Resolution Order
//!
//! 1. `LEDGER_IMPORT_DATA_DIR` environment variable (if set)
//! 2. The platform config directory reported by `directories`
//!    (`~/.config/ledger-import` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::ImportError;

/// Manages all paths used by ledger-import
#[derive(Debug, Clone)]
pub struct ImportPaths {
    base_dir: PathBuf,
}

impl ImportPaths {
    /// Create a new ImportPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, ImportError> {
        let base_dir = if let Ok(custom) = std::env::var("LEDGER_IMPORT_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("", "", "ledger-import")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    ImportError::Config("Could not determine a configuration directory".into())
                })?
        };

        Ok(Self { base_dir })
    }

    /// Create ImportPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (drafts live here)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the default export directory
    pub fn export_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path to the in-progress import draft
    pub fn draft_file(&self) -> PathBuf {
        self.data_dir().join("import-draft.json")
    }

    /// Get the path to the cached account/category/subscription catalog
    pub fn catalog_file(&self) -> PathBuf {
        self.data_dir().join("catalog.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), ImportError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| ImportError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| ImportError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.export_dir())
            .map_err(|e| ImportError::Io(format!("Failed to create export directory: {}", e)))?;

        Ok(())
    }

    /// Check if ledger-import has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}
