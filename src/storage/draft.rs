//! The in-progress import, persisted between invocations

use std::path::PathBuf;

use tracing::debug;

use crate::error::ImportResult;
use crate::wizard::ImportWizard;

use super::file_io::{read_json, remove_if_exists, write_json_atomic};

pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> ImportResult<Option<ImportWizard>> {
        read_json(&self.path)
    }

    pub fn save(&self, wizard: &ImportWizard) -> ImportResult<()> {
        write_json_atomic(&self.path, wizard)?;
        debug!(path = %self.path.display(), step = %wizard.step(), "saved draft");
        Ok(())
    }

    /// Delete the draft; returns whether there was one
    pub fn discard(&self) -> ImportResult<bool> {
        remove_if_exists(&self.path)
    }
}
