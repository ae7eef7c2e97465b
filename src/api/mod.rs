//! Backend API
//!
//! The wizard never talks HTTP directly; it goes through [`ImportApi`] so the
//! session can be driven against a scripted fake in tests.

pub mod http;

pub use http::HttpImportApi;

use std::collections::BTreeMap;

use crate::error::{ImportError, ImportResult};
use crate::models::{
    Account, AccountId, Category, CommitRequest, CommitResponse, ImportPreviewResponse,
    Subscription, SuggestRequest, SuggestResponse,
};
use crate::wizard::UploadFile;

/// A statement file ready to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl StatementFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read an uploaded file from disk
    pub fn read(upload: &UploadFile) -> ImportResult<Self> {
        let bytes = std::fs::read(&upload.path).map_err(|e| {
            ImportError::Io(format!("Failed to read {}: {}", upload.path.display(), e))
        })?;
        Ok(Self::new(upload.name.clone(), bytes))
    }
}

/// File name → account id, sent alongside the files
pub type AccountMapping = BTreeMap<String, AccountId>;

/// Build the mapping for a set of uploads. Every file must be mapped.
pub fn account_mapping(files: &[UploadFile]) -> ImportResult<AccountMapping> {
    files
        .iter()
        .map(|f| {
            f.account_id
                .map(|id| (f.name.clone(), id))
                .ok_or_else(|| ImportError::Step(format!("map an account for: {}", f.name)))
        })
        .collect()
}

/// The finance backend as the import wizard sees it
pub trait ImportApi {
    fn accounts(&self) -> ImportResult<Vec<Account>>;

    fn categories(&self) -> ImportResult<Vec<Category>>;

    fn subscriptions(&self) -> ImportResult<Vec<Subscription>>;

    /// Parse statement files into preview rows
    fn preview(
        &self,
        files: &[StatementFile],
        mapping: &AccountMapping,
    ) -> ImportResult<ImportPreviewResponse>;

    /// Ask the classifier for categories and subscriptions
    fn suggest(&self, request: &SuggestRequest) -> ImportResult<SuggestResponse>;

    /// Persist the audited rows
    fn commit(&self, request: &CommitRequest) -> ImportResult<CommitResponse>;
}
