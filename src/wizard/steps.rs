//! Step controller for the import wizard
//!
//! Upload → MapAccounts → Parse → Audit (→ Submit in the review variant).
//! Forward transitions are gated on the data collected so far; requests to
//! the backend are guarded by in-flight flags so a parse, suggestion or
//! commit can never overlap with another of its kind.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};
use crate::models::{AccountId, ImportPreviewResponse};

/// Which flavour of wizard is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WizardVariant {
    /// Commit straight from the Audit step
    #[default]
    Standard,
    /// Audit is followed by a separate Submit review step
    WithReview,
}

impl fmt::Display for WizardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::WithReview => write!(f, "with review"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Upload,
    MapAccounts,
    Parse,
    Audit,
    Submit,
}

impl WizardStep {
    /// 1-based position for progress display
    pub fn number(&self) -> usize {
        match self {
            Self::Upload => 1,
            Self::MapAccounts => 2,
            Self::Parse => 3,
            Self::Audit => 4,
            Self::Submit => 5,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => write!(f, "Upload"),
            Self::MapAccounts => write!(f, "Map accounts"),
            Self::Parse => write!(f, "Parse"),
            Self::Audit => write!(f, "Audit"),
            Self::Submit => write!(f, "Submit"),
        }
    }
}

/// Kinds of backend request the wizard issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Parse,
    Suggest,
    Commit,
}

impl RequestKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Parse => "Parse",
            Self::Suggest => "Suggestion request",
            Self::Commit => "Commit",
        }
    }
}

/// A statement file collected in the Upload step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadFile {
    /// File name as sent to the parser; unique within one import
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub account_id: Option<AccountId>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            size,
            account_id: None,
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.account_id.is_some()
    }
}

/// Step state machine plus the server preview it gates on
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepController {
    #[serde(default)]
    variant: WizardVariant,
    #[serde(default)]
    step: WizardStep,
    #[serde(default)]
    files: Vec<UploadFile>,
    #[serde(default)]
    preview: Option<ImportPreviewResponse>,
    /// Set on entry to Parse, consumed by the first auto-parse trigger
    #[serde(default)]
    auto_parse_armed: bool,
    /// Banner text for the last failed request
    #[serde(default)]
    last_error: Option<String>,
    // In-flight guards are process-local and never persisted
    #[serde(skip)]
    parse_in_flight: bool,
    #[serde(skip)]
    suggest_in_flight: bool,
    #[serde(skip)]
    commit_in_flight: bool,
}

impl StepController {
    pub fn new(variant: WizardVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    pub fn variant(&self) -> WizardVariant {
        self.variant
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn files(&self) -> &[UploadFile] {
        &self.files
    }

    pub fn preview(&self) -> Option<&ImportPreviewResponse> {
        self.preview.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The step a commit is issued from
    pub fn commit_step(&self) -> WizardStep {
        match self.variant {
            WizardVariant::Standard => WizardStep::Audit,
            WizardVariant::WithReview => WizardStep::Submit,
        }
    }

    /// Files that still need an account
    pub fn unmapped_files(&self) -> impl Iterator<Item = &UploadFile> {
        self.files.iter().filter(|f| !f.is_mapped())
    }

    pub fn add_file(&mut self, file: UploadFile) -> ImportResult<()> {
        self.require_step(&[WizardStep::Upload], "Files can only be added in the Upload step")?;
        if self.files.iter().any(|f| f.name == file.name) {
            return Err(ImportError::Duplicate {
                entity_type: "File",
                identifier: file.name,
            });
        }
        self.files.push(file);
        Ok(())
    }

    pub fn remove_file(&mut self, name: &str) -> ImportResult<UploadFile> {
        self.require_step(
            &[WizardStep::Upload],
            "Files can only be removed in the Upload step",
        )?;
        let index = self
            .files
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| ImportError::file_not_found(name))?;
        Ok(self.files.remove(index))
    }

    pub fn assign_account(&mut self, name: &str, account_id: AccountId) -> ImportResult<()> {
        self.require_step(
            &[WizardStep::Upload, WizardStep::MapAccounts],
            "Accounts can only be mapped before parsing",
        )?;
        let file = self
            .files
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| ImportError::file_not_found(name))?;
        file.account_id = Some(account_id);
        Ok(())
    }

    /// Move forward one step if the current step's requirements are met
    ///
    /// Audit → Submit only checks the variant here; row-level readiness is
    /// checked by the wizard, which owns the commit form.
    pub fn advance(&mut self) -> ImportResult<WizardStep> {
        let next = match self.step {
            WizardStep::Upload => {
                if self.files.is_empty() {
                    return Err(ImportError::Step("add at least one file".into()));
                }
                WizardStep::MapAccounts
            }
            WizardStep::MapAccounts => {
                let unmapped: Vec<&str> = self.unmapped_files().map(|f| f.name.as_str()).collect();
                if !unmapped.is_empty() {
                    return Err(ImportError::Step(format!(
                        "map an account for: {}",
                        unmapped.join(", ")
                    )));
                }
                self.auto_parse_armed = true;
                WizardStep::Parse
            }
            WizardStep::Parse => {
                if self.parse_in_flight {
                    return Err(ImportError::InFlight(RequestKind::Parse.label()));
                }
                match &self.preview {
                    None => return Err(ImportError::Step("parse the files first".into())),
                    Some(preview) if !preview.is_clean() => {
                        return Err(ImportError::Step(format!(
                            "the preview has {} file error(s); fix the files and parse again",
                            preview.file_error_count()
                        )))
                    }
                    Some(_) => WizardStep::Audit,
                }
            }
            WizardStep::Audit => match self.variant {
                WizardVariant::WithReview => WizardStep::Submit,
                WizardVariant::Standard => {
                    return Err(ImportError::Step(
                        "Audit is the last step; commit from here".into(),
                    ))
                }
            },
            WizardStep::Submit => {
                return Err(ImportError::Step("Submit is the last step".into()));
            }
        };
        self.step = next;
        Ok(next)
    }

    /// Move back one step. Leaving Parse discards the fetched preview.
    pub fn back(&mut self) -> ImportResult<WizardStep> {
        if self.parse_in_flight || self.commit_in_flight {
            return Err(ImportError::Step(
                "wait for the running request to finish".into(),
            ));
        }
        let previous = match self.step {
            WizardStep::Upload => {
                return Err(ImportError::Step("already at the first step".into()));
            }
            WizardStep::MapAccounts => WizardStep::Upload,
            WizardStep::Parse => {
                self.preview = None;
                self.auto_parse_armed = false;
                self.last_error = None;
                WizardStep::MapAccounts
            }
            WizardStep::Audit => WizardStep::Parse,
            WizardStep::Submit => WizardStep::Audit,
        };
        self.step = previous;
        Ok(previous)
    }

    /// Returns true exactly once per entry into Parse while no preview exists
    pub fn take_auto_parse(&mut self) -> bool {
        let fire = self.step == WizardStep::Parse
            && self.auto_parse_armed
            && !self.parse_in_flight
            && self.preview.is_none();
        if fire {
            self.auto_parse_armed = false;
        }
        fire
    }

    pub fn is_in_flight(&self, kind: RequestKind) -> bool {
        match kind {
            RequestKind::Parse => self.parse_in_flight,
            RequestKind::Suggest => self.suggest_in_flight,
            RequestKind::Commit => self.commit_in_flight,
        }
    }

    /// Claim the in-flight slot for a request after checking its step
    pub fn begin_request(&mut self, kind: RequestKind) -> ImportResult<()> {
        let allowed: &[WizardStep] = match kind {
            RequestKind::Parse => &[WizardStep::Parse],
            RequestKind::Suggest => &[WizardStep::Audit],
            RequestKind::Commit => match self.variant {
                WizardVariant::Standard => &[WizardStep::Audit],
                WizardVariant::WithReview => &[WizardStep::Submit],
            },
        };
        self.require_step(allowed, &format!("{} is not available here", kind.label()))?;
        if self.is_in_flight(kind) {
            return Err(ImportError::InFlight(kind.label()));
        }
        if kind == RequestKind::Parse {
            self.auto_parse_armed = false;
        }
        *self.flag_mut(kind) = true;
        Ok(())
    }

    /// Release the in-flight slot, recording the failure banner if any
    pub fn end_request(&mut self, kind: RequestKind, error: Option<&ImportError>) {
        *self.flag_mut(kind) = false;
        self.last_error = error.map(|e| e.to_string());
    }

    /// Store a fresh preview. File-level errors become the banner.
    pub fn set_preview(&mut self, preview: ImportPreviewResponse) {
        if !preview.is_clean() {
            let mut problems: Vec<String> = Vec::new();
            for file in preview.files.iter().filter(|f| f.error_count > 0 || !f.errors.is_empty()) {
                let detail = if file.errors.is_empty() {
                    format!("{} error(s)", file.error_count)
                } else {
                    file.errors.join("; ")
                };
                problems.push(format!("{}: {}", file.file_name, detail));
            }
            self.last_error = Some(problems.join(" | "));
        }
        self.preview = Some(preview);
    }

    /// Start over, keeping the variant
    pub fn reset(&mut self) {
        *self = Self::new(self.variant);
    }

    fn flag_mut(&mut self, kind: RequestKind) -> &mut bool {
        match kind {
            RequestKind::Parse => &mut self.parse_in_flight,
            RequestKind::Suggest => &mut self.suggest_in_flight,
            RequestKind::Commit => &mut self.commit_in_flight,
        }
    }

    fn require_step(&self, allowed: &[WizardStep], message: &str) -> ImportResult<()> {
        if allowed.contains(&self.step) {
            Ok(())
        } else {
            Err(ImportError::Step(format!(
                "{} (current step: {})",
                message, self.step
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PreviewFile;

    fn controller_with_files(names: &[&str]) -> StepController {
        let mut controller = StepController::new(WizardVariant::Standard);
        for name in names {
            controller
                .add_file(UploadFile::new(*name, format!("/tmp/{}", name), 10))
                .unwrap();
        }
        controller
    }

    fn preview_for(controller: &StepController, errors: usize) -> ImportPreviewResponse {
        ImportPreviewResponse {
            files: controller
                .files()
                .iter()
                .map(|f| PreviewFile {
                    file_name: f.name.clone(),
                    account_id: f.account_id.unwrap(),
                    row_count: 0,
                    error_count: errors,
                    errors: vec![],
                })
                .collect(),
            rows: vec![],
        }
    }

    fn to_parse(controller: &mut StepController) {
        let names: Vec<String> = controller.files().iter().map(|f| f.name.clone()).collect();
        controller.advance().unwrap();
        for name in names {
            controller.assign_account(&name, AccountId::new()).unwrap();
        }
        assert_eq!(controller.advance().unwrap(), WizardStep::Parse);
    }

    #[test]
    fn test_upload_requires_a_file() {
        let mut controller = StepController::new(WizardVariant::Standard);
        assert!(controller.advance().unwrap_err().is_step());
        assert_eq!(controller.step(), WizardStep::Upload);
    }

    #[test]
    fn test_unmapped_file_blocks_mapping_step() {
        for mapped in 0..3 {
            let mut controller = controller_with_files(&["a.csv", "b.csv", "c.ofx"]);
            controller.advance().unwrap();
            for file in ["a.csv", "b.csv", "c.ofx"].iter().take(mapped) {
                controller.assign_account(file, AccountId::new()).unwrap();
            }
            let err = controller.advance().unwrap_err();
            assert!(err.is_step());
            assert_eq!(controller.step(), WizardStep::MapAccounts);
        }
    }

    #[test]
    fn test_duplicate_file_rejected() {
        let mut controller = controller_with_files(&["a.csv"]);
        let err = controller
            .add_file(UploadFile::new("a.csv", "/elsewhere/a.csv", 1))
            .unwrap_err();
        assert!(matches!(err, ImportError::Duplicate { .. }));
    }

    #[test]
    fn test_files_frozen_after_upload() {
        let mut controller = controller_with_files(&["a.csv"]);
        controller.advance().unwrap();
        assert!(controller
            .add_file(UploadFile::new("b.csv", "/tmp/b.csv", 1))
            .is_err());
        assert!(controller.remove_file("a.csv").is_err());
    }

    #[test]
    fn test_parse_requires_clean_preview() {
        let mut controller = controller_with_files(&["a.csv"]);
        to_parse(&mut controller);

        assert!(controller.advance().unwrap_err().is_step());

        let dirty = preview_for(&controller, 2);
        controller.set_preview(dirty);
        assert!(controller.last_error().unwrap().contains("a.csv"));
        assert!(controller.advance().is_err());

        let clean = preview_for(&controller, 0);
        controller.set_preview(clean);
        assert_eq!(controller.advance().unwrap(), WizardStep::Audit);
    }

    #[test]
    fn test_back_from_parse_resets_preview() {
        let mut controller = controller_with_files(&["a.csv"]);
        to_parse(&mut controller);
        let preview = preview_for(&controller, 0);
        controller.set_preview(preview);

        assert_eq!(controller.back().unwrap(), WizardStep::MapAccounts);
        assert!(controller.preview().is_none());
    }

    #[test]
    fn test_back_from_audit_keeps_preview() {
        let mut controller = controller_with_files(&["a.csv"]);
        to_parse(&mut controller);
        let preview = preview_for(&controller, 0);
        controller.set_preview(preview);
        controller.advance().unwrap();

        assert_eq!(controller.back().unwrap(), WizardStep::Parse);
        assert!(controller.preview().is_some());
    }

    #[test]
    fn test_auto_parse_fires_once() {
        let mut controller = controller_with_files(&["a.csv"]);
        assert!(!controller.take_auto_parse());
        to_parse(&mut controller);

        assert!(controller.take_auto_parse());
        assert!(!controller.take_auto_parse());

        // Leaving and re-entering Parse re-arms the trigger
        controller.back().unwrap();
        controller.advance().unwrap();
        assert!(controller.take_auto_parse());
    }

    #[test]
    fn test_in_flight_guard() {
        let mut controller = controller_with_files(&["a.csv"]);
        to_parse(&mut controller);

        controller.begin_request(RequestKind::Parse).unwrap();
        assert!(matches!(
            controller.begin_request(RequestKind::Parse),
            Err(ImportError::InFlight(_))
        ));
        assert!(!controller.take_auto_parse());
        assert!(controller.back().is_err());

        let failure = ImportError::Network("connection refused".into());
        controller.end_request(RequestKind::Parse, Some(&failure));
        assert_eq!(controller.step(), WizardStep::Parse);
        assert!(controller.last_error().unwrap().contains("connection refused"));

        controller.begin_request(RequestKind::Parse).unwrap();
        controller.end_request(RequestKind::Parse, None);
        assert!(controller.last_error().is_none());
    }

    #[test]
    fn test_commit_step_depends_on_variant() {
        let mut controller = StepController::new(WizardVariant::WithReview);
        controller
            .add_file(UploadFile::new("a.csv", "/tmp/a.csv", 1))
            .unwrap();
        to_parse(&mut controller);
        let preview = preview_for(&controller, 0);
        controller.set_preview(preview);
        controller.advance().unwrap();

        assert!(controller.begin_request(RequestKind::Commit).is_err());
        assert_eq!(controller.advance().unwrap(), WizardStep::Submit);
        controller.begin_request(RequestKind::Commit).unwrap();
    }

    #[test]
    fn test_in_flight_flags_not_persisted() {
        let mut controller = controller_with_files(&["a.csv"]);
        to_parse(&mut controller);
        controller.begin_request(RequestKind::Parse).unwrap();

        let json = serde_json::to_string(&controller).unwrap();
        let restored: StepController = serde_json::from_str(&json).unwrap();
        assert!(!restored.is_in_flight(RequestKind::Parse));
        assert_eq!(restored.step(), WizardStep::Parse);
    }
}
