//! Import session
//!
//! Drives an [`ImportWizard`] against the backend: reads statement files,
//! issues parse/suggest/commit requests through the in-flight guards, writes
//! every state change to the audit log and persists the draft after each
//! operation.

use std::path::Path;

use tracing::{info, warn};

use crate::api::{account_mapping, ImportApi, StatementFile};
use crate::audit::{AuditEntry, ImportEvent};
use crate::config::Settings;
use crate::error::{ImportError, ImportResult};
use crate::models::{CommitResponse, ImportPreviewResponse, Money, RowId};
use crate::storage::{Catalog, Storage};
use crate::wizard::{ImportWizard, MergeReport, RowEdit, UploadFile, WizardStep};

/// What a parse produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub step: WizardStep,
    pub rows: usize,
    pub file_errors: usize,
    /// Result of the follow-up suggestion request, when one was made
    pub suggestions: Option<MergeReport>,
}

pub struct ImportSession<'a, A: ImportApi + ?Sized> {
    storage: &'a Storage,
    api: &'a A,
    settings: &'a Settings,
    wizard: ImportWizard,
}

impl<'a, A: ImportApi + ?Sized> ImportSession<'a, A> {
    /// Resume the saved draft, or start a new one with the configured variant
    pub fn open(storage: &'a Storage, api: &'a A, settings: &'a Settings) -> ImportResult<Self> {
        let wizard = match storage.draft.load()? {
            Some(wizard) => wizard,
            None => ImportWizard::new(settings.wizard_variant),
        };
        Ok(Self {
            storage,
            api,
            settings,
            wizard,
        })
    }

    pub fn wizard(&self) -> &ImportWizard {
        &self.wizard
    }

    pub fn catalog(&self) -> ImportResult<Catalog> {
        self.storage.catalog.load()
    }

    pub fn save(&self) -> ImportResult<()> {
        self.storage.draft.save(&self.wizard)
    }

    /// Throw away any draft and collect `paths` into a fresh import
    pub fn start<P: AsRef<Path>>(&mut self, paths: &[P]) -> ImportResult<usize> {
        let mut wizard = ImportWizard::new(self.settings.wizard_variant);
        wizard.remember_accounts(self.catalog()?.account_ids());
        self.wizard = wizard;
        self.storage.log(AuditEntry::import(ImportEvent::Reset).with_summary("new import"))?;
        for path in paths {
            self.push_file(path.as_ref())?;
        }
        self.save()?;
        Ok(self.wizard.files().len())
    }

    pub fn add_file(&mut self, path: &Path) -> ImportResult<UploadFile> {
        let file = self.push_file(path)?;
        self.save()?;
        Ok(file)
    }

    fn push_file(&mut self, path: &Path) -> ImportResult<UploadFile> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| ImportError::Io(format!("Cannot read {}: {}", path.display(), e)))?;
        if !metadata.is_file() {
            return Err(ImportError::Validation(format!(
                "{} is not a file",
                path.display()
            )));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ImportError::Validation(format!("{} has no file name", path.display())))?;

        let file = UploadFile::new(name, path, metadata.len());
        self.wizard.add_file(file.clone())?;
        self.storage.log(
            AuditEntry::file(ImportEvent::FileAdded, &file.name)
                .with_summary(format!("{} bytes", file.size)),
        )?;
        Ok(file)
    }

    pub fn remove_file(&mut self, name: &str) -> ImportResult<()> {
        self.wizard.remove_file(name)?;
        self.storage.log(AuditEntry::file(ImportEvent::FileRemoved, name))?;
        self.save()
    }

    /// Map a file to an account given by name, id or id prefix
    pub fn map_account(&mut self, file_name: &str, account: &str) -> ImportResult<()> {
        let catalog = self.catalog()?;
        let account_id = catalog.resolve_account(account)?;
        self.wizard.assign_account(file_name, account_id)?;
        self.storage.log(
            AuditEntry::file(ImportEvent::AccountMapped, file_name)
                .with_summary(catalog.account_name(account_id)),
        )?;
        self.save()
    }

    /// Fetch accounts, categories and subscriptions and cache them
    pub fn refresh_catalog(&mut self) -> ImportResult<Catalog> {
        let catalog = Catalog::new(
            self.api.accounts()?,
            self.api.categories()?,
            self.api.subscriptions()?,
        );
        self.storage.catalog.save(&catalog)?;
        self.wizard.remember_accounts(catalog.account_ids());
        self.save()?;
        Ok(catalog)
    }

    /// Move forward; entering Parse runs the automatic parse once
    ///
    /// A failed automatic parse leaves the wizard on Parse with the banner
    /// set rather than failing the step change.
    pub fn advance(&mut self) -> ImportResult<WizardStep> {
        let step = self.wizard.advance()?;
        self.log_step(step)?;
        self.save()?;

        if self.wizard.take_auto_parse() {
            if let Err(e) = self.parse() {
                warn!(error = %e, "automatic parse failed");
            }
        }
        Ok(self.wizard.step())
    }

    pub fn back(&mut self) -> ImportResult<WizardStep> {
        let step = self.wizard.back()?;
        self.log_step(step)?;
        self.save()?;
        Ok(step)
    }

    fn log_step(&self, step: WizardStep) -> ImportResult<()> {
        self.storage
            .log(AuditEntry::import(ImportEvent::StepChanged).with_summary(step.to_string()))
    }

    /// Upload the files for parsing
    pub fn parse(&mut self) -> ImportResult<ParseOutcome> {
        let uploads = self.wizard.begin_parse()?;
        let result = self.send_preview(&uploads);

        let preview = match result {
            Ok(preview) => preview,
            Err(e) => {
                self.wizard.fail_parse(&e);
                self.storage.log(
                    AuditEntry::import(ImportEvent::ParseFailed).with_summary(e.to_string()),
                )?;
                self.save()?;
                return Err(e);
            }
        };

        let rows = preview.rows.len();
        let file_errors = preview.file_error_count();
        let step = self.wizard.complete_parse(preview)?;
        info!(rows, file_errors, %step, "parsed statements");
        self.storage.log(
            AuditEntry::import(ImportEvent::Parsed)
                .with_summary(format!("{} rows, {} file errors", rows, file_errors)),
        )?;
        self.save()?;

        let suggestions = if step == WizardStep::Audit && self.settings.auto_suggest {
            self.request_suggestions_if_needed()
        } else {
            None
        };

        Ok(ParseOutcome {
            step,
            rows,
            file_errors,
            suggestions,
        })
    }

    fn send_preview(&self, uploads: &[UploadFile]) -> ImportResult<ImportPreviewResponse> {
        let mapping = account_mapping(uploads)?;
        let files = uploads
            .iter()
            .map(StatementFile::read)
            .collect::<ImportResult<Vec<_>>>()?;
        self.api.preview(&files, &mapping)
    }

    fn request_suggestions_if_needed(&mut self) -> Option<MergeReport> {
        match self.request_suggestions() {
            Ok(report) => Some(report),
            Err(ImportError::Step(_)) => None,
            Err(e) => {
                warn!(error = %e, "suggestion request failed");
                None
            }
        }
    }

    /// Ask for category/subscription suggestions and merge them
    pub fn request_suggestions(&mut self) -> ImportResult<MergeReport> {
        let request = self.wizard.begin_suggest()?;
        let report = match self.api.suggest(&request) {
            Ok(response) => self.wizard.complete_suggest(&response)?,
            Err(e) => {
                self.wizard.fail_suggest(&e);
                self.save()?;
                return Err(e);
            }
        };
        self.storage.log(AuditEntry::import(ImportEvent::SuggestionsMerged).with_summary(
            format!(
                "{} applied, {} kept user edits, {} flagged rows skipped",
                report.applied, report.skipped_dirty, report.skipped_flagged
            ),
        ))?;
        self.save()?;
        Ok(report)
    }

    pub fn resolve_row(&self, query: &str) -> ImportResult<RowId> {
        self.wizard.resolve_row(query)
    }

    pub fn edit(&mut self, row: RowId, edits: Vec<RowEdit>) -> ImportResult<()> {
        let form = self
            .wizard
            .form()
            .ok_or_else(|| ImportError::Step("parse the files first".into()))?;
        let before = form.row(row)?.clone();

        let mut applied = Ok(());
        for edit in edits {
            applied = self.wizard.edit_row(row, edit);
            if applied.is_err() {
                break;
            }
        }

        // Earlier edits in the batch stay applied, so record what changed either way
        if let Some(after) = self.wizard.form().and_then(|f| f.row(row).ok()) {
            if *after != before {
                self.storage
                    .log(AuditEntry::row(ImportEvent::RowEdited, row).with_change(&before, after))?;
                self.save()?;
            }
        }
        applied
    }

    pub fn split(&mut self, row: RowId, parts: &[Money]) -> ImportResult<Vec<RowId>> {
        let ids = self.wizard.split_row(row, parts)?;
        let amounts: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
        self.storage.log(
            AuditEntry::row(ImportEvent::RowSplit, row).with_summary(amounts.join(" + ")),
        )?;
        self.save()?;
        Ok(ids)
    }

    pub fn unsplit(&mut self, row: RowId) -> ImportResult<usize> {
        let removed = self.wizard.unsplit_row(row)?;
        self.storage.log(
            AuditEntry::row(ImportEvent::RowUnsplit, row)
                .with_summary(format!("{} parts removed", removed)),
        )?;
        self.save()?;
        Ok(removed)
    }

    /// Link reimbursements to an expense, replacing the previous selection
    pub fn link(&mut self, source: RowId, selection: &[RowId]) -> ImportResult<Money> {
        let amount = self.wizard.link(source, selection)?;
        let ids: Vec<String> = selection.iter().map(|id| id.to_string()).collect();
        self.storage.log(
            AuditEntry::row(ImportEvent::ReimbursementLinked, source)
                .with_summary(format!("{} -> {}", ids.join(", "), amount)),
        )?;
        self.save()?;
        Ok(amount)
    }

    /// Unlink the given rows, or every linked row when `rows` is empty
    pub fn unlink(&mut self, source: RowId, rows: &[RowId]) -> ImportResult<Money> {
        let amount = if rows.is_empty() {
            self.wizard.unlink_all(source)?
        } else {
            self.wizard.unlink(source, rows)?
        };
        self.storage.log(
            AuditEntry::row(ImportEvent::ReimbursementUnlinked, source)
                .with_summary(amount.to_string()),
        )?;
        self.save()?;
        Ok(amount)
    }

    /// Post the audited rows. A failure keeps every edit and link.
    pub fn commit(&mut self) -> ImportResult<CommitResponse> {
        let request = self.wizard.begin_commit()?;
        match self.api.commit(&request) {
            Ok(response) => {
                self.wizard.complete_commit();
                info!(
                    created = response.created,
                    skipped = response.skipped,
                    removed = response.removed,
                    "import committed"
                );
                // The batch is posted; the stale draft must go before anything else can fail
                if let Err(e) = self.storage.draft.discard() {
                    warn!(error = %e, "could not discard the draft; saving the reset wizard");
                    self.save()?;
                }
                let entry = AuditEntry::import(ImportEvent::Committed)
                    .with_after(&request)
                    .with_summary(format!(
                        "{} created, {} skipped, {} removed",
                        response.created, response.skipped, response.removed
                    ));
                if let Err(e) = self.storage.log(entry) {
                    warn!(error = %e, "could not record the commit in the audit log");
                }
                Ok(response)
            }
            Err(e) => {
                self.wizard.fail_commit(&e);
                self.storage.log(
                    AuditEntry::import(ImportEvent::CommitFailed).with_summary(e.to_string()),
                )?;
                self.save()?;
                Err(e)
            }
        }
    }

    /// Drop the current import
    pub fn reset(&mut self) -> ImportResult<()> {
        self.wizard.reset();
        self.storage.log(AuditEntry::import(ImportEvent::Reset))?;
        self.storage.draft.discard()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use chrono::NaiveDate;
    use tempfile::TempDir;

    use crate::api::AccountMapping;
    use crate::config::paths::ImportPaths;
    use crate::models::{
        Account, AccountId, AccountType, Category, CategoryId, CommitRequest,
        ImportPreviewResponse, PreviewFile, PreviewRow, RowSuggestion, Subscription,
        SuggestRequest, SuggestResponse,
    };
    use crate::wizard::{RequestKind, WizardVariant};

    /// Backend double that replays scripted responses and records requests
    #[derive(Default)]
    struct ScriptedApi {
        accounts: Vec<Account>,
        previews: RefCell<VecDeque<ImportResult<ImportPreviewResponse>>>,
        suggestions: RefCell<VecDeque<ImportResult<SuggestResponse>>>,
        commits: RefCell<VecDeque<ImportResult<CommitResponse>>>,
        uploaded: RefCell<Vec<(Vec<String>, AccountMapping)>>,
        committed: RefCell<Vec<CommitRequest>>,
    }

    impl ImportApi for ScriptedApi {
        fn accounts(&self) -> ImportResult<Vec<Account>> {
            Ok(self.accounts.clone())
        }

        fn categories(&self) -> ImportResult<Vec<Category>> {
            Ok(vec![Category::new("Groceries")])
        }

        fn subscriptions(&self) -> ImportResult<Vec<Subscription>> {
            Ok(vec![])
        }

        fn preview(
            &self,
            files: &[StatementFile],
            mapping: &AccountMapping,
        ) -> ImportResult<ImportPreviewResponse> {
            self.uploaded.borrow_mut().push((
                files.iter().map(|f| f.name.clone()).collect(),
                mapping.clone(),
            ));
            self.previews
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ImportError::Network("no scripted preview".into())))
        }

        fn suggest(&self, _request: &SuggestRequest) -> ImportResult<SuggestResponse> {
            self.suggestions
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(SuggestResponse::default()))
        }

        fn commit(&self, request: &CommitRequest) -> ImportResult<CommitResponse> {
            self.committed.borrow_mut().push(request.clone());
            self.commits
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ImportError::Network("no scripted commit".into())))
        }
    }

    struct Fixture {
        temp_dir: TempDir,
        storage: Storage,
        settings: Settings,
        checking: Account,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let paths = ImportPaths::with_base_dir(temp_dir.path().join("home"));
            let storage = Storage::new(paths).unwrap();
            let settings = Settings {
                auto_suggest: false,
                ..Settings::default()
            };
            Self {
                temp_dir,
                storage,
                settings,
                checking: Account::new("Checking", AccountType::Checking),
            }
        }

        fn api(&self) -> ScriptedApi {
            ScriptedApi {
                accounts: vec![self.checking.clone()],
                ..ScriptedApi::default()
            }
        }

        fn statement(&self, name: &str) -> std::path::PathBuf {
            let path = self.temp_dir.path().join(name);
            std::fs::write(&path, "date,amount,description\n").unwrap();
            path
        }

        fn preview(&self, amounts: &[i64]) -> ImportPreviewResponse {
            ImportPreviewResponse {
                files: vec![PreviewFile {
                    file_name: "march.csv".into(),
                    account_id: self.checking.id,
                    row_count: amounts.len(),
                    error_count: 0,
                    errors: vec![],
                }],
                rows: amounts
                    .iter()
                    .enumerate()
                    .map(|(i, cents)| PreviewRow {
                        id: RowId::new(),
                        file_name: "march.csv".into(),
                        account_id: self.checking.id,
                        date: NaiveDate::from_ymd_opt(2025, 3, 1 + i as u32).unwrap(),
                        amount: Money::from_cents(*cents),
                        description: format!("Statement line {}", i + 1),
                        suggested_category_id: None,
                        suggested_subscription_id: None,
                        is_tax_event: false,
                    })
                    .collect(),
            }
        }
    }

    /// Start, map to Checking and advance into Parse (which auto-parses)
    fn session_to_parse<'a>(
        fixture: &'a Fixture,
        api: &'a ScriptedApi,
    ) -> ImportSession<'a, ScriptedApi> {
        let mut session = ImportSession::open(&fixture.storage, api, &fixture.settings).unwrap();
        session.refresh_catalog().unwrap();
        session.start(&[fixture.statement("march.csv")]).unwrap();
        session.advance().unwrap();
        session.map_account("march.csv", "checking").unwrap();
        session.advance().unwrap();
        session
    }

    #[test]
    fn test_auto_parse_on_entering_parse() {
        let fixture = Fixture::new();
        let api = fixture.api();
        api.previews
            .borrow_mut()
            .push_back(Ok(fixture.preview(&[-2500, 1000])));

        let session = session_to_parse(&fixture, &api);

        assert_eq!(session.wizard().step(), WizardStep::Audit);
        assert_eq!(session.wizard().form().unwrap().len(), 2);
        let uploaded = api.uploaded.borrow();
        assert_eq!(uploaded.len(), 1);
        assert_eq!(uploaded[0].0, vec!["march.csv".to_string()]);
        assert_eq!(uploaded[0].1.get("march.csv"), Some(&fixture.checking.id));
    }

    #[test]
    fn test_failed_parse_stays_on_parse_and_retries() {
        let fixture = Fixture::new();
        let api = fixture.api();
        api.previews.borrow_mut().push_back(Err(ImportError::Api {
            status: 502,
            message: "parser unavailable".into(),
        }));

        let mut session = session_to_parse(&fixture, &api);
        assert_eq!(session.wizard().step(), WizardStep::Parse);
        assert!(session
            .wizard()
            .last_error()
            .unwrap()
            .contains("parser unavailable"));
        assert!(!session.wizard().is_in_flight(RequestKind::Parse));

        api.previews
            .borrow_mut()
            .push_back(Ok(fixture.preview(&[-2500])));
        let outcome = session.parse().unwrap();
        assert_eq!(outcome.step, WizardStep::Audit);
        assert_eq!(outcome.rows, 1);
        assert!(session.wizard().last_error().is_none());
    }

    #[test]
    fn test_parse_with_file_errors_blocks_audit() {
        let fixture = Fixture::new();
        let api = fixture.api();
        let mut preview = fixture.preview(&[-2500]);
        preview.files[0].error_count = 3;
        api.previews.borrow_mut().push_back(Ok(preview));

        let mut session = session_to_parse(&fixture, &api);
        assert_eq!(session.wizard().step(), WizardStep::Parse);
        assert!(session.advance().unwrap_err().is_step());
    }

    #[test]
    fn test_auto_suggest_after_parse() {
        let mut fixture = Fixture::new();
        fixture.settings.auto_suggest = true;
        let api = fixture.api();
        let preview = fixture.preview(&[-2500]);
        let row_id = preview.rows[0].id;
        let category = CategoryId::new();
        api.previews.borrow_mut().push_back(Ok(preview));
        api.suggestions
            .borrow_mut()
            .push_back(Ok(SuggestResponse {
                suggestions: vec![RowSuggestion {
                    row_id,
                    category_id: Some(category),
                    subscription_id: None,
                    confidence: Some(0.8),
                }],
            }));

        let session = session_to_parse(&fixture, &api);
        let form = session.wizard().form().unwrap();
        assert_eq!(form.row(row_id).unwrap().category_id, Some(category));
    }

    #[test]
    fn test_edit_link_and_commit() {
        let fixture = Fixture::new();
        let api = fixture.api();
        api.previews
            .borrow_mut()
            .push_back(Ok(fixture.preview(&[-10000, 4000, -1500])));
        api.commits.borrow_mut().push_back(Ok(CommitResponse {
            created: 2,
            skipped: 1,
            removed: 0,
        }));

        let mut session = session_to_parse(&fixture, &api);
        let expense = session.resolve_row("1").unwrap();
        let refund = session.resolve_row("2").unwrap();
        let coffee = session.resolve_row("3").unwrap();

        session
            .edit(coffee, vec![RowEdit::Description("Coffee".into())])
            .unwrap();
        assert_eq!(session.link(expense, &[refund]).unwrap().cents(), -6000);

        let response = session.commit().unwrap();
        assert_eq!(response.created, 2);

        let committed = api.committed.borrow();
        let rows = &committed[0].rows;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].amount.cents(), -6000);
        assert!(rows[1].delete);
        assert_eq!(rows[1].reimburses, Some(expense));
        assert_eq!(rows[2].description, "Coffee");

        assert_eq!(session.wizard().step(), WizardStep::Upload);
        assert!(!fixture.storage.draft.exists());

        let events: Vec<ImportEvent> = fixture
            .storage
            .audit()
            .read_all()
            .unwrap()
            .iter()
            .map(|e| e.event)
            .collect();
        assert!(events.contains(&ImportEvent::RowEdited));
        assert!(events.contains(&ImportEvent::ReimbursementLinked));
        assert_eq!(events.last(), Some(&ImportEvent::Committed));
    }

    #[test]
    fn test_failed_commit_keeps_draft() {
        let fixture = Fixture::new();
        let api = fixture.api();
        api.previews
            .borrow_mut()
            .push_back(Ok(fixture.preview(&[-10000, 4000])));
        api.commits.borrow_mut().push_back(Err(ImportError::Api {
            status: 409,
            message: "duplicate transactions".into(),
        }));

        let mut session = session_to_parse(&fixture, &api);
        let expense = session.resolve_row("1").unwrap();
        let refund = session.resolve_row("2").unwrap();
        session.link(expense, &[refund]).unwrap();

        assert!(session.commit().unwrap_err().is_api());

        let reopened = ImportSession::open(&fixture.storage, &api, &fixture.settings).unwrap();
        let wizard = reopened.wizard();
        assert_eq!(wizard.step(), WizardStep::Audit);
        assert!(wizard.last_error().unwrap().contains("duplicate"));
        assert_eq!(wizard.reimbursements().source_of(refund), Some(expense));
        assert_eq!(
            wizard.form().unwrap().row(expense).unwrap().amount.cents(),
            -6000
        );
    }

    #[test]
    fn test_commit_succeeds_when_audit_log_is_unwritable() {
        let fixture = Fixture::new();
        let api = fixture.api();
        api.previews
            .borrow_mut()
            .push_back(Ok(fixture.preview(&[-2500])));
        api.commits.borrow_mut().push_back(Ok(CommitResponse {
            created: 1,
            skipped: 0,
            removed: 0,
        }));

        let mut session = session_to_parse(&fixture, &api);
        assert!(fixture.storage.draft.exists());

        // A directory where the log file should be makes every append fail
        let log_path = fixture.storage.audit().path().clone();
        let _ = std::fs::remove_file(&log_path);
        std::fs::create_dir_all(&log_path).unwrap();

        let response = session.commit().unwrap();
        assert_eq!(response.created, 1);
        assert_eq!(api.committed.borrow().len(), 1);
        assert_eq!(session.wizard().step(), WizardStep::Upload);
        assert!(!fixture.storage.draft.exists());

        let reopened = ImportSession::open(&fixture.storage, &api, &fixture.settings).unwrap();
        assert_eq!(reopened.wizard().step(), WizardStep::Upload);
        assert!(reopened.wizard().form().is_none());
    }

    #[test]
    fn test_failed_batch_edit_records_partial_change() {
        let fixture = Fixture::new();
        let api = fixture.api();
        api.previews
            .borrow_mut()
            .push_back(Ok(fixture.preview(&[-2500])));

        let mut session = session_to_parse(&fixture, &api);
        let row = session.resolve_row("1").unwrap();
        let err = session
            .edit(
                row,
                vec![
                    RowEdit::TaxEvent(true),
                    RowEdit::Account(AccountId::new()),
                ],
            )
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(session.wizard().form().unwrap().row(row).unwrap().tax_event);

        let last = fixture.storage.audit().read_recent(1).unwrap();
        assert_eq!(last[0].event, ImportEvent::RowEdited);
        assert!(last[0].summary.as_deref().unwrap().contains("tax_event"));
    }

    #[test]
    fn test_reset_discards_draft() {
        let fixture = Fixture::new();
        let api = fixture.api();
        let mut session = ImportSession::open(&fixture.storage, &api, &fixture.settings).unwrap();
        session.start(&[fixture.statement("april.csv")]).unwrap();
        assert!(fixture.storage.draft.exists());

        session.reset().unwrap();
        assert!(!fixture.storage.draft.exists());
        assert!(session.wizard().files().is_empty());
        assert_eq!(session.wizard().variant(), WizardVariant::Standard);
    }

    #[test]
    fn test_missing_file_rejected() {
        let fixture = Fixture::new();
        let api = fixture.api();
        let mut session = ImportSession::open(&fixture.storage, &api, &fixture.settings).unwrap();
        let err = session
            .add_file(&fixture.temp_dir.path().join("nope.csv"))
            .unwrap_err();
        assert!(matches!(err, ImportError::Io(_)));
    }
}
