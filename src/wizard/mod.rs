//! The import wizard
//!
//! `ImportWizard` ties the step controller, the commit form and the
//! reimbursement links together and enforces the rules that span them.
//! It is the unit persisted as the import draft.

pub mod form;
pub mod reimbursement;
pub mod steps;
pub mod suggestions;
pub mod summary;

pub use form::{CommitForm, FormRow, RowEdit, RowField};
pub use reimbursement::{ReimbursementLink, ReimbursementState};
pub use steps::{RequestKind, StepController, UploadFile, WizardStep, WizardVariant};
pub use suggestions::{merge_suggestions, suggestion_request, MergeReport};
pub use summary::{summarize, FileBadge, ImportSummary};

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ImportError, ImportResult};
use crate::models::{
    AccountId, CommitRequest, ImportPreviewResponse, Money, RowId, SuggestRequest,
    SuggestResponse,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportWizard {
    controller: StepController,
    #[serde(default)]
    form: Option<CommitForm>,
    #[serde(default)]
    reimbursements: ReimbursementState,
    /// Accounts a row may be posted to
    #[serde(default)]
    known_accounts: BTreeSet<AccountId>,
}

impl ImportWizard {
    pub fn new(variant: WizardVariant) -> Self {
        Self {
            controller: StepController::new(variant),
            ..Self::default()
        }
    }

    pub fn controller(&self) -> &StepController {
        &self.controller
    }

    pub fn step(&self) -> WizardStep {
        self.controller.step()
    }

    pub fn variant(&self) -> WizardVariant {
        self.controller.variant()
    }

    pub fn files(&self) -> &[UploadFile] {
        self.controller.files()
    }

    pub fn preview(&self) -> Option<&ImportPreviewResponse> {
        self.controller.preview()
    }

    pub fn form(&self) -> Option<&CommitForm> {
        self.form.as_ref()
    }

    pub fn reimbursements(&self) -> &ReimbursementState {
        &self.reimbursements
    }

    pub fn last_error(&self) -> Option<&str> {
        self.controller.last_error()
    }

    pub fn known_accounts(&self) -> &BTreeSet<AccountId> {
        &self.known_accounts
    }

    pub fn is_known_account(&self, id: AccountId) -> bool {
        self.known_accounts.contains(&id)
    }

    /// Register accounts from the server catalog
    pub fn remember_accounts(&mut self, ids: impl IntoIterator<Item = AccountId>) {
        self.known_accounts.extend(ids);
    }

    pub fn add_file(&mut self, file: UploadFile) -> ImportResult<()> {
        self.controller.add_file(file)
    }

    pub fn remove_file(&mut self, name: &str) -> ImportResult<UploadFile> {
        self.controller.remove_file(name)
    }

    pub fn assign_account(&mut self, file_name: &str, account_id: AccountId) -> ImportResult<()> {
        self.controller.assign_account(file_name, account_id)?;
        self.known_accounts.insert(account_id);
        Ok(())
    }

    pub fn advance(&mut self) -> ImportResult<WizardStep> {
        if self.step() == WizardStep::Audit && self.variant() == WizardVariant::WithReview {
            self.validate_accounts()?;
        }
        let step = self.controller.advance()?;
        if step == WizardStep::Audit && self.form.is_none() {
            if let Some(preview) = self.controller.preview() {
                self.form = Some(CommitForm::from_preview(preview));
            }
        }
        debug!(%step, "advanced");
        Ok(step)
    }

    /// Step back. Leaving Parse discards the preview together with the form.
    pub fn back(&mut self) -> ImportResult<WizardStep> {
        let leaving_parse = self.step() == WizardStep::Parse;
        let step = self.controller.back()?;
        if leaving_parse {
            self.form = None;
            self.reimbursements.clear();
        }
        debug!(%step, "went back");
        Ok(step)
    }

    pub fn take_auto_parse(&mut self) -> bool {
        self.controller.take_auto_parse()
    }

    pub fn is_in_flight(&self, kind: RequestKind) -> bool {
        self.controller.is_in_flight(kind)
    }

    /// Claim the parse slot and hand back the files to send
    pub fn begin_parse(&mut self) -> ImportResult<Vec<UploadFile>> {
        self.controller.begin_request(RequestKind::Parse)?;
        Ok(self.controller.files().to_vec())
    }

    /// Store the preview; a clean preview seeds the form and moves to Audit
    pub fn complete_parse(&mut self, preview: ImportPreviewResponse) -> ImportResult<WizardStep> {
        self.controller.end_request(RequestKind::Parse, None);
        let clean = preview.is_clean();
        self.controller.set_preview(preview);
        if !clean {
            return Ok(self.step());
        }
        self.form = self.controller.preview().map(CommitForm::from_preview);
        self.reimbursements.clear();
        self.controller.advance()
    }

    pub fn fail_parse(&mut self, error: &ImportError) {
        self.controller.end_request(RequestKind::Parse, Some(error));
    }

    /// Claim the suggestion slot and build the request
    pub fn begin_suggest(&mut self) -> ImportResult<SuggestRequest> {
        let request = suggestion_request(self.require_form()?);
        if request.rows.is_empty() {
            return Err(ImportError::Step("no rows need suggestions".into()));
        }
        self.controller.begin_request(RequestKind::Suggest)?;
        Ok(request)
    }

    pub fn complete_suggest(&mut self, response: &SuggestResponse) -> ImportResult<MergeReport> {
        self.controller.end_request(RequestKind::Suggest, None);
        let form = self
            .form
            .as_mut()
            .ok_or_else(|| ImportError::Step("there are no rows to update".into()))?;
        Ok(merge_suggestions(form, &response.suggestions))
    }

    pub fn fail_suggest(&mut self, error: &ImportError) {
        self.controller.end_request(RequestKind::Suggest, Some(error));
    }

    /// Claim the commit slot and assemble the payload
    pub fn begin_commit(&mut self) -> ImportResult<CommitRequest> {
        self.validate_accounts()?;
        self.controller.begin_request(RequestKind::Commit)?;
        self.payload()
    }

    /// The batch is persisted: start over, keeping the variant and accounts
    pub fn complete_commit(&mut self) {
        self.controller.end_request(RequestKind::Commit, None);
        self.controller.reset();
        self.form = None;
        self.reimbursements.clear();
    }

    /// Commit failed: everything stays as it was
    pub fn fail_commit(&mut self, error: &ImportError) {
        self.controller.end_request(RequestKind::Commit, Some(error));
    }

    /// Current commit payload, with linked rows pointing at their expense
    pub fn payload(&self) -> ImportResult<CommitRequest> {
        let mut request = self.require_form()?.to_payload();
        for row in request.rows.iter_mut() {
            row.reimburses = self.reimbursements.source_of(row.id);
        }
        Ok(request)
    }

    pub fn resolve_row(&self, query: &str) -> ImportResult<RowId> {
        self.require_form()?.resolve(query)
    }

    pub fn edit_row(&mut self, id: RowId, edit: RowEdit) -> ImportResult<()> {
        self.require_audit("Rows can only be edited in the Audit step")?;
        if let RowEdit::Account(account) = &edit {
            if !self.is_known_account(*account) {
                return Err(ImportError::account_not_found(account.to_string()));
            }
        }

        let linked_to = self.reimbursements.source_of(id);
        let is_source = self.reimbursements.is_source(id);
        let form = self
            .form
            .as_mut()
            .ok_or_else(|| ImportError::Step("there are no rows to edit".into()))?;

        let locked = matches!(edit, RowEdit::Amount(_) | RowEdit::Delete(_));
        if let (true, Some(source)) = (locked, linked_to) {
            return Err(ImportError::Validation(format!(
                "row {} reimburses row {}; unlink it first",
                id, source
            )));
        }
        if is_source && edit == RowEdit::Delete(true) {
            return Err(ImportError::Validation(format!(
                "row {} has reimbursements linked; unlink them first",
                id
            )));
        }

        match edit {
            RowEdit::Amount(amount) if is_source => {
                let mut links = self.reimbursements.clone();
                links.rebase_source(form, id, amount)?;
                form.apply_edit(id, RowEdit::Amount(amount))?;
                self.reimbursements = links;
                Ok(())
            }
            edit => form.apply_edit(id, edit),
        }
    }

    pub fn split_row(&mut self, id: RowId, parts: &[Money]) -> ImportResult<Vec<RowId>> {
        self.require_audit("Rows can only be split in the Audit step")?;
        if self.reimbursements.is_source(id) || self.reimbursements.source_of(id).is_some() {
            return Err(ImportError::Validation(format!(
                "row {} is part of a reimbursement link; unlink it first",
                id
            )));
        }
        let form = self
            .form
            .as_mut()
            .ok_or_else(|| ImportError::Step("there are no rows to split".into()))?;
        form.split_row(id, parts)
    }

    pub fn unsplit_row(&mut self, id: RowId) -> ImportResult<usize> {
        self.require_audit("Splits can only be undone in the Audit step")?;
        let form = self
            .form
            .as_mut()
            .ok_or_else(|| ImportError::Step("there are no rows to unsplit".into()))?;
        let parent = form.split_parent(id)?;
        let linked = form.split_parts(parent).into_iter().any(|part| {
            self.reimbursements.is_source(part) || self.reimbursements.source_of(part).is_some()
        });
        if linked {
            return Err(ImportError::Validation(format!(
                "a part of row {} is part of a reimbursement link; unlink it first",
                parent
            )));
        }
        form.unsplit_row(parent)
    }

    pub fn candidates(&self, source: RowId) -> ImportResult<Vec<&FormRow>> {
        self.reimbursements.candidates(self.require_form()?, source)
    }

    pub fn link(&mut self, source: RowId, selection: &[RowId]) -> ImportResult<Money> {
        self.require_audit("Reimbursements can only be linked in the Audit step")?;
        let form = self
            .form
            .as_mut()
            .ok_or_else(|| ImportError::Step("there are no rows to link".into()))?;
        self.reimbursements.link(form, source, selection)
    }

    pub fn unlink(&mut self, source: RowId, rows: &[RowId]) -> ImportResult<Money> {
        self.require_audit("Reimbursements can only be unlinked in the Audit step")?;
        let form = self
            .form
            .as_mut()
            .ok_or_else(|| ImportError::Step("there are no rows to unlink".into()))?;
        let mut amount = form.row(source)?.amount;
        for row in rows {
            amount = self.reimbursements.unlink(form, source, *row)?;
        }
        Ok(amount)
    }

    pub fn unlink_all(&mut self, source: RowId) -> ImportResult<Money> {
        self.require_audit("Reimbursements can only be unlinked in the Audit step")?;
        let form = self
            .form
            .as_mut()
            .ok_or_else(|| ImportError::Step("there are no rows to unlink".into()))?;
        self.reimbursements.unlink_all(form, source)
    }

    pub fn summary(&self) -> ImportSummary {
        summarize(self.preview(), self.form(), &self.reimbursements)
    }

    /// Drop the import, keeping the variant and known accounts
    pub fn reset(&mut self) {
        self.controller.reset();
        self.form = None;
        self.reimbursements.clear();
    }

    fn validate_accounts(&self) -> ImportResult<()> {
        let known: HashSet<AccountId> = self.known_accounts.iter().copied().collect();
        self.require_form()?.validate(&known)
    }

    fn require_form(&self) -> ImportResult<&CommitForm> {
        self.form
            .as_ref()
            .ok_or_else(|| ImportError::Step("parse the files first".into()))
    }

    fn require_audit(&self, message: &str) -> ImportResult<()> {
        if self.step() == WizardStep::Audit {
            Ok(())
        } else {
            Err(ImportError::Step(format!(
                "{} (current step: {})",
                message,
                self.step()
            )))
        }
    }
}
