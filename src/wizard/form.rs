//! Commit form: the client-owned overlay on top of the server preview
//!
//! One `FormRow` per preview row. Every user edit marks its field dirty so
//! later suggestion merges can tell user intent from server guesses.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};
use crate::models::{
    AccountId, CategoryId, CommitRequest, CommitRow, ImportPreviewResponse, Money, PreviewRow,
    RowId, SubscriptionId,
};

/// Editable fields of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowField {
    Account,
    Date,
    Amount,
    Description,
    Category,
    Subscription,
    TaxEvent,
    Delete,
}

/// A single user edit
#[derive(Debug, Clone, PartialEq)]
pub enum RowEdit {
    Account(AccountId),
    Date(NaiveDate),
    Amount(Money),
    Description(String),
    Category(Option<CategoryId>),
    Subscription(Option<SubscriptionId>),
    TaxEvent(bool),
    Delete(bool),
}

impl RowEdit {
    pub fn field(&self) -> RowField {
        match self {
            Self::Account(_) => RowField::Account,
            Self::Date(_) => RowField::Date,
            Self::Amount(_) => RowField::Amount,
            Self::Description(_) => RowField::Description,
            Self::Category(_) => RowField::Category,
            Self::Subscription(_) => RowField::Subscription,
            Self::TaxEvent(_) => RowField::TaxEvent,
            Self::Delete(_) => RowField::Delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormRow {
    pub id: RowId,
    pub file_name: String,
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub amount: Money,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub subscription_id: Option<SubscriptionId>,
    pub tax_event: bool,
    pub delete: bool,
    /// Parent row, for rows created by a split
    #[serde(default)]
    pub split_from: Option<RowId>,
    /// The row was replaced by its split parts
    #[serde(default)]
    pub consumed_by_split: bool,
    #[serde(default)]
    dirty: BTreeSet<RowField>,
}

impl FormRow {
    fn from_preview(row: &PreviewRow) -> Self {
        Self {
            id: row.id,
            file_name: row.file_name.clone(),
            account_id: row.account_id,
            date: row.date,
            amount: row.amount,
            description: row.description.clone(),
            category_id: row.suggested_category_id,
            subscription_id: row.suggested_subscription_id,
            tax_event: row.is_tax_event,
            delete: false,
            split_from: None,
            consumed_by_split: false,
            dirty: BTreeSet::new(),
        }
    }

    pub fn is_dirty(&self, field: RowField) -> bool {
        self.dirty.contains(&field)
    }

    pub fn dirty_fields(&self) -> impl Iterator<Item = RowField> + '_ {
        self.dirty.iter().copied()
    }

    /// The row will produce a ledger entry
    pub fn is_posting(&self) -> bool {
        !self.delete
    }

    fn to_commit_row(&self) -> CommitRow {
        CommitRow {
            id: self.id,
            account_id: self.account_id,
            date: self.date,
            amount: self.amount,
            description: self.description.clone(),
            category_id: self.category_id,
            subscription_id: self.subscription_id,
            tax_event: self.tax_event,
            delete: self.delete,
            split_from: self.split_from,
            reimburses: None,
        }
    }
}

/// The editable rows of one import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitForm {
    rows: Vec<FormRow>,
}

impl CommitForm {
    /// Seed one clean row per preview row, pre-filled with server suggestions
    pub fn from_preview(preview: &ImportPreviewResponse) -> Self {
        Self {
            rows: preview.rows.iter().map(FormRow::from_preview).collect(),
        }
    }

    pub fn rows(&self) -> &[FormRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: RowId) -> ImportResult<&FormRow> {
        self.rows
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| ImportError::row_not_found(id.to_string()))
    }

    pub(crate) fn row_mut(&mut self, id: RowId) -> ImportResult<&mut FormRow> {
        self.rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ImportError::row_not_found(id.to_string()))
    }

    /// Resolve a 1-based position or a (prefix of a) row id
    pub fn resolve(&self, query: &str) -> ImportResult<RowId> {
        let query = query.trim();
        if let Ok(position) = query.parse::<usize>() {
            return position
                .checked_sub(1)
                .and_then(|i| self.rows.get(i))
                .map(|r| r.id)
                .ok_or_else(|| ImportError::row_not_found(query));
        }
        let mut matches = self.rows.iter().filter(|r| r.id.matches_prefix(query));
        match (matches.next(), matches.next()) {
            (Some(row), None) => Ok(row.id),
            (Some(_), Some(_)) => Err(ImportError::Validation(format!(
                "'{}' matches more than one row",
                query
            ))),
            _ => Err(ImportError::row_not_found(query)),
        }
    }

    /// Apply a user edit and mark the field dirty
    pub fn apply_edit(&mut self, id: RowId, edit: RowEdit) -> ImportResult<()> {
        let row = self.row_mut(id)?;
        if row.consumed_by_split {
            return Err(ImportError::Validation(format!(
                "row {} was split; edit its parts instead",
                id
            )));
        }
        if let RowEdit::Description(text) = &edit {
            if text.trim().is_empty() {
                return Err(ImportError::Validation("description cannot be empty".into()));
            }
        }
        row.dirty.insert(edit.field());
        match edit {
            RowEdit::Account(v) => row.account_id = v,
            RowEdit::Date(v) => row.date = v,
            RowEdit::Amount(v) => row.amount = v,
            RowEdit::Description(v) => row.description = v.trim().to_string(),
            RowEdit::Category(v) => row.category_id = v,
            RowEdit::Subscription(v) => row.subscription_id = v,
            RowEdit::TaxEvent(v) => row.tax_event = v,
            RowEdit::Delete(v) => row.delete = v,
        }
        Ok(())
    }

    /// Replace a row by parts whose amounts sum to the row's amount
    ///
    /// The parent stays in the form marked delete so the server sees it;
    /// the parts are inserted right after it. Returns the new row ids.
    pub fn split_row(&mut self, id: RowId, parts: &[Money]) -> ImportResult<Vec<RowId>> {
        let index = self
            .rows
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| ImportError::row_not_found(id.to_string()))?;
        let parent = &self.rows[index];

        if parent.consumed_by_split {
            return Err(ImportError::Validation(format!("row {} is already split", id)));
        }
        if parent.delete {
            return Err(ImportError::Validation(format!(
                "row {} is marked for deletion",
                id
            )));
        }
        if parts.len() < 2 {
            return Err(ImportError::Validation("a split needs at least two parts".into()));
        }
        if parts.iter().any(|p| p.is_zero()) {
            return Err(ImportError::Validation("split parts cannot be zero".into()));
        }
        let total = parts
            .iter()
            .try_fold(Money::zero(), |sum, part| sum.checked_add(*part))
            .ok_or_else(|| ImportError::Validation("split parts are too large to add up".into()))?;
        if total != parent.amount {
            return Err(ImportError::Validation(format!(
                "split parts add up to {} but the row amount is {}",
                total, parent.amount
            )));
        }

        let children: Vec<FormRow> = parts
            .iter()
            .map(|amount| {
                let mut dirty = BTreeSet::from([RowField::Amount]);
                dirty.extend(
                    parent
                        .dirty
                        .iter()
                        .copied()
                        .filter(|f| !matches!(f, RowField::Amount | RowField::Delete)),
                );
                FormRow {
                    id: RowId::new(),
                    amount: *amount,
                    delete: false,
                    split_from: Some(id),
                    consumed_by_split: false,
                    dirty,
                    ..parent.clone()
                }
            })
            .collect();
        let ids = children.iter().map(|c| c.id).collect();

        let parent = &mut self.rows[index];
        parent.delete = true;
        parent.consumed_by_split = true;
        self.rows.splice(index + 1..index + 1, children);
        Ok(ids)
    }

    /// The split row that `id` belongs to: itself when it was split,
    /// otherwise the row it was split from
    pub fn split_parent(&self, id: RowId) -> ImportResult<RowId> {
        let row = self.row(id)?;
        if row.consumed_by_split {
            return Ok(id);
        }
        row.split_from
            .ok_or_else(|| ImportError::Validation(format!("row {} is not split", id)))
    }

    /// Undo a split given the split row or one of its parts
    ///
    /// Drops every row split off the parent, including parts of parts, and
    /// restores the parent. Returns the number of rows removed.
    pub fn unsplit_row(&mut self, id: RowId) -> ImportResult<usize> {
        let parent_id = self.split_parent(id)?;
        let descendants: HashSet<RowId> = self.split_parts(parent_id).into_iter().collect();

        let parent = self.row_mut(parent_id)?;
        parent.consumed_by_split = false;
        parent.delete = false;
        let before = self.rows.len();
        self.rows.retain(|r| !descendants.contains(&r.id));
        Ok(before - self.rows.len())
    }

    /// Every row split off `id`, directly or through a split part
    pub fn split_parts(&self, id: RowId) -> Vec<RowId> {
        let mut found = Vec::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            for row in self.rows.iter().filter(|r| r.split_from == Some(current)) {
                found.push(row.id);
                pending.push(row.id);
            }
        }
        found
    }

    /// Rows whose account is not in `known`
    pub fn rows_with_unknown_account<'a>(
        &'a self,
        known: &'a HashSet<AccountId>,
    ) -> impl Iterator<Item = &'a FormRow> {
        self.rows.iter().filter(move |r| !known.contains(&r.account_id))
    }

    /// Every row must resolve to a known account
    pub fn validate(&self, known: &HashSet<AccountId>) -> ImportResult<()> {
        let bad: Vec<String> = self
            .rows_with_unknown_account(known)
            .map(|r| r.id.to_string())
            .collect();
        if bad.is_empty() {
            Ok(())
        } else {
            Err(ImportError::Validation(format!(
                "rows without a known account: {}",
                bad.join(", ")
            )))
        }
    }

    /// One commit row per form row, in order, `delete` as currently set
    pub fn to_payload(&self) -> CommitRequest {
        CommitRequest {
            rows: self.rows.iter().map(FormRow::to_commit_row).collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::PreviewFile;

    pub(crate) fn preview_with_amounts(account_id: AccountId, amounts: &[i64]) -> ImportPreviewResponse {
        ImportPreviewResponse {
            files: vec![PreviewFile {
                file_name: "march.csv".into(),
                account_id,
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
                    account_id,
                    date: NaiveDate::from_ymd_opt(2025, 3, 1 + i as u32).unwrap(),
                    amount: Money::from_cents(*cents),
                    description: format!("Row {}", i + 1),
                    suggested_category_id: None,
                    suggested_subscription_id: None,
                    is_tax_event: false,
                })
                .collect(),
        }
    }

    fn form(amounts: &[i64]) -> (AccountId, CommitForm) {
        let account = AccountId::new();
        (account, CommitForm::from_preview(&preview_with_amounts(account, amounts)))
    }

    #[test]
    fn test_seeded_rows_are_clean() {
        let account = AccountId::new();
        let mut preview = preview_with_amounts(account, &[-1000]);
        let category = CategoryId::new();
        preview.rows[0].suggested_category_id = Some(category);
        preview.rows[0].is_tax_event = true;

        let form = CommitForm::from_preview(&preview);
        let row = &form.rows()[0];
        assert_eq!(row.category_id, Some(category));
        assert!(row.tax_event);
        assert_eq!(row.dirty_fields().count(), 0);
    }

    #[test]
    fn test_edit_marks_dirty() {
        let (_, mut form) = form(&[-1000, 2000]);
        let id = form.rows()[0].id;
        form.apply_edit(id, RowEdit::Category(Some(CategoryId::new())))
            .unwrap();
        form.apply_edit(id, RowEdit::Amount(Money::from_cents(-900)))
            .unwrap();

        let row = form.row(id).unwrap();
        assert!(row.is_dirty(RowField::Category));
        assert!(row.is_dirty(RowField::Amount));
        assert!(!row.is_dirty(RowField::Subscription));
        assert_eq!(row.amount.cents(), -900);
    }

    #[test]
    fn test_empty_description_rejected() {
        let (_, mut form) = form(&[-1000]);
        let id = form.rows()[0].id;
        let err = form
            .apply_edit(id, RowEdit::Description("   ".into()))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(!form.row(id).unwrap().is_dirty(RowField::Description));
    }

    #[test]
    fn test_resolve_by_position_and_prefix() {
        let (_, form) = form(&[-1000, 2000]);
        let second = form.rows()[1].id;
        assert_eq!(form.resolve("2").unwrap(), second);
        assert_eq!(form.resolve(&second.to_string()).unwrap(), second);
        assert!(form.resolve("0").is_err());
        assert!(form.resolve("3").is_err());
    }

    #[test]
    fn test_split_row() {
        let (_, mut form) = form(&[-10000, 500]);
        let parent = form.rows()[0].id;
        let parts = form
            .split_row(parent, &[Money::from_cents(-7000), Money::from_cents(-3000)])
            .unwrap();

        assert_eq!(form.len(), 4);
        assert_eq!(form.rows()[1].id, parts[0]);
        assert_eq!(form.rows()[2].id, parts[1]);
        let parent_row = form.row(parent).unwrap();
        assert!(parent_row.delete);
        assert!(parent_row.consumed_by_split);
        assert_eq!(form.row(parts[1]).unwrap().split_from, Some(parent));
        assert!(form
            .apply_edit(parent, RowEdit::Delete(false))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_split_must_balance() {
        let (_, mut form) = form(&[-10000]);
        let parent = form.rows()[0].id;
        assert!(form
            .split_row(parent, &[Money::from_cents(-7000), Money::from_cents(-2000)])
            .is_err());
        assert!(form.split_row(parent, &[Money::from_cents(-10000)]).is_err());
        assert_eq!(form.len(), 1);
    }

    #[test]
    fn test_unsplit_restores_parent() {
        let (_, mut form) = form(&[-10000]);
        let parent = form.rows()[0].id;
        form.split_row(parent, &[Money::from_cents(-4000), Money::from_cents(-6000)])
            .unwrap();

        assert_eq!(form.unsplit_row(parent).unwrap(), 2);
        assert_eq!(form.len(), 1);
        assert!(!form.row(parent).unwrap().delete);
    }

    #[test]
    fn test_unsplit_drops_nested_parts() {
        let (_, mut form) = form(&[-10000]);
        let parent = form.rows()[0].id;
        let parts = form
            .split_row(parent, &[Money::from_cents(-6000), Money::from_cents(-4000)])
            .unwrap();
        let nested = form
            .split_row(parts[0], &[Money::from_cents(-1000), Money::from_cents(-5000)])
            .unwrap();
        assert_eq!(form.split_parts(parent).len(), 4);

        assert_eq!(form.unsplit_row(parent).unwrap(), 4);
        assert_eq!(form.len(), 1);
        assert!(form.row(nested[0]).is_err());

        let payload = form.to_payload();
        assert_eq!(payload.rows.len(), 1);
        assert_eq!(payload.rows[0].amount.cents(), -10000);
        assert!(!payload.rows[0].delete);
    }

    #[test]
    fn test_unsplit_by_part() {
        let (_, mut form) = form(&[-10000, 500]);
        let parent = form.rows()[0].id;
        let parts = form
            .split_row(parent, &[Money::from_cents(-2500), Money::from_cents(-7500)])
            .unwrap();

        assert_eq!(form.split_parent(parts[1]).unwrap(), parent);
        assert_eq!(form.unsplit_row(parts[1]).unwrap(), 2);
        assert!(!form.row(parent).unwrap().consumed_by_split);

        let unsplit = form.rows()[1].id;
        assert!(form.unsplit_row(unsplit).unwrap_err().is_validation());
    }

    #[test]
    fn test_split_parts_overflow_rejected() {
        let (_, mut form) = form(&[-10000]);
        let id = form.rows()[0].id;
        let big = Money::parse("92233720368547758.07").unwrap();

        let err = form.split_row(id, &[big, big]).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(form.len(), 1);
    }

    #[test]
    fn test_validate_unknown_account() {
        let (account, mut form) = form(&[-1000, 2000]);
        let known: HashSet<AccountId> = [account].into_iter().collect();
        form.validate(&known).unwrap();

        let id = form.rows()[1].id;
        form.apply_edit(id, RowEdit::Account(AccountId::new())).unwrap();
        assert!(form.validate(&known).unwrap_err().is_validation());
    }

    #[test]
    fn test_payload_has_one_entry_per_row() {
        let (_, mut form) = form(&[-1000, 2000, -300]);
        let deleted = form.rows()[1].id;
        form.apply_edit(deleted, RowEdit::Delete(true)).unwrap();

        let payload = form.to_payload();
        assert_eq!(payload.rows.len(), 3);
        let ids: Vec<RowId> = payload.rows.iter().map(|r| r.id).collect();
        let form_ids: Vec<RowId> = form.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, form_ids);
        assert!(payload.rows[1].delete);
        assert_eq!(payload.posting_rows().count(), 2);
    }
}
