//! Reimbursement linker
//!
//! A user can declare that incoming payments (a friend paying back half of a
//! dinner, an insurance refund) reimburse an expense row. The expense is
//! reduced by the linked total and the linked rows are marked for deletion so
//! they are not also posted as income.
//!
//! Amounts are signed: the source is negative, linked rows are positive, so
//! the reduced amount is `original + linked total`, which moves the expense
//! toward zero.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::form::{CommitForm, FormRow};
use crate::error::{ImportError, ImportResult};
use crate::models::{Money, RowId};

/// Link bookkeeping for one expense row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReimbursementLink {
    /// Source amount before any reimbursement was applied
    pub original_amount: Money,
    /// Linked row id → that row's delete flag before it was linked
    pub linked: BTreeMap<RowId, bool>,
}

impl ReimbursementLink {
    pub fn linked_ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.linked.keys().copied()
    }
}

/// All reimbursement links of one import, keyed by source row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReimbursementState {
    links: BTreeMap<RowId, ReimbursementLink>,
}

impl ReimbursementState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn link_for(&self, source: RowId) -> Option<&ReimbursementLink> {
        self.links.get(&source)
    }

    pub fn sources(&self) -> impl Iterator<Item = (RowId, &ReimbursementLink)> {
        self.links.iter().map(|(id, link)| (*id, link))
    }

    pub fn is_source(&self, row: RowId) -> bool {
        self.links.contains_key(&row)
    }

    /// The expense a row is currently linked to, if any
    pub fn source_of(&self, row: RowId) -> Option<RowId> {
        self.links
            .iter()
            .find(|(_, link)| link.linked.contains_key(&row))
            .map(|(source, _)| *source)
    }

    /// Number of rows currently linked as reimbursements
    pub fn linked_count(&self) -> usize {
        self.links.values().map(|l| l.linked.len()).sum()
    }

    /// Rows that may be offered as reimbursements for `source`
    ///
    /// Positive amount, not the source itself, not consumed by a split, not
    /// deleted by the user and not already linked to a different expense.
    pub fn candidates<'a>(
        &self,
        form: &'a CommitForm,
        source: RowId,
    ) -> ImportResult<Vec<&'a FormRow>> {
        form.row(source)?;
        Ok(form
            .rows()
            .iter()
            .filter(|row| self.is_candidate(row, source))
            .collect())
    }

    fn is_candidate(&self, row: &FormRow, source: RowId) -> bool {
        if row.id == source || row.consumed_by_split || !row.amount.is_positive() {
            return false;
        }
        if self.is_source(row.id) {
            return false;
        }
        match self.source_of(row.id) {
            Some(owner) => owner == source,
            None => !row.delete,
        }
    }

    /// Link exactly `selection` to `source`, replacing any earlier selection
    ///
    /// Returns the source row's new amount. Linking the same selection twice
    /// leaves the form unchanged. An empty selection removes the link.
    pub fn link(
        &mut self,
        form: &mut CommitForm,
        source: RowId,
        selection: &[RowId],
    ) -> ImportResult<Money> {
        let source_row = form.row(source)?;
        if source_row.consumed_by_split {
            return Err(ImportError::Validation(format!(
                "row {} was split; link one of its parts instead",
                source
            )));
        }
        if self.source_of(source).is_some() {
            return Err(ImportError::Validation(format!(
                "row {} is itself linked as a reimbursement",
                source
            )));
        }

        let original = self
            .links
            .get(&source)
            .map(|l| l.original_amount)
            .unwrap_or(source_row.amount);
        if !original.is_expense() {
            return Err(ImportError::Validation(format!(
                "only expenses can be reimbursed; row {} is {}",
                source, original
            )));
        }

        let chosen: BTreeSet<RowId> = selection.iter().copied().collect();
        if chosen.is_empty() {
            return self.unlink_all(form, source);
        }

        let mut total = Money::zero();
        for id in &chosen {
            let row = form.row(*id)?;
            if !self.is_candidate(row, source) {
                return Err(ImportError::Validation(format!(
                    "row {} can't reimburse row {}",
                    id, source
                )));
            }
            total += row.amount;
        }
        if total > original.abs() {
            return Err(ImportError::Validation(format!(
                "reimbursements of {} exceed the expense of {}",
                total,
                original.abs()
            )));
        }

        let previous = self
            .links
            .remove(&source)
            .map(|l| l.linked)
            .unwrap_or_default();

        // Rows dropped from the selection get their own delete flag back
        for (id, prior_delete) in &previous {
            if !chosen.contains(id) {
                form.row_mut(*id)?.delete = *prior_delete;
            }
        }

        let mut linked = BTreeMap::new();
        for id in chosen {
            let row = form.row_mut(id)?;
            let prior = previous.get(&id).copied().unwrap_or(row.delete);
            row.delete = true;
            linked.insert(id, prior);
        }

        let new_amount = original + total;
        form.row_mut(source)?.amount = new_amount;
        self.links.insert(
            source,
            ReimbursementLink {
                original_amount: original,
                linked,
            },
        );
        Ok(new_amount)
    }

    /// Remove one linked row. Unlinking a row that isn't linked is a no-op.
    pub fn unlink(&mut self, form: &mut CommitForm, source: RowId, row: RowId) -> ImportResult<Money> {
        let current = form.row(source)?.amount;
        let Some(link) = self.links.get(&source) else {
            return Ok(current);
        };
        if !link.linked.contains_key(&row) {
            return Ok(current);
        }
        let remaining: Vec<RowId> = link.linked_ids().filter(|id| *id != row).collect();
        self.link(form, source, &remaining)
    }

    /// Remove every link of `source`, restoring its original amount exactly
    pub fn unlink_all(&mut self, form: &mut CommitForm, source: RowId) -> ImportResult<Money> {
        form.row(source)?;
        let Some(link) = self.links.remove(&source) else {
            return Ok(form.row(source)?.amount);
        };
        for (id, prior_delete) in link.linked {
            form.row_mut(id)?.delete = prior_delete;
        }
        form.row_mut(source)?.amount = link.original_amount;
        Ok(link.original_amount)
    }

    /// The user typed a new amount for a linked source: keep the typed value
    /// on screen and move the original so unlinking stays consistent.
    pub fn rebase_source(
        &mut self,
        form: &CommitForm,
        source: RowId,
        new_amount: Money,
    ) -> ImportResult<()> {
        let Some(link) = self.links.get_mut(&source) else {
            return Ok(());
        };
        let total: Money = link
            .linked
            .keys()
            .map(|id| form.row(*id).map(|r| r.amount))
            .sum::<ImportResult<Money>>()?;
        let original = new_amount - total;
        if !original.is_expense() || new_amount.is_positive() {
            return Err(ImportError::Validation(format!(
                "row {} has {} of reimbursements linked; its amount can't become {}",
                source, total, new_amount
            )));
        }
        link.original_amount = original;
        Ok(())
    }

    /// Forget every link without touching the form (used when the form is rebuilt)
    pub fn clear(&mut self) {
        self.links.clear();
    }
}
