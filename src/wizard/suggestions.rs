//! Merge asynchronous category/subscription suggestions into the form
//!
//! Later suggestions overwrite earlier ones, but never a field the user has
//! touched, and never on rows flagged as a tax event or marked for deletion.

use super::form::{CommitForm, RowField};
use crate::models::{RowSuggestion, SuggestRequest, SuggestRow};

/// What a merge did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Fields set from a suggestion
    pub applied: usize,
    /// Fields left alone because the user edited them
    pub skipped_dirty: usize,
    /// Rows left alone because they are tax events or deleted
    pub skipped_flagged: usize,
    /// Suggestions for rows the form doesn't have
    pub unknown_rows: usize,
}

impl MergeReport {
    pub fn is_noop(&self) -> bool {
        self.applied == 0
    }
}

/// Rows worth classifying: posting, not tax events, with at least one clean field
pub fn suggestion_request(form: &CommitForm) -> SuggestRequest {
    SuggestRequest {
        rows: form
            .rows()
            .iter()
            .filter(|r| r.is_posting() && !r.tax_event)
            .filter(|r| !r.is_dirty(RowField::Category) || !r.is_dirty(RowField::Subscription))
            .map(|r| SuggestRow {
                id: r.id,
                account_id: r.account_id,
                date: r.date,
                amount: r.amount,
                description: r.description.clone(),
            })
            .collect(),
    }
}

/// Apply suggestions without overriding user intent
pub fn merge_suggestions(form: &mut CommitForm, suggestions: &[RowSuggestion]) -> MergeReport {
    let mut report = MergeReport::default();

    for suggestion in suggestions {
        let Ok(row) = form.row_mut(suggestion.row_id) else {
            report.unknown_rows += 1;
            continue;
        };
        if row.tax_event || row.delete {
            report.skipped_flagged += 1;
            continue;
        }

        if let Some(category) = suggestion.category_id {
            if row.is_dirty(RowField::Category) {
                report.skipped_dirty += 1;
            } else {
                row.category_id = Some(category);
                report.applied += 1;
            }
        }
        if let Some(subscription) = suggestion.subscription_id {
            if row.is_dirty(RowField::Subscription) {
                report.skipped_dirty += 1;
            } else {
                row.subscription_id = Some(subscription);
                report.applied += 1;
            }
        }
    }

    tracing::debug!(
        applied = report.applied,
        skipped_dirty = report.skipped_dirty,
        skipped_flagged = report.skipped_flagged,
        unknown_rows = report.unknown_rows,
        "merged suggestions"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountId, CategoryId, RowId, SubscriptionId};
    use crate::wizard::form::tests::preview_with_amounts;
    use crate::wizard::form::RowEdit;

    fn suggestion(row_id: RowId, category: Option<CategoryId>) -> RowSuggestion {
        RowSuggestion {
            row_id,
            category_id: category,
            subscription_id: None,
            confidence: Some(0.9),
        }
    }

    fn form(amounts: &[i64]) -> CommitForm {
        CommitForm::from_preview(&preview_with_amounts(AccountId::new(), amounts))
    }

    #[test]
    fn test_applies_to_clean_rows() {
        let mut form = form(&[-1000, -2000]);
        let ids: Vec<RowId> = form.rows().iter().map(|r| r.id).collect();
        let groceries = CategoryId::new();
        let streaming = SubscriptionId::new();

        let report = merge_suggestions(
            &mut form,
            &[
                suggestion(ids[0], Some(groceries)),
                RowSuggestion {
                    row_id: ids[1],
                    category_id: None,
                    subscription_id: Some(streaming),
                    confidence: None,
                },
            ],
        );

        assert_eq!(report.applied, 2);
        assert_eq!(form.row(ids[0]).unwrap().category_id, Some(groceries));
        assert_eq!(form.row(ids[1]).unwrap().subscription_id, Some(streaming));
        // Suggestions don't count as user edits
        assert!(!form.row(ids[0]).unwrap().is_dirty(RowField::Category));
    }

    #[test]
    fn test_never_overwrites_user_edits() {
        let mut form = form(&[-1000]);
        let id = form.rows()[0].id;
        let chosen = CategoryId::new();
        form.apply_edit(id, RowEdit::Category(Some(chosen))).unwrap();

        for _ in 0..3 {
            let report = merge_suggestions(&mut form, &[suggestion(id, Some(CategoryId::new()))]);
            assert_eq!(report.skipped_dirty, 1);
            assert_eq!(form.row(id).unwrap().category_id, Some(chosen));
        }
    }

    #[test]
    fn test_user_clearing_a_field_counts_as_intent() {
        let mut form = form(&[-1000]);
        let id = form.rows()[0].id;
        form.apply_edit(id, RowEdit::Category(None)).unwrap();

        merge_suggestions(&mut form, &[suggestion(id, Some(CategoryId::new()))]);
        assert_eq!(form.row(id).unwrap().category_id, None);
    }

    #[test]
    fn test_skips_tax_events_and_deleted_rows() {
        let mut form = form(&[-1000, -2000, -3000]);
        let ids: Vec<RowId> = form.rows().iter().map(|r| r.id).collect();
        form.apply_edit(ids[0], RowEdit::TaxEvent(true)).unwrap();
        form.apply_edit(ids[1], RowEdit::Delete(true)).unwrap();

        let report = merge_suggestions(
            &mut form,
            &[
                suggestion(ids[0], Some(CategoryId::new())),
                suggestion(ids[1], Some(CategoryId::new())),
                suggestion(RowId::new(), Some(CategoryId::new())),
            ],
        );

        assert_eq!(report.skipped_flagged, 2);
        assert_eq!(report.unknown_rows, 1);
        assert!(report.is_noop());
        assert!(form.row(ids[0]).unwrap().category_id.is_none());
    }

    #[test]
    fn test_last_suggestion_wins() {
        let mut form = form(&[-1000]);
        let id = form.rows()[0].id;
        let first = CategoryId::new();
        let second = CategoryId::new();

        merge_suggestions(&mut form, &[suggestion(id, Some(first))]);
        merge_suggestions(&mut form, &[suggestion(id, Some(second))]);
        assert_eq!(form.row(id).unwrap().category_id, Some(second));
    }

    #[test]
    fn test_request_skips_fully_edited_rows() {
        let mut form = form(&[-1000, -2000, -3000]);
        let ids: Vec<RowId> = form.rows().iter().map(|r| r.id).collect();
        form.apply_edit(ids[0], RowEdit::Category(Some(CategoryId::new())))
            .unwrap();
        form.apply_edit(ids[0], RowEdit::Subscription(None)).unwrap();
        form.apply_edit(ids[1], RowEdit::Delete(true)).unwrap();

        let request = suggestion_request(&form);
        let requested: Vec<RowId> = request.rows.iter().map(|r| r.id).collect();
        assert_eq!(requested, vec![ids[2]]);
    }
}
