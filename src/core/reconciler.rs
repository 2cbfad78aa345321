//! Reconciled editable sub-resource collections.
//!
//! Owns the ordered list of rows backing an entity (payment installments and
//! the like), merging the authoritative server list with locally-pending and
//! mid-edit rows without losing either side, and performing per-row
//! edit/save/cancel/delete against the row gateway.

use std::collections::BTreeSet;

use crate::domain::{CollectionRow, FieldIssue, RowEditState};
use crate::errors::CollectionError;
use crate::storage::{RowGateway, ServerRow};

/// Shape of the rows managed by one reconciler.
#[derive(Debug, Clone)]
pub struct CollectionSpec {
    /// Every field a row carries, in display order.
    pub row_fields: Vec<String>,
    /// Numeric fields whose totals across all rows may not exceed `ceiling`.
    pub tracked_fields: Vec<String>,
    pub ceiling: f64,
    pub max_field_len: usize,
}

impl CollectionSpec {
    /// Spec for rows made up entirely of percentage quantities summing to at
    /// most 100 per field.
    pub fn percentages(fields: &[&str]) -> Self {
        let fields: Vec<String> = fields.iter().map(|field| field.to_string()).collect();
        Self {
            row_fields: fields.clone(),
            tracked_fields: fields,
            ceiling: 100.0,
            max_field_len: 16,
        }
    }
}

pub struct CollectionReconciler {
    spec: CollectionSpec,
    parent_id: Option<i64>,
    rows: Vec<CollectionRow>,
    gateway: Box<dyn RowGateway>,
}

impl CollectionReconciler {
    pub fn new(spec: CollectionSpec, gateway: Box<dyn RowGateway>) -> Self {
        Self {
            spec,
            parent_id: None,
            rows: Vec::new(),
            gateway,
        }
    }

    /// Binds the collection to the entity whose rows it manages.
    pub fn bind(&mut self, parent_id: i64) {
        self.parent_id = Some(parent_id);
    }

    pub fn rows(&self) -> &[CollectionRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&CollectionRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Current total of a tracked field across all rows, mid-edit values
    /// included.
    pub fn total(&self, field: &str) -> f64 {
        self.rows
            .iter()
            .map(|row| row.field(field).parse::<f64>().unwrap_or(0.0))
            .sum()
    }

    /// Re-fetches the authoritative list and reconciles it with local state.
    pub fn refresh(&mut self) -> Result<(), CollectionError> {
        let Some(parent_id) = self.parent_id else {
            return Err(CollectionError::Unbound);
        };
        let server_rows = self.gateway.list(parent_id)?;
        self.on_authoritative_list(server_rows);
        Ok(())
    }

    /// Merges the authoritative list with local state without losing work.
    ///
    /// Unsaved local rows are appended after the server rows, never
    /// discarded. When there is nothing local to protect, the server list
    /// replaces the display only if its identifier set differs from the
    /// currently-shown rows; identical lists (including the empty/empty case)
    /// are a pure no-op. A saved row that is mid-edit keeps its attempted
    /// values and snapshot across the merge.
    pub fn on_authoritative_list(&mut self, server_rows: Vec<ServerRow>) {
        let has_unsaved = self.rows.iter().any(|row| !row.is_saved());
        let local_ids: BTreeSet<i64> = self.rows.iter().filter_map(|row| row.row_id).collect();
        let server_ids: BTreeSet<i64> = server_rows.iter().map(|row| row.id).collect();

        if !has_unsaved && local_ids == server_ids {
            return;
        }

        let previous = std::mem::take(&mut self.rows);
        let (saved, unsaved): (Vec<_>, Vec<_>) =
            previous.into_iter().partition(CollectionRow::is_saved);

        self.rows = server_rows
            .into_iter()
            .map(|server_row| {
                let mid_edit = saved
                    .iter()
                    .find(|row| row.row_id == Some(server_row.id) && row.is_editing());
                match mid_edit {
                    Some(local) => local.clone(),
                    None => CollectionRow::confirmed(server_row.id, 0, server_row.fields),
                }
            })
            .collect();
        self.rows.extend(unsaved);
        self.renumber();
        tracing::debug!(total = self.rows.len(), "reconciled authoritative row list");
    }

    /// Appends a locally-pending row in edit state.
    ///
    /// Rejected when a tracked field is already fully allocated, since the
    /// new row could never be saved with a meaningful value.
    pub fn add_row(&mut self) -> Result<usize, CollectionError> {
        for field in &self.spec.tracked_fields {
            let total = self.total(field);
            if total >= self.spec.ceiling {
                return Err(CollectionError::AggregateLimit {
                    field: field.clone(),
                    total,
                    ceiling: self.spec.ceiling,
                });
            }
        }
        let sequence = self.rows.len() as u32 + 1;
        self.rows
            .push(CollectionRow::pending(sequence, &self.spec.row_fields));
        Ok(self.rows.len() - 1)
    }

    /// Opens a row for editing, snapshotting saved values for cancel. No
    /// remote call is made.
    pub fn enable_edit(&mut self, index: usize) -> Result<(), CollectionError> {
        let row = self
            .rows
            .get_mut(index)
            .ok_or(CollectionError::RowOutOfRange(index))?;
        if row.is_editing() {
            return Ok(());
        }
        if row.is_saved() {
            row.snapshot = Some(row.fields.clone());
        }
        row.edit_state = RowEditState::Editing;
        Ok(())
    }

    /// Writes a field of a row that is open for editing.
    pub fn set_field(
        &mut self,
        index: usize,
        field: &str,
        value: &str,
    ) -> Result<(), CollectionError> {
        let row = self
            .rows
            .get_mut(index)
            .ok_or(CollectionError::RowOutOfRange(index))?;
        if !row.is_editing() {
            return Err(CollectionError::RowReadOnly(index));
        }
        row.set_field(field, value);
        Ok(())
    }

    /// Abandons an edit: never-persisted rows are removed outright, saved
    /// rows are restored from their snapshot.
    pub fn cancel_edit(&mut self, index: usize) -> Result<(), CollectionError> {
        let row = self
            .rows
            .get_mut(index)
            .ok_or(CollectionError::RowOutOfRange(index))?;
        if !row.is_saved() {
            self.rows.remove(index);
            self.renumber();
            return Ok(());
        }
        if let Some(snapshot) = row.snapshot.take() {
            row.fields = snapshot;
        }
        row.edit_state = RowEditState::ReadOnly;
        row.issues.clear();
        Ok(())
    }

    /// Validates and persists a row, create-or-update by id presence.
    ///
    /// The aggregate ceiling is recomputed over the live state of all rows at
    /// the moment of save, so concurrent edits cannot sneak past a stale
    /// total. On gateway failure the row stays in edit state with its
    /// attempted values intact so the user can retry.
    pub fn save_row(&mut self, index: usize) -> Result<i64, CollectionError> {
        if index >= self.rows.len() {
            return Err(CollectionError::RowOutOfRange(index));
        }

        let issues = self.row_issues(index);
        if !issues.is_empty() {
            self.rows[index].issues = issues.clone();
            return Err(CollectionError::Validation(issues));
        }

        for field in &self.spec.tracked_fields {
            let total = self.total(field);
            if total > self.spec.ceiling {
                return Err(CollectionError::AggregateLimit {
                    field: field.clone(),
                    total,
                    ceiling: self.spec.ceiling,
                });
            }
        }

        let parent_id = self.parent_id.ok_or(CollectionError::Unbound)?;
        let row = &self.rows[index];
        let saved = match row.row_id {
            Some(row_id) => self.gateway.update(row_id, &row.fields)?,
            None => self.gateway.create(parent_id, &row.fields)?,
        };

        let row = &mut self.rows[index];
        row.row_id = Some(saved.id);
        row.edit_state = RowEditState::ReadOnly;
        row.snapshot = None;
        row.issues.clear();
        tracing::info!(row_id = saved.id, sequence = row.sequence, "row saved");
        Ok(saved.id)
    }

    /// Deletes a row, remote-first for persisted rows; only after the remote
    /// delete succeeds is the row removed and the remainder renumbered
    /// densely. Remote failure leaves the row and all of its state untouched.
    pub fn delete_row(&mut self, index: usize) -> Result<(), CollectionError> {
        let row = self
            .rows
            .get(index)
            .ok_or(CollectionError::RowOutOfRange(index))?;
        if let Some(row_id) = row.row_id {
            self.gateway.delete(row_id)?;
            tracing::info!(row_id, "row deleted remotely");
        }
        self.rows.remove(index);
        self.renumber();
        Ok(())
    }

    fn renumber(&mut self) {
        for (position, row) in self.rows.iter_mut().enumerate() {
            row.sequence = position as u32 + 1;
        }
    }

    fn row_issues(&self, index: usize) -> Vec<FieldIssue> {
        let row = &self.rows[index];
        let mut issues = Vec::new();
        for field in &self.spec.row_fields {
            let value = row.field(field);
            let tracked = self.spec.tracked_fields.iter().any(|name| name == field);
            if value.is_empty() {
                if tracked {
                    issues.push(FieldIssue::new(field, "Value is required"));
                }
                continue;
            }
            if value.chars().count() > self.spec.max_field_len {
                issues.push(FieldIssue::new(
                    field,
                    format!("Value cannot exceed {} characters", self.spec.max_field_len),
                ));
                continue;
            }
            if tracked {
                match value.parse::<f64>() {
                    Ok(number) if (0.0..=100.0).contains(&number) => {}
                    Ok(_) => issues.push(FieldIssue::new(
                        field,
                        "Enter a percentage between 0 and 100",
                    )),
                    Err(_) => issues.push(FieldIssue::new(field, "Enter a numeric value")),
                }
            }
        }
        issues
    }
}
