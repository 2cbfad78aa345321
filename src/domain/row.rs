use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::field::{normalize, FieldIssue};

/// Edit lifecycle of a collection row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowEditState {
    ReadOnly,
    Editing,
}

/// One entry of an editable sub-resource collection, such as a payment
/// installment.
///
/// Snapshot and validation state live on the row itself, so deleting or
/// renumbering neighbours can never detach them from the logical row they
/// belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRow {
    /// Server-assigned identifier; `None` while the row is locally pending.
    pub row_id: Option<i64>,
    /// Display position, assigned densely and contiguously starting at 1.
    pub sequence: u32,
    pub edit_state: RowEditState,
    pub fields: BTreeMap<String, String>,
    /// Present only while a previously-saved row is being edited; restored on
    /// cancel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FieldIssue>,
}

impl CollectionRow {
    /// Creates a locally-pending row that has never been persisted.
    pub fn pending(sequence: u32, field_names: &[String]) -> Self {
        Self {
            row_id: None,
            sequence,
            edit_state: RowEditState::Editing,
            fields: field_names
                .iter()
                .map(|name| (name.clone(), String::new()))
                .collect(),
            snapshot: None,
            issues: Vec::new(),
        }
    }

    /// Creates a row from a server-confirmed record.
    pub fn confirmed(id: i64, sequence: u32, fields: BTreeMap<String, String>) -> Self {
        Self {
            row_id: Some(id),
            sequence,
            edit_state: RowEditState::ReadOnly,
            fields,
            snapshot: None,
            issues: Vec::new(),
        }
    }

    pub fn is_saved(&self) -> bool {
        self.row_id.is_some()
    }

    pub fn is_editing(&self) -> bool {
        self.edit_state == RowEditState::Editing
    }

    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set_field(&mut self, name: &str, value: &str) {
        self.fields.insert(name.to_string(), normalize(value));
    }
}
