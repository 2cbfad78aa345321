//! Cascading auto-population of dependent fields.
//!
//! A change to a parent field (say, selecting a build partner) derives values
//! for its dependents (CIF, status, child options) from caller-supplied
//! lookup tables. Propagation is synchronous and strictly parent-to-child, so
//! a dependent is never observed stale and never writes back to its parent.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::Draft;

/// Derived values for the dependents of one parent selection.
pub type DerivedValues = BTreeMap<String, String>;

/// Lookup table for one parent field: selection value to derived dependents.
pub type LookupTable = BTreeMap<String, DerivedValues>;

/// Outcome of refreshing a field's valid option set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Selection still valid (or already empty); nothing changed.
    Unchanged,
    /// Dangling selection cleared; every cleared dependent held only derived
    /// values, so no user input was lost.
    Healed,
    /// Dangling selection cleared, discarding user-entered values in the
    /// named dependent fields. Callers should warn.
    HealedWithDataLoss { fields: Vec<String> },
}

#[derive(Debug, Default)]
pub struct FieldDependencyResolver {
    tables: BTreeMap<String, LookupTable>,
}

impl FieldDependencyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_table(&mut self, parent: &str, table: LookupTable) {
        self.tables.insert(parent.to_string(), table);
    }

    pub fn with_table(mut self, parent: &str, table: LookupTable) -> Self {
        self.set_table(parent, table);
        self
    }

    /// Applies a user edit and synchronously derives every dependent.
    ///
    /// Alias fields of `field` are written in the same update. A dependent
    /// with no matching lookup entry is cleared rather than left stale, and
    /// its own dependents are cleared with it.
    pub fn apply_change(&self, draft: &mut Draft, field: &str, value: &str) {
        draft.set(field, value);
        let mut visited = BTreeSet::from([field.to_string()]);
        self.propagate(draft, field, &mut visited);
    }

    /// Re-checks a selection against a freshly-loaded option list.
    ///
    /// When the previously-selected value no longer exists (a paginated
    /// option list reloaded without it), the selection and all of its
    /// dependents are cleared instead of keeping a dangling reference.
    pub fn refresh_options(
        &self,
        draft: &mut Draft,
        field: &str,
        valid_options: &[String],
    ) -> RefreshOutcome {
        let current = draft.get(field).to_string();
        if current.is_empty() || valid_options.iter().any(|option| option == &current) {
            return RefreshOutcome::Unchanged;
        }

        // Values the cascade itself would have produced for the outgoing
        // selection; anything else in a dependent field was typed by the user.
        let mut expected = DerivedValues::new();
        let mut visited = BTreeSet::from([field.to_string()]);
        self.collect_expected(draft, field, &current, &mut expected, &mut visited);

        let mut lost = Vec::new();
        for dependent in draft.transitive_dependents(field) {
            let value = draft.get(&dependent);
            if !value.is_empty() && expected.get(&dependent).map(String::as_str) != Some(value) {
                lost.push(dependent.clone());
            }
        }

        tracing::debug!(field, stale = %current, "clearing dangling selection");
        draft.clear(field);
        for alias in draft.aliases_of(field) {
            draft.clear(&alias);
        }
        for dependent in draft.transitive_dependents(field) {
            draft.clear(&dependent);
        }

        if lost.is_empty() {
            RefreshOutcome::Healed
        } else {
            RefreshOutcome::HealedWithDataLoss { fields: lost }
        }
    }

    fn collect_expected(
        &self,
        draft: &Draft,
        field: &str,
        value: &str,
        out: &mut DerivedValues,
        visited: &mut BTreeSet<String>,
    ) {
        let derived = self.derived_for(field, value);
        for alias in draft.aliases_of(field) {
            if let Some(linked) = derived.get(&alias) {
                out.insert(alias, linked.clone());
            }
        }
        for dependent in draft.dependents_of(field).to_vec() {
            if !visited.insert(dependent.clone()) {
                continue;
            }
            if let Some(next) = derived.get(&dependent) {
                out.insert(dependent.clone(), next.clone());
                self.collect_expected(draft, &dependent, next, out, visited);
            }
        }
    }

    fn derived_for(&self, field: &str, value: &str) -> DerivedValues {
        self.tables
            .get(field)
            .and_then(|table| table.get(value))
            .cloned()
            .unwrap_or_default()
    }

    // Each field is derived at most once per update, so a cyclic edge
    // configuration terminates instead of recursing through the cycle.
    fn propagate(&self, draft: &mut Draft, field: &str, visited: &mut BTreeSet<String>) {
        let value = draft.get(field).to_string();
        let derived = self.derived_for(field, &value);

        for alias in draft.aliases_of(field) {
            match derived.get(&alias) {
                Some(linked) => draft.set(&alias, linked),
                None => draft.clear(&alias),
            }
        }

        for dependent in draft.dependents_of(field).to_vec() {
            if !visited.insert(dependent.clone()) {
                continue;
            }
            match derived.get(&dependent) {
                Some(value) => {
                    draft.set(&dependent, value);
                    self.propagate(draft, &dependent, visited);
                }
                None => {
                    draft.clear(&dependent);
                    for transitive in draft.transitive_dependents(&dependent) {
                        draft.clear(&transitive);
                    }
                }
            }
        }
    }
}
