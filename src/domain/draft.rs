//! The draft field graph shared by every wizard step.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::field::normalize;

/// In-progress, possibly unpersisted representation of the entity being
/// edited across wizard steps.
///
/// Field values are trimmed strings; the empty string is the canonical empty
/// state. Dependency edges run parent-to-child only, so a dependent can never
/// write back to its parent. Fields that are views over one canonical value
/// (selecting by name vs. by identifier) are declared as an alias group and
/// written together instead of being chained through the dependency edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    values: IndexMap<String, String>,
    dependents: BTreeMap<String, Vec<String>>,
    aliases: Vec<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Draft {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            values: IndexMap::new(),
            dependents: BTreeMap::new(),
            aliases: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Registers a field so it participates in iteration order.
    pub fn declare_field(&mut self, name: impl Into<String>) {
        self.values.entry(name.into()).or_default();
    }

    pub fn set(&mut self, field: &str, value: &str) {
        self.values.insert(field.to_string(), normalize(value));
        self.touch();
    }

    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self, field: &str) -> bool {
        self.get(field).is_empty()
    }

    pub fn clear(&mut self, field: &str) {
        self.values.insert(field.to_string(), String::new());
        self.touch();
    }

    /// Empties every field while keeping declarations, edges, and aliases.
    pub fn clear_all(&mut self) {
        for value in self.values.values_mut() {
            value.clear();
        }
        self.touch();
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Declares that `child` derives its value from `parent`.
    pub fn add_dependency(&mut self, parent: &str, child: &str) {
        self.declare_field(parent);
        self.declare_field(child);
        let children = self.dependents.entry(parent.to_string()).or_default();
        if !children.iter().any(|existing| existing == child) {
            children.push(child.to_string());
        }
    }

    /// Declares a set of fields as views over one canonical value.
    pub fn alias_group(&mut self, fields: &[&str]) {
        for field in fields {
            self.declare_field(*field);
        }
        self.aliases
            .push(fields.iter().map(|field| field.to_string()).collect());
    }

    /// Returns the other members of `field`'s alias group, if any.
    pub fn aliases_of(&self, field: &str) -> Vec<String> {
        for group in &self.aliases {
            if group.iter().any(|member| member == field) {
                return group
                    .iter()
                    .filter(|member| member.as_str() != field)
                    .cloned()
                    .collect();
            }
        }
        Vec::new()
    }

    pub fn dependents_of(&self, field: &str) -> &[String] {
        self.dependents
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns every field reachable from `field` through dependency edges.
    pub fn transitive_dependents(&self, field: &str) -> Vec<String> {
        let mut reached = Vec::new();
        let mut stack: Vec<String> = self.dependents_of(field).to_vec();
        while let Some(next) = stack.pop() {
            if reached.contains(&next) {
                continue;
            }
            stack.extend(self.dependents_of(&next).iter().cloned());
            reached.push(next);
        }
        reached
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Draft {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_on_undeclared_field_is_empty() {
        let draft = Draft::new();
        assert_eq!(draft.get("missing"), "");
        assert!(draft.is_empty("missing"));
    }

    #[test]
    fn values_are_normalized_on_set() {
        let mut draft = Draft::new();
        draft.set("partner_name", "  ACME  ");
        assert_eq!(draft.get("partner_name"), "ACME");
    }

    #[test]
    fn transitive_dependents_follow_edges() {
        let mut draft = Draft::new();
        draft.add_dependency("partner", "cif");
        draft.add_dependency("partner", "status");
        draft.add_dependency("status", "sub_option");

        let mut reached = draft.transitive_dependents("partner");
        reached.sort();
        assert_eq!(reached, vec!["cif", "status", "sub_option"]);
    }

    #[test]
    fn alias_group_excludes_the_queried_field() {
        let mut draft = Draft::new();
        draft.alias_group(&["partner_name", "partner_id"]);
        assert_eq!(draft.aliases_of("partner_name"), vec!["partner_id"]);
        assert!(draft.aliases_of("unrelated").is_empty());
    }
}
