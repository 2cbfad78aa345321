//! Declarative field validation used to gate step transitions.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use regex::Regex;

use crate::domain::{Draft, FieldIssue};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single declarative rule attached to a field.
#[derive(Debug, Clone)]
pub enum Rule {
    Required,
    Pattern { pattern: Regex, message: String },
    NumericRange { min: f64, max: f64 },
    MaxLength(usize),
    /// The field must hold a date strictly after the named field's date.
    DateAfter { other: String },
}

impl Rule {
    pub fn pattern(expression: &str, message: &str) -> Self {
        Rule::Pattern {
            pattern: Regex::new(expression).expect("invalid field pattern"),
            message: message.to_string(),
        }
    }

    pub fn date_after(other: &str) -> Self {
        Rule::DateAfter {
            other: other.to_string(),
        }
    }
}

/// Evaluates whether a named subset of draft fields passes its rules.
///
/// A step transition proceeds only when the returned issue set is empty.
#[derive(Debug, Default)]
pub struct ValidationGate {
    rules: BTreeMap<String, Vec<Rule>>,
}

impl ValidationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, field: &str, rule: Rule) {
        self.rules.entry(field.to_string()).or_default().push(rule);
    }

    pub fn with_rule(mut self, field: &str, rule: Rule) -> Self {
        self.add_rule(field, rule);
        self
    }

    /// Validates `fields` plus any field whose cross-field rule references a
    /// member of the set, so comparison targets are re-checked even when they
    /// were not touched themselves.
    pub fn validate(&self, draft: &Draft, fields: &[String]) -> Vec<FieldIssue> {
        let set = self.with_cross_dependents(fields);
        let mut issues = Vec::new();
        for field in &set {
            self.validate_field(draft, field, &mut issues);
        }
        issues
    }

    fn with_cross_dependents(&self, fields: &[String]) -> Vec<String> {
        let mut set: Vec<String> = fields.to_vec();
        for (name, rules) in &self.rules {
            if set.iter().any(|member| member == name) {
                continue;
            }
            let references_member = rules.iter().any(|rule| match rule {
                Rule::DateAfter { other } => fields.iter().any(|member| member == other),
                _ => false,
            });
            if references_member {
                set.push(name.clone());
            }
        }
        set
    }

    fn validate_field(&self, draft: &Draft, field: &str, issues: &mut Vec<FieldIssue>) {
        let Some(rules) = self.rules.get(field) else {
            return;
        };
        let value = draft.get(field);
        if value.is_empty() {
            // Optional empty fields skip format rules entirely.
            if rules.iter().any(|rule| matches!(rule, Rule::Required)) {
                issues.push(FieldIssue::new(field, "Value is required"));
            }
            return;
        }

        for rule in rules {
            match rule {
                Rule::Required => {}
                Rule::Pattern { pattern, message } => {
                    if !pattern.is_match(value) {
                        issues.push(FieldIssue::new(field, message.clone()));
                    }
                }
                Rule::NumericRange { min, max } => match value.parse::<f64>() {
                    Ok(number) if number >= *min && number <= *max => {}
                    Ok(_) => issues.push(FieldIssue::new(
                        field,
                        format!("Enter a value between {min} and {max}"),
                    )),
                    Err(_) => issues.push(FieldIssue::new(field, "Enter a numeric value")),
                },
                Rule::MaxLength(max_len) => {
                    if value.chars().count() > *max_len {
                        issues.push(FieldIssue::new(
                            field,
                            format!("Value cannot exceed {max_len} characters"),
                        ));
                    }
                }
                Rule::DateAfter { other } => {
                    let reference = draft.get(other);
                    match (parse_date(value), parse_date(reference)) {
                        (Some(own), Some(limit)) => {
                            if own <= limit {
                                issues.push(FieldIssue::new(
                                    field,
                                    format!("Date must be after {reference}"),
                                ));
                            }
                        }
                        (None, _) => {
                            issues.push(FieldIssue::new(field, "Use YYYY-MM-DD format"));
                        }
                        // Comparison target empty or unparseable; its own
                        // rules report that.
                        (Some(_), None) => {}
                    }
                }
            }
        }
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}
