use thiserror::Error;

use crate::domain::FieldIssue;
use crate::storage::GatewayError;

fn describe_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error type covering wizard-level failures.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("validation failed: {}", describe_issues(.0))]
    Validation(Vec<FieldIssue>),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("invalid operation: {0}")]
    Invalid(String),
}

/// Error type covering collection reconciler failures.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("validation failed: {}", describe_issues(.0))]
    Validation(Vec<FieldIssue>),
    #[error("{field} total {total} exceeds the allowed {ceiling}")]
    AggregateLimit {
        field: String,
        total: f64,
        ceiling: f64,
    },
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("row index {0} is out of range")]
    RowOutOfRange(usize),
    #[error("row {0} is not being edited")]
    RowReadOnly(usize),
    #[error("collection is not bound to a parent entity")]
    Unbound,
}
