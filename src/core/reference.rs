//! Reference number generation for newly-created entities.

use std::collections::BTreeSet;

/// Issues human-readable reference numbers and answers uniqueness probes.
///
/// Injectable replacement for a process-global sequence cache; each consumer
/// receives a source explicitly, so nothing leaks between test runs.
pub trait ReferenceSource: Send + Sync {
    fn generate(&mut self, prefix: &str) -> String;
    fn is_unique(&self, reference: &str) -> bool;
}

/// Monotonic in-process source backed by a counter and the set of issued
/// references.
#[derive(Debug, Default)]
pub struct SequentialReferenceSource {
    next: u64,
    issued: BTreeSet<String>,
}

impl SequentialReferenceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(next: u64) -> Self {
        Self {
            next,
            issued: BTreeSet::new(),
        }
    }
}

impl ReferenceSource for SequentialReferenceSource {
    fn generate(&mut self, prefix: &str) -> String {
        self.next += 1;
        let reference = format!("{}-{:06}", prefix, self.next);
        self.issued.insert(reference.clone());
        reference
    }

    fn is_unique(&self, reference: &str) -> bool {
        !self.issued.contains(reference)
    }
}
