//! Label lookup consumed by rendering layers; never drives control flow.

use std::collections::BTreeMap;

pub trait LabelLookup {
    /// Resolves a configured label, falling back to `fallback` when the
    /// config/language pair is unknown.
    fn label(&self, config_id: &str, language: &str, fallback: &str) -> String;
}

/// Map-backed lookup keyed by `(config id, language code)`.
#[derive(Debug, Default)]
pub struct StaticLabels {
    entries: BTreeMap<(String, String), String>,
}

impl StaticLabels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, config_id: &str, language: &str, text: &str) {
        self.entries.insert(
            (config_id.to_string(), language.to_string()),
            text.to_string(),
        );
    }
}

impl LabelLookup for StaticLabels {
    fn label(&self, config_id: &str, language: &str, fallback: &str) -> String {
        self.entries
            .get(&(config_id.to_string(), language.to_string()))
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entries_fall_back() {
        let mut labels = StaticLabels::new();
        labels.insert("guarantee.title", "en", "Guarantee");
        labels.insert("guarantee.title", "ro", "Garanție");

        assert_eq!(labels.label("guarantee.title", "ro", "?"), "Garanție");
        assert_eq!(labels.label("guarantee.title", "de", "Guarantee"), "Guarantee");
    }
}
