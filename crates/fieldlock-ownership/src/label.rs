//! Human-readable field names for rejection messages

use fieldlock_document::FieldPath;
use std::collections::BTreeMap;

/// Turns field paths into names a person would recognise
///
/// Overrides are keyed by the exact path (`items[2].amount`) or by the
/// path with indices normalized (`items[].amount`). Anything else gets a label
/// derived from its last key.
#[derive(Debug, Clone, Default)]
pub struct FieldLabeler {
    overrides: BTreeMap<String, String>,
}

impl FieldLabeler {
    /// Labeler with no overrides
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Labeler with an override table
    #[inline]
    #[must_use]
    pub fn with_overrides(overrides: BTreeMap<String, String>) -> Self {
        Self { overrides }
    }

    /// Add one override
    #[inline]
    #[must_use]
    pub fn with_label(mut self, pattern: impl Into<String>, label: impl Into<String>) -> Self {
        self.overrides.insert(pattern.into(), label.into());
        self
    }

    /// Label for `path`
    ///
    /// `items[2].unitCost` → `Unit Cost (item 3)`.
    #[must_use]
    pub fn label(&self, path: &FieldPath) -> String {
        if let Some(label) = self.overrides.get(&path.to_string()) {
            return label.clone();
        }

        let base = self
            .overrides
            .get(&path.normalized())
            .cloned()
            .or_else(|| path.last_key().map(humanize))
            .unwrap_or_else(|| "Field".to_string());

        match path.last_index() {
            Some(index) => format!("{base} (item {})", index + 1),
            None => base,
        }
    }
}

/// `unitCost` / `unit_cost` → `Unit Cost`
fn humanize(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower_or_digit = false;

    for c in key.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower_or_digit = false;
            continue;
        }
        if c.is_uppercase() && prev_lower_or_digit && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower_or_digit = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
