//! Deterministic blank-node labelling.
//!
//! See <https://www.w3.org/TR/2019/WD-json-ld-api-20191018/#generate-blank-node-identifier>.

use std::collections::HashMap;

/// Assigns short, sequential canonical labels to blank node identifiers,
/// remembering the mapping so the same input always yields the same
/// output label within one namer's lifetime.
#[derive(Debug, Clone)]
pub(crate) struct UniqueNamer {
    /// Label prefix (e.g. `_:b` or `_:c14n`).
    prefix: String,
    /// Next label counter.
    counter: usize,
    /// Existing-label to canonical-label map, insertion ordered.
    existing: Vec<(String, String)>,
}

impl UniqueNamer {
    /// Creates a new namer with the given label prefix.
    pub(crate) fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
            existing: Vec::new(),
        }
    }

    /// Returns the canonical label for `existing_label`, assigning a new
    /// one on first use.
    pub(crate) fn name(&mut self, existing_label: &str) -> String {
        if let Some((_, canonical)) = self.existing.iter().find(|(k, _)| k == existing_label) {
            return canonical.clone();
        }
        let canonical = format!("{}{}", self.prefix, self.counter);
        self.counter += 1;
        self.existing
            .push((existing_label.to_owned(), canonical.clone()));
        canonical
    }

    /// Checks whether `label` has already been assigned a canonical name.
    pub(crate) fn is_named(&self, label: &str) -> bool {
        self.existing.iter().any(|(k, _)| k == label)
    }

    /// Returns the existing-to-canonical map in assignment order.
    pub(crate) fn existing(&self) -> &[(String, String)] {
        &self.existing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_sequential_labels() {
        let mut namer = UniqueNamer::new("_:b");
        assert_eq!(namer.name("_:x"), "_:b0");
        assert_eq!(namer.name("_:y"), "_:b1");
        // Re-querying the same input returns the same label.
        assert_eq!(namer.name("_:x"), "_:b0");
        assert!(namer.is_named("_:x"));
        assert!(!namer.is_named("_:z"));
    }

    #[test]
    fn existing_is_insertion_ordered() {
        let mut namer = UniqueNamer::new("_:c14n");
        namer.name("_:b1");
        namer.name("_:b0");
        let existing = namer.existing();
        assert_eq!(existing[0].0, "_:b1");
        assert_eq!(existing[1].0, "_:b0");
    }
}
