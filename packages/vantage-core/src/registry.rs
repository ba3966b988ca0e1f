//! Per-bill document registry.
//!
//! An insertion-ordered, deduplicated collection of document records
//! plus the session-scoped selection set. The registry is the only
//! place that mutates document records; its invariants:
//!
//! - keys (document id, else URL) are unique
//! - `imported` is monotonic: false to true only
//! - merge-insert is idempotent and first-write-wins

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::types::Document;

/// Sentinel stored when extraction succeeded but produced no text.
pub const IMPORTED_SENTINEL: &str = "Text extracted.";

/// One bill's deduplicated document collection.
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    docs: IndexMap<String, Document>,
    selected: HashSet<String>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from a persisted document list.
    ///
    /// Duplicate keys in the input are dropped (first wins), restoring
    /// the uniqueness invariant for lists written by older clients.
    pub fn from_documents(docs: Vec<Document>) -> Self {
        let mut registry = Self::new();
        registry.merge_insert(docs);
        registry
    }

    /// Move the document list back out (for persistence).
    pub fn into_documents(self) -> Vec<Document> {
        self.docs.into_values().collect()
    }

    /// Documents in insertion order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.docs.values()
    }

    /// Look up a document by key.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.docs.get(key)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Insert every candidate whose key is not already present.
    ///
    /// Existing documents are left untouched (first-seen wins; later
    /// duplicates are dropped, not merged). Returns how many candidates
    /// were actually inserted, so re-scanning an unchanged source
    /// reports zero.
    pub fn merge_insert(&mut self, candidates: Vec<Document>) -> usize {
        let mut inserted = 0;
        for candidate in candidates {
            let key = candidate.key().to_string();
            if key.is_empty() {
                warn!(title = %candidate.title, "dropping candidate with no id or URL");
                continue;
            }
            if self.docs.contains_key(&key) {
                debug!(key, "duplicate candidate skipped");
                continue;
            }
            self.docs.insert(key, candidate);
            inserted += 1;
        }
        inserted
    }

    /// Record the outcome of a text import for the document at `key`.
    ///
    /// No-op when the key is absent. Stores the sentinel when the
    /// extractor produced only whitespace, so the record still reads as
    /// imported. Never clears an `imported` flag.
    pub fn mark_imported(&mut self, key: &str, text: &str) {
        if let Some(doc) = self.docs.get_mut(key) {
            doc.content = if text.trim().is_empty() {
                IMPORTED_SENTINEL.to_string()
            } else {
                text.to_string()
            };
            doc.imported = true;
        }
    }

    /// Toggle session-scoped selection; returns the new membership.
    pub fn toggle_selection(&mut self, key: &str) -> bool {
        if self.selected.remove(key) {
            false
        } else {
            self.selected.insert(key.to_string());
            true
        }
    }

    /// Selected documents, in insertion order.
    pub fn selected(&self) -> Vec<&Document> {
        self.docs
            .values()
            .filter(|d| self.selected.contains(d.key()))
            .collect()
    }

    /// Drop the whole selection.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocType;

    fn candidate(id: &str, title: &str) -> Document {
        Document::new(id, title, DocType::Document)
            .with_url(format!("https://files.test/{id}"))
    }

    #[test]
    fn merge_insert_is_idempotent() {
        let mut registry = DocumentRegistry::new();
        let batch = vec![candidate("a", "First"), candidate("b", "Second")];

        assert_eq!(registry.merge_insert(batch.clone()), 2);
        assert_eq!(registry.merge_insert(batch), 0);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn keys_stay_unique_across_merge_sequences() {
        let mut registry = DocumentRegistry::new();
        registry.merge_insert(vec![candidate("a", "one"), candidate("b", "two")]);
        registry.merge_insert(vec![candidate("b", "again"), candidate("c", "three")]);
        registry.merge_insert(vec![candidate("a", "again"), candidate("c", "again")]);

        let keys: Vec<_> = registry.documents().map(|d| d.key().to_string()).collect();
        let mut deduped = keys.clone();
        deduped.dedup();
        assert_eq!(keys, deduped);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn first_seen_title_wins() {
        let mut registry = DocumentRegistry::new();
        registry.merge_insert(vec![candidate("a", "Original title")]);
        registry.merge_insert(vec![candidate("a", "Renamed elsewhere")]);

        assert_eq!(registry.get("a").unwrap().title, "Original title");
    }

    #[test]
    fn url_keyed_candidates_dedupe_on_url() {
        let by_url =
            |title: &str| Document::new("", title, DocType::Document).with_url("https://x/y.pdf");
        let mut registry = DocumentRegistry::new();

        assert_eq!(registry.merge_insert(vec![by_url("one"), by_url("two")]), 1);
        assert_eq!(registry.get("https://x/y.pdf").unwrap().title, "one");
    }

    #[test]
    fn candidates_without_key_are_dropped() {
        let mut registry = DocumentRegistry::new();
        let keyless = Document::new("", "orphan", DocType::Document);
        assert_eq!(registry.merge_insert(vec![keyless]), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn imported_flag_is_monotonic() {
        let mut registry = DocumentRegistry::new();
        registry.merge_insert(vec![candidate("a", "doc")]);
        registry.mark_imported("a", "extracted body");
        assert!(registry.get("a").unwrap().imported);

        // A rescan delivering the same candidate unimported must not
        // reset the flag or the content.
        registry.merge_insert(vec![candidate("a", "doc")]);
        let doc = registry.get("a").unwrap();
        assert!(doc.imported);
        assert_eq!(doc.content, "extracted body");
    }

    #[test]
    fn whitespace_extraction_stores_the_sentinel() {
        let mut registry = DocumentRegistry::new();
        registry.merge_insert(vec![candidate("a", "doc")]);
        registry.mark_imported("a", "   \n ");

        let doc = registry.get("a").unwrap();
        assert!(doc.imported);
        assert_eq!(doc.content, IMPORTED_SENTINEL);
    }

    #[test]
    fn mark_imported_on_absent_key_is_a_noop() {
        let mut registry = DocumentRegistry::new();
        registry.mark_imported("ghost", "text");
        assert!(registry.is_empty());
    }

    #[test]
    fn selection_toggles_and_preserves_order() {
        let mut registry = DocumentRegistry::new();
        registry.merge_insert(vec![
            candidate("a", "one"),
            candidate("b", "two"),
            candidate("c", "three"),
        ]);

        assert!(registry.toggle_selection("c"));
        assert!(registry.toggle_selection("a"));
        let selected: Vec<_> = registry.selected().iter().map(|d| d.key()).collect();
        assert_eq!(selected, vec!["a", "c"]);

        assert!(!registry.toggle_selection("a"));
        assert_eq!(registry.selected().len(), 1);
    }
}
