//! Context assembly for generative-text calls.
//!
//! Turns the bill, its summary, and the selected documents into a
//! bounded, deterministic text block. Documents without imported text
//! get a placeholder telling the model to ask for a manual paste
//! instead of inventing content.

use crate::config::{
    DEFAULT_CONTEXT_TOTAL_CAP, DEFAULT_MIN_CONTENT_LEN, DEFAULT_PER_DOC_CHAR_CAP,
};
use crate::types::{Bill, Document};

/// Assembles size-bounded LLM context.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    per_doc_cap: usize,
    min_content_len: usize,
    total_cap: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self {
            per_doc_cap: DEFAULT_PER_DOC_CHAR_CAP,
            min_content_len: DEFAULT_MIN_CONTENT_LEN,
            total_cap: DEFAULT_CONTEXT_TOTAL_CAP,
        }
    }
}

impl ContextAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Character cap applied to each document's content.
    pub fn with_per_doc_cap(mut self, cap: usize) -> Self {
        self.per_doc_cap = cap;
        self
    }

    /// Content at or below this length counts as "not imported".
    pub fn with_min_content_len(mut self, len: usize) -> Self {
        self.min_content_len = len;
        self
    }

    /// Character cap applied to the whole assembled block.
    pub fn with_total_cap(mut self, cap: usize) -> Self {
        self.total_cap = cap;
        self
    }

    /// Build the context block for `bill` and the selected documents.
    ///
    /// `history` is an optional summary of the conversation so far, for
    /// callers carrying a multi-turn chat over a stateless endpoint.
    /// Deterministic for identical inputs. Output length is bounded by
    /// the per-document cap times the selection size plus fixed
    /// overhead, and clamped to the total cap.
    pub fn assemble(
        &self,
        bill: &Bill,
        summary: &str,
        selected: &[&Document],
        history: Option<&str>,
    ) -> String {
        let mut out = String::new();
        out.push_str(&format!("Active Bill: {} - {}\n", bill.id, bill.title));
        out.push_str(&format!("Current Summary: {}\n\n", summary));

        if let Some(history) = history.filter(|h| !h.trim().is_empty()) {
            out.push_str(&format!("Conversation so far:\n{}\n\n", history));
        }

        if !selected.is_empty() {
            out.push_str("SELECTED DOCUMENTS:\n");
            for doc in selected {
                if doc.content.trim().len() > self.min_content_len {
                    let body = truncate_chars(&doc.content, self.per_doc_cap);
                    let marker = if body.len() < doc.content.len() { "..." } else { "" };
                    out.push_str(&format!("--- {} ---\n{}{}\n\n", doc.title, body, marker));
                } else {
                    let link = doc.url.as_deref().unwrap_or("none");
                    out.push_str(&format!(
                        "--- {} ---\n(Content not imported. Link: {}. \
                         Ask the user to paste the document text instead of guessing at it.)\n",
                        doc.title, link
                    ));
                }
            }
        }

        if out.chars().count() > self.total_cap {
            let mut clamped: String = out.chars().take(self.total_cap).collect();
            clamped.push_str("...");
            return clamped;
        }
        out
    }
}

/// Longest prefix of `s` holding at most `cap` characters, cut on a
/// char boundary.
fn truncate_chars(s: &str, cap: usize) -> &str {
    match s.char_indices().nth(cap) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocType;

    fn doc_with_content(title: &str, content: String) -> Document {
        Document::new(title, title, DocType::Document)
            .with_url(format!("https://files.test/{title}"))
            .with_content(content)
    }

    #[test]
    fn emits_bill_header_and_summary() {
        let bill = Bill::new("HB 1234", "Dental care access");
        let out = ContextAssembler::new().assemble(&bill, "Expands coverage.", &[], None);

        assert!(out.starts_with("Active Bill: HB 1234 - Dental care access\n"));
        assert!(out.contains("Current Summary: Expands coverage.\n"));
        assert!(!out.contains("SELECTED DOCUMENTS"));
    }

    #[test]
    fn long_content_is_capped_with_an_ellipsis() {
        let bill = Bill::new("HB 1234", "Test");
        let doc = doc_with_content("report", "x".repeat(5000));
        let out = ContextAssembler::new()
            .with_per_doc_cap(3000)
            .assemble(&bill, "", &[&doc], None);

        assert!(out.contains(&format!("--- report ---\n{}...", "x".repeat(3000))));
        assert!(!out.contains(&"x".repeat(3001)));
    }

    #[test]
    fn short_content_gets_the_manual_paste_placeholder() {
        let bill = Bill::new("HB 1234", "Test");
        let doc = doc_with_content("stub", "too short".to_string());
        let out = ContextAssembler::new().assemble(&bill, "", &[&doc], None);

        assert!(out.contains("(Content not imported. Link: https://files.test/stub."));
        assert!(out.contains("paste the document text"));
    }

    #[test]
    fn output_is_bounded_by_selection_size() {
        let bill = Bill::new("HB 1234", "Test");
        let cap = 500;
        let docs: Vec<Document> = (0..4)
            .map(|i| doc_with_content(&format!("doc-{i}"), "y".repeat(cap * 3)))
            .collect();
        let refs: Vec<&Document> = docs.iter().collect();

        let assembler = ContextAssembler::new()
            .with_per_doc_cap(cap)
            .with_total_cap(usize::MAX);
        let out = assembler.assemble(&bill, "summary", &refs, None);

        // Per-section overhead: title label, separators, ellipsis.
        let fixed_overhead = 200;
        let per_doc_overhead = 40;
        assert!(out.len() <= refs.len() * (cap + per_doc_overhead) + fixed_overhead);
    }

    #[test]
    fn total_cap_clamps_the_whole_block() {
        let bill = Bill::new("HB 1234", "Test");
        let docs: Vec<Document> = (0..6)
            .map(|i| doc_with_content(&format!("doc-{i}"), "z".repeat(4000)))
            .collect();
        let refs: Vec<&Document> = docs.iter().collect();

        let out = ContextAssembler::new()
            .with_total_cap(1000)
            .assemble(&bill, "summary", &refs, None);

        assert!(out.chars().count() <= 1003); // cap plus the ellipsis
        assert!(out.ends_with("..."));
    }

    #[test]
    fn history_summary_sits_between_summary_and_documents() {
        let bill = Bill::new("HB 1234", "Test");
        let out = ContextAssembler::new().assemble(
            &bill,
            "summary",
            &[],
            Some("User: What changed?\nAssistant: The committee amended section 2."),
        );

        assert!(out.contains("Conversation so far:\nUser: What changed?"));

        let without = ContextAssembler::new().assemble(&bill, "summary", &[], Some("   "));
        assert!(!without.contains("Conversation so far"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let bill = Bill::new("HB 1234", "Test");
        let doc = doc_with_content("report", "stable content that is long enough to include".repeat(3));
        let a = ContextAssembler::new().assemble(&bill, "summary", &[&doc], None);
        let b = ContextAssembler::new().assemble(&bill, "summary", &[&doc], None);
        assert_eq!(a, b);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let multibyte = "咲".repeat(100);
        let cut = truncate_chars(&multibyte, 10);
        assert_eq!(cut.chars().count(), 10);

        let short = truncate_chars("abc", 10);
        assert_eq!(short, "abc");
    }
}
