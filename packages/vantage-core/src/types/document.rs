//! Document types - per-bill source documents and their classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classified document type.
///
/// The tag set is small but open-ended: scanners classify what they can
/// and fall back to `Document`; `UnknownDoc` marks records that arrived
/// without enough signal to classify at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocType {
    #[serde(rename = "Original Bill")]
    OriginalBill,
    #[serde(rename = "Amendment")]
    Amendment,
    #[serde(rename = "Bill Report")]
    BillReport,
    #[serde(rename = "Fiscal Note")]
    FiscalNote,
    #[serde(rename = "Bill Analysis")]
    BillAnalysis,
    #[serde(rename = "Document")]
    Document,
    #[serde(rename = "Other")]
    Other,
    #[serde(rename = "Unknown Doc")]
    UnknownDoc,
}

impl DocType {
    /// Human-readable label (matches the serialized form).
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::OriginalBill => "Original Bill",
            DocType::Amendment => "Amendment",
            DocType::BillReport => "Bill Report",
            DocType::FiscalNote => "Fiscal Note",
            DocType::BillAnalysis => "Bill Analysis",
            DocType::Document => "Document",
            DocType::Other => "Other",
            DocType::UnknownDoc => "Unknown Doc",
        }
    }

    /// Classify a document from its URL path and link text.
    ///
    /// Precedence is uniform across scanners: fiscal beats amendment beats
    /// report beats analysis link-text beats original bill; anything else
    /// is a generic `Document`.
    pub fn classify(path: &str, link_text: &str) -> DocType {
        let path = path.to_lowercase();
        if path.contains("fiscal") {
            DocType::FiscalNote
        } else if path.contains("/amendments/") {
            DocType::Amendment
        } else if path.contains("/reports/") {
            DocType::BillReport
        } else if link_text.contains("Analysis") {
            DocType::BillAnalysis
        } else if path.contains("/bills/") {
            DocType::OriginalBill
        } else {
            DocType::Document
        }
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source document associated with one bill.
///
/// Created by a scanner (unimported, empty content) or by manual entry
/// (imported from the start). The id is unique within the owning bill:
/// a remote file id, a canonicalized URL, or a generated `man-<millis>`
/// id for manual entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Identifier, unique within the owning bill's document list
    pub id: String,

    /// Display title
    pub title: String,

    /// Classified type
    #[serde(rename = "type")]
    pub doc_type: DocType,

    /// Human-viewing URL (None for manual entries)
    pub url: Option<String>,

    /// Direct-download URL when it differs from the viewing URL
    pub download_url: Option<String>,

    /// Extracted text, empty until imported
    #[serde(default)]
    pub content: String,

    /// Whether text has been imported
    #[serde(default)]
    pub imported: bool,

    /// When the document was discovered or entered
    pub discovered_at: DateTime<Utc>,
}

impl Document {
    /// Create an unimported document discovered by a scanner.
    pub fn new(id: impl Into<String>, title: impl Into<String>, doc_type: DocType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            doc_type,
            url: None,
            download_url: None,
            content: String::new(),
            imported: false,
            discovered_at: Utc::now(),
        }
    }

    /// Create a manually entered document, imported from the start.
    pub fn manual(title: impl Into<String>, doc_type: DocType, text: impl Into<String>) -> Self {
        Self {
            id: format!("man-{}", Utc::now().timestamp_millis()),
            title: title.into(),
            doc_type,
            url: None,
            download_url: None,
            content: text.into(),
            imported: true,
            discovered_at: Utc::now(),
        }
    }

    /// Set the human-viewing URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the direct-download URL.
    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    /// Pre-populate extracted content (marks the document imported).
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self.imported = true;
        self
    }

    /// Dedup key: the id when present, else the URL.
    ///
    /// Scanners that discover by URL use the canonical URL as the id, so
    /// the same file found by two URL-based scanners collapses to one key.
    pub fn key(&self) -> &str {
        if !self.id.is_empty() {
            &self.id
        } else {
            self.url.as_deref().unwrap_or("")
        }
    }

    /// Whether usable text has been imported.
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_precedence() {
        // fiscal wins even when other keywords are present
        assert_eq!(
            DocType::classify("/fiscal/Amendments/x.pdf", ""),
            DocType::FiscalNote
        );
        assert_eq!(DocType::classify("/Amendments/x.pdf", ""), DocType::Amendment);
        assert_eq!(DocType::classify("/Reports/x.pdf", ""), DocType::BillReport);
        assert_eq!(
            DocType::classify("/misc/x.pdf", "Bill Analysis 2025"),
            DocType::BillAnalysis
        );
        assert_eq!(DocType::classify("/Bills/x.pdf", ""), DocType::OriginalBill);
        assert_eq!(DocType::classify("/misc/x.pdf", ""), DocType::Document);
    }

    #[test]
    fn doc_type_serializes_with_human_labels() {
        let json = serde_json::to_string(&DocType::FiscalNote).unwrap();
        assert_eq!(json, r#""Fiscal Note""#);

        let back: DocType = serde_json::from_str(r#""Unknown Doc""#).unwrap();
        assert_eq!(back, DocType::UnknownDoc);
    }

    #[test]
    fn manual_documents_start_imported() {
        let doc = Document::manual("Pasted testimony", DocType::Other, "text body");
        assert!(doc.imported);
        assert!(doc.id.starts_with("man-"));
        assert_eq!(doc.content, "text body");
        assert!(doc.url.is_none());
    }

    #[test]
    fn key_falls_back_to_url() {
        let doc = Document::new("", "Untitled", DocType::Document)
            .with_url("https://example.com/a.pdf");
        assert_eq!(doc.key(), "https://example.com/a.pdf");

        let with_id = Document::new("abc", "Titled", DocType::Document);
        assert_eq!(with_id.key(), "abc");
    }
}
