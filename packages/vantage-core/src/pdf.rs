//! PDF text extraction.
//!
//! Fetches the binary through the relay chain (pass-through relays
//! only) and extracts text on a blocking thread. Output is bounded to
//! the first `page_cap` pages, each prefixed with a page marker so
//! downstream consumers can cite page numbers.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::DEFAULT_PDF_PAGE_CAP;
use crate::error::{ExtractError, ExtractResult};
use crate::fetch::RelayFetcher;

/// Relay-fetching, page-bounded PDF text extractor.
pub struct PdfExtractor {
    fetcher: Arc<RelayFetcher>,
    page_cap: usize,
}

impl PdfExtractor {
    pub fn new(fetcher: Arc<RelayFetcher>) -> Self {
        Self {
            fetcher,
            page_cap: DEFAULT_PDF_PAGE_CAP,
        }
    }

    /// Bound the number of extracted pages.
    pub fn with_page_cap(mut self, cap: usize) -> Self {
        self.page_cap = cap;
        self
    }

    /// Extract page-marked text from the PDF at `url`.
    ///
    /// Whole-document failure (fetch, corrupt file) is an error, never
    /// partial garbage. Callers wanting the lenient contract map the
    /// error to "no text available".
    pub async fn extract(&self, url: &str) -> ExtractResult<String> {
        let bytes = self.fetcher.get_bytes(url).await?;
        debug!(url, len = bytes.len(), "PDF fetched, extracting text");

        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes)
        })
        .await
        .map_err(|e| ExtractError::Pdf(format!("extraction task failed: {e}")))?
        .map_err(|e| {
            warn!(url, error = %e, "PDF extraction failed");
            ExtractError::Pdf(e.to_string())
        })?;

        Ok(paginate(&text, self.page_cap))
    }
}

/// Split extracted text on form-feed page boundaries, keep the first
/// `page_cap` pages, and prefix each with a citable `[Page N]` marker.
fn paginate(text: &str, page_cap: usize) -> String {
    let mut out = String::new();
    for (i, page) in text.split('\x0C').enumerate() {
        if i >= page_cap {
            break;
        }
        let page = page.trim();
        if page.is_empty() {
            continue;
        }
        out.push_str(&format!("\n[Page {}]\n{}", i + 1, page));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_get_citable_markers() {
        let text = "first page\x0Csecond page\x0Cthird page";
        let out = paginate(text, 10);
        assert!(out.contains("[Page 1]\nfirst page"));
        assert!(out.contains("[Page 2]\nsecond page"));
        assert!(out.contains("[Page 3]\nthird page"));
    }

    #[test]
    fn page_cap_bounds_the_output() {
        let text = "a\x0Cb\x0Cc\x0Cd";
        let out = paginate(text, 2);
        assert!(out.contains("[Page 2]"));
        assert!(!out.contains("[Page 3]"));
    }

    #[test]
    fn blank_pages_keep_their_numbers() {
        let text = "a\x0C   \x0Cc";
        let out = paginate(text, 10);
        assert!(out.contains("[Page 1]\na"));
        assert!(!out.contains("[Page 2]"));
        assert!(out.contains("[Page 3]\nc"));
    }
}
