//! Bill-summary page scanner.
//!
//! Walks the anchor elements of the public bill-summary page and keeps
//! PDF links pointing into trusted hosts. Classification comes from
//! path-segment keywords with the same precedence the other scanners
//! use.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::config::PipelineConfig;
use crate::error::{ScanError, ScanResult};
use crate::fetch::RelayFetcher;
use crate::scanners::{DocumentScanner, ScanBatch};
use crate::types::{Bill, DocType, Document};

/// Anchor text shorter than this is not a usable title; fall back to
/// the filename.
const MIN_TITLE_LEN: usize = 10;

/// Scanner that scrapes the bill-summary page for trusted PDF links.
pub struct BillPageScanner {
    fetcher: Arc<RelayFetcher>,
    base_url: String,
    trusted: Vec<String>,
}

impl BillPageScanner {
    pub fn new(fetcher: Arc<RelayFetcher>, config: &PipelineConfig) -> Self {
        Self {
            fetcher,
            base_url: config.bill_page_url.clone(),
            trusted: config.trusted_doc_hosts.clone(),
        }
    }

    fn page_url(&self, bill: &Bill) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("bill", &bill.id)
            .append_pair("year", &bill.year)
            .finish();
        format!("{}?{}", self.base_url, query)
    }

    /// Pull candidate documents out of the fetched page.
    ///
    /// Synchronous on purpose: the parse tree is built and dropped
    /// without crossing an await point.
    fn extract_candidates(&self, page_url: &Url, html: &str) -> Vec<Document> {
        let document = Html::parse_document(html);
        let Ok(anchors) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        let mut candidates = Vec::new();
        for anchor in document.select(&anchors) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Ok(resolved) = page_url.join(href) else {
                continue;
            };
            if !resolved.path().to_lowercase().ends_with(".pdf") {
                continue;
            }
            let link = resolved.to_string();
            if !self.trusted.iter().any(|t| link.contains(t)) {
                debug!(link, "skipping PDF outside trusted hosts");
                continue;
            }

            let text = anchor.text().collect::<String>().trim().to_string();
            let doc_type = DocType::classify(resolved.path(), &text);
            let title = if text.len() >= MIN_TITLE_LEN {
                text
            } else {
                filename_title(&resolved)
            };

            candidates.push(Document::new(link.clone(), title, doc_type).with_url(link));
        }
        candidates
    }
}

#[async_trait]
impl DocumentScanner for BillPageScanner {
    async fn scan(&self, bill: &Bill) -> ScanResult<ScanBatch> {
        let page_url = self.page_url(bill);
        let html = self.fetcher.get_text(&page_url).await?;

        let base = Url::parse(&page_url).map_err(|e| ScanError::Malformed {
            endpoint: "bill page".to_string(),
            detail: e.to_string(),
        })?;

        Ok(ScanBatch {
            candidates: self.extract_candidates(&base, &html),
            ..Default::default()
        })
    }

    fn name(&self) -> &str {
        "bill page"
    }
}

/// Derive a title from the URL's filename when the anchor text is too
/// short to stand alone.
fn filename_title(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|name| {
            name.trim_end_matches(".pdf")
                .trim_end_matches(".PDF")
                .replace("%20", " ")
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "Untitled Document".to_string())
}
