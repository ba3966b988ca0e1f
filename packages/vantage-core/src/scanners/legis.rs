//! Legislative web-service scanner.
//!
//! Queries the biennium/bill-number-keyed XML endpoint for the three
//! well-known document URLs and pre-extracts text from any that point
//! at a PDF, so those documents arrive already imported.

use std::sync::Arc;

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use crate::config::PipelineConfig;
use crate::error::ScanResult;
use crate::fetch::RelayFetcher;
use crate::pdf::PdfExtractor;
use crate::scanners::{DocumentScanner, ScanBatch};
use crate::types::{Bill, DocType, Document};

/// Well-known child elements and the document type each carries.
const DOCUMENT_TAGS: [(&str, DocType, &str); 3] = [
    ("OriginalDocumentUrl", DocType::OriginalBill, "Original Bill"),
    ("BillReportUrl", DocType::BillReport, "Bill Report"),
    ("FiscalNoteUrl", DocType::FiscalNote, "Fiscal Note"),
];

/// Scanner backed by the legislative web service.
pub struct LegisScanner {
    fetcher: Arc<RelayFetcher>,
    pdf: Arc<PdfExtractor>,
    base_url: String,
}

impl LegisScanner {
    pub fn new(
        fetcher: Arc<RelayFetcher>,
        pdf: Arc<PdfExtractor>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            pdf,
            base_url: config.legis_service_url.clone(),
        }
    }

    fn request_url(&self, bill: &Bill) -> String {
        let number = bill.id.split_whitespace().last().unwrap_or(&bill.id);
        format!(
            "{}/GetDocumentUrls?biennium={}&billNumber={}",
            self.base_url,
            biennium(&bill.year),
            number
        )
    }
}

#[async_trait]
impl DocumentScanner for LegisScanner {
    async fn scan(&self, bill: &Bill) -> ScanResult<ScanBatch> {
        let xml = self.fetcher.get_text(&self.request_url(bill)).await?;

        let mut candidates = Vec::new();
        for (tag, doc_type, label) in DOCUMENT_TAGS {
            let Some(url) = first_tag_text(&xml, tag) else {
                continue;
            };
            let mut doc = Document::new(url.clone(), format!("{} {}", bill.id, label), doc_type)
                .with_url(url.clone());

            if url.to_lowercase().ends_with(".pdf") {
                match self.pdf.extract(&url).await {
                    Ok(text) if !text.trim().is_empty() => doc = doc.with_content(text),
                    Ok(_) => warn!(url, "PDF extracted to empty text, leaving unimported"),
                    Err(e) => warn!(url, error = %e, "pre-extraction failed, leaving unimported"),
                }
            }
            candidates.push(doc);
        }

        Ok(ScanBatch {
            candidates,
            ..Default::default()
        })
    }

    fn name(&self) -> &str {
        "legislature"
    }
}

/// Session years are keyed as two-year bienniums starting on odd years,
/// e.g. "2025-26".
fn biennium(year: &str) -> String {
    let y: i32 = year.trim().parse().unwrap_or(2025);
    let start = if y % 2 == 1 { y } else { y - 1 };
    format!("{}-{:02}", start, (start + 1) % 100)
}

/// Text content of the first element named `tag`, if any.
fn first_tag_text(xml: &str, tag: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut inside = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == tag.as_bytes() => inside = true,
            Ok(Event::Text(t)) if inside => {
                let text = t.unescape().ok()?.trim().to_string();
                if !text.is_empty() {
                    return Some(text);
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == tag.as_bytes() => inside = false,
            Ok(Event::Eof) => return None,
            Err(_) => return None,
            _ => {}
        }
    }
}
