//! Pipeline configuration.
//!
//! One explicit struct, constructed at application start and injected
//! into each component constructor. No component reads ambient
//! environment state.

use std::time::Duration;

use crate::feeds::FeedSource;
use crate::security::SecretString;

/// Default page bound for PDF extraction.
pub const DEFAULT_PDF_PAGE_CAP: usize = 10;

/// Default per-document character cap in assembled context.
pub const DEFAULT_PER_DOC_CHAR_CAP: usize = 3000;

/// Default cap on the whole assembled context block.
pub const DEFAULT_CONTEXT_TOTAL_CAP: usize = 24_000;

/// Content shorter than this is treated as "not imported" at assembly time.
pub const DEFAULT_MIN_CONTENT_LEN: usize = 50;

/// Default generation attempts before the gateway gives up.
pub const DEFAULT_LLM_ATTEMPTS: u32 = 3;

/// Configuration for the whole pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Published CSV export of the master bill sheet
    pub sheet_csv_url: String,

    /// Cloud-folder listing script endpoint
    pub drive_script_url: String,

    /// Shared secret expected by the script endpoint
    pub drive_script_secret: SecretString,

    /// Legislative web-service base URL (XML endpoints)
    pub legis_service_url: String,

    /// Bill-summary page base URL (HTML)
    pub bill_page_url: String,

    /// Domain substring that marks a sheet cell as a cloud-folder link
    pub cloud_domain: String,

    /// Host/path substrings a scraped document link must contain
    pub trusted_doc_hosts: Vec<String>,

    /// Pages extracted per PDF
    pub pdf_page_cap: usize,

    /// Character cap per document in assembled context
    pub per_doc_char_cap: usize,

    /// Character cap on the whole assembled context
    pub context_total_cap: usize,

    /// Minimum content length for a document to count as imported
    pub min_content_len: usize,

    /// Generation attempts before returning "assistant unavailable"
    pub llm_attempts: u32,

    /// Base delay of the gateway's exponential backoff
    pub llm_backoff_base: Duration,

    /// Quiet window before a pending edit is written through
    pub autosave_quiet: Duration,

    /// Committee names the meetings client filters for
    pub committee_names: Vec<String>,

    /// News/RSS feeds the feed monitor polls
    pub feeds: Vec<FeedSource>,
}

impl PipelineConfig {
    /// Build a config from the three deployment-specific endpoints; every
    /// other knob starts at its observed production default.
    pub fn new(
        sheet_csv_url: impl Into<String>,
        drive_script_url: impl Into<String>,
        drive_script_secret: SecretString,
    ) -> Self {
        Self {
            sheet_csv_url: sheet_csv_url.into(),
            drive_script_url: drive_script_url.into(),
            drive_script_secret,
            legis_service_url: "https://wslwebservices.leg.wa.gov/LegislationService.asmx"
                .to_string(),
            bill_page_url: "https://app.leg.wa.gov/billsummary".to_string(),
            cloud_domain: "drive.google.com".to_string(),
            trusted_doc_hosts: vec![
                "lawfilesext.leg.wa.gov".to_string(),
                "leg.wa.gov".to_string(),
            ],
            pdf_page_cap: DEFAULT_PDF_PAGE_CAP,
            per_doc_char_cap: DEFAULT_PER_DOC_CHAR_CAP,
            context_total_cap: DEFAULT_CONTEXT_TOTAL_CAP,
            min_content_len: DEFAULT_MIN_CONTENT_LEN,
            llm_attempts: DEFAULT_LLM_ATTEMPTS,
            llm_backoff_base: Duration::from_millis(1000),
            autosave_quiet: Duration::from_millis(1000),
            committee_names: vec![
                "Appropriations".to_string(),
                "Finance".to_string(),
                "Early Learning & Human Services".to_string(),
                "Innovation, Community & Economic Development, & Veterans".to_string(),
            ],
            feeds: crate::feeds::default_feeds(),
        }
    }

    /// Override the legislative web-service base URL.
    pub fn with_legis_service_url(mut self, url: impl Into<String>) -> Self {
        self.legis_service_url = url.into();
        self
    }

    /// Override the bill-summary page base URL.
    pub fn with_bill_page_url(mut self, url: impl Into<String>) -> Self {
        self.bill_page_url = url.into();
        self
    }

    /// Override the trusted host/path substrings for scraped links.
    pub fn with_trusted_doc_hosts(mut self, hosts: Vec<String>) -> Self {
        self.trusted_doc_hosts = hosts;
        self
    }

    /// Override the PDF page cap.
    pub fn with_pdf_page_cap(mut self, cap: usize) -> Self {
        self.pdf_page_cap = cap;
        self
    }

    /// Override the per-document context cap.
    pub fn with_per_doc_char_cap(mut self, cap: usize) -> Self {
        self.per_doc_char_cap = cap;
        self
    }

    /// Override the total context cap.
    pub fn with_context_total_cap(mut self, cap: usize) -> Self {
        self.context_total_cap = cap;
        self
    }

    /// Override the gateway retry budget.
    pub fn with_llm_attempts(mut self, attempts: u32) -> Self {
        self.llm_attempts = attempts;
        self
    }

    /// Override the backoff base delay.
    pub fn with_llm_backoff_base(mut self, base: Duration) -> Self {
        self.llm_backoff_base = base;
        self
    }

    /// Override the autosave quiet window.
    pub fn with_autosave_quiet(mut self, quiet: Duration) -> Self {
        self.autosave_quiet = quiet;
        self
    }

    /// Override the committee filter list.
    pub fn with_committee_names(mut self, names: Vec<String>) -> Self {
        self.committee_names = names;
        self
    }

    /// Override the feed list.
    pub fn with_feeds(mut self, feeds: Vec<FeedSource>) -> Self {
        self.feeds = feeds;
        self
    }
}
