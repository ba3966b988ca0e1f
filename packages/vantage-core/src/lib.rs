//! Legislative Bill-Tracking Document Pipeline
//!
//! Vantage aggregates a legislative office's bill-tracking data: bill
//! metadata imported from a published spreadsheet, documents discovered
//! across external systems, text extracted from PDFs, and bounded
//! context assembled for a generative-text assistant.
//!
//! # Design Philosophy
//!
//! **"Degrade, never crash"**
//!
//! - Every external system is best-effort; failures become status
//!   lines, empty batches, or `None`, not exceptions
//! - The spreadsheet is the system of record; scanners only enrich
//! - Merging is idempotent: rescanning an unchanged source is a no-op
//! - The assistant is asked, never trusted: missing document text gets
//!   an explicit "ask the user" placeholder, not hallucinated content
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vantage_core::{
//!     BillSession, ContextAssembler, DriveScanner, LlmGateway, PdfExtractor,
//!     PipelineConfig, RelayFetcher, SheetImporter,
//! };
//!
//! let config = PipelineConfig::new(sheet_url, script_url, script_secret);
//! let fetcher = Arc::new(RelayFetcher::new());
//!
//! // Bills come from the master sheet...
//! let bills = SheetImporter::new(fetcher.clone(), &config).fetch_bills().await?;
//!
//! // ...and each workspace scans, imports, and chats over one bill.
//! let mut session = BillSession::open(bills.remove(0), store, fetcher.clone(),
//!     pdf, ContextAssembler::new(), LlmGateway::new(gemini), config.autosave_quiet);
//! session.scan(&scanners).await;
//! let answer = session.ask("What does this bill do?", RoleContext::Policy).await;
//! ```
//!
//! # Modules
//!
//! - [`types`] - Bill, document, and chat data types
//! - [`config`] - The injected pipeline configuration
//! - [`fetch`] - Relay-routed remote fetching
//! - [`csv`] - Sheet-export row tokenizer
//! - [`pdf`] - Page-bounded PDF text extraction
//! - [`registry`] - Per-bill deduplicated document collection
//! - [`scanners`] - Source scanners (sheet, drive, legislature, bill page)
//! - [`context`] - Bounded LLM context assembly
//! - [`llm`] - Role-scoped gateway with bounded retry
//! - [`store`] - Persistence seam and in-memory reference store
//! - [`security`] - Secret handling for keys and shared secrets
//! - [`autosave`] - Debounced write-through of edits
//! - [`session`] - One bill's workspace
//! - [`feeds`] - News/RSS feed monitor
//! - [`meetings`] - Committee meeting schedule
//! - [`testing`] - Scripted doubles for application tests

pub mod autosave;
pub mod config;
pub mod context;
pub mod csv;
pub mod error;
pub mod feeds;
pub mod fetch;
pub mod llm;
pub mod meetings;
pub mod pdf;
pub mod registry;
pub mod scanners;
pub mod security;
pub mod session;
pub mod store;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use error::{
    ExtractError, FetchError, PipelineError, Result, ScanError, StoreError,
};
pub use types::{Bill, ChatRole, ChatTurn, DocType, Document};

pub use autosave::AutoSaver;
pub use config::PipelineConfig;
pub use context::ContextAssembler;
pub use csv::parse_line;
pub use feeds::{FeedItem, FeedScanner, FeedSource};
pub use fetch::{AllOriginsRelay, CorsProxyRelay, Relay, RelayFetcher};
pub use llm::{GenerateModel, LlmGateway, RoleContext};
pub use meetings::{AgendaItem, CommitteeMeeting, MeetingsClient};
pub use pdf::PdfExtractor;
pub use registry::DocumentRegistry;
pub use scanners::{
    scan_all, BillPageScanner, DocumentScanner, DriveScanner, LegisScanner, ScanBatch,
    SheetImporter,
};
pub use security::SecretString;
pub use session::BillSession;
pub use store::{BillStore, MemoryBillStore};
