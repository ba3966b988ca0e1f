//! Source scanners - strategies that discover candidate documents for a
//! bill from one external system each.
//!
//! Scanners fail independently: a batch scan joins every scanner's
//! result and a failing scanner contributes an empty batch plus a
//! status note, never an aborted batch.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::ScanResult;
use crate::types::{Bill, Document};

pub mod drive;
pub mod legis;
pub mod page;
pub mod sheet;

pub use drive::DriveScanner;
pub use legis::LegisScanner;
pub use page::BillPageScanner;
pub use sheet::SheetImporter;

/// One scanner's discovery result.
#[derive(Debug, Default, Clone)]
pub struct ScanBatch {
    /// Candidate documents, in discovery order
    pub candidates: Vec<Document>,

    /// Cloud-folder link, when the source knows one
    pub folder_url: Option<String>,

    /// Human-readable status line for the UI
    pub note: Option<String>,
}

impl ScanBatch {
    /// A batch carrying only a status note.
    pub fn note_only(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            ..Default::default()
        }
    }
}

/// A strategy that queries one external system for a bill's documents.
#[async_trait]
pub trait DocumentScanner: Send + Sync {
    /// Discover candidate documents for `bill`.
    async fn scan(&self, bill: &Bill) -> ScanResult<ScanBatch>;

    /// Scanner name (for logging/status lines).
    fn name(&self) -> &str;
}

/// Fan out over every scanner and join the batches in scanner order.
///
/// Each scanner's failure is isolated: it is logged, turned into a
/// status note, and the remaining scanners' candidates still come back.
pub async fn scan_all(scanners: &[Arc<dyn DocumentScanner>], bill: &Bill) -> ScanBatch {
    let results = join_all(scanners.iter().map(|scanner| async move {
        match scanner.scan(bill).await {
            Ok(batch) => {
                debug!(
                    scanner = scanner.name(),
                    bill = %bill.id,
                    candidates = batch.candidates.len(),
                    "scan completed"
                );
                batch
            }
            Err(e) => {
                warn!(scanner = scanner.name(), bill = %bill.id, error = %e, "scan failed");
                ScanBatch::note_only(format!("{} scan failed.", scanner.name()))
            }
        }
    }))
    .await;

    let mut combined = ScanBatch::default();
    let mut notes = Vec::new();
    for batch in results {
        combined.candidates.extend(batch.candidates);
        if combined.folder_url.is_none() {
            combined.folder_url = batch.folder_url;
        }
        if let Some(note) = batch.note {
            notes.push(note);
        }
    }
    if !notes.is_empty() {
        combined.note = Some(notes.join(" "));
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedScanner;
    use crate::types::DocType;

    fn doc(id: &str) -> Document {
        Document::new(id, id, DocType::Document)
    }

    #[tokio::test]
    async fn one_failing_scanner_does_not_zero_the_batch() {
        let ok = ScriptedScanner::named("drive").with_batch(ScanBatch {
            candidates: vec![doc("a"), doc("b")],
            ..Default::default()
        });
        let failing = ScriptedScanner::named("legislature").failing();
        let scanners: Vec<Arc<dyn DocumentScanner>> = vec![Arc::new(failing), Arc::new(ok)];

        let bill = Bill::new("HB 2200", "Test bill");
        let combined = scan_all(&scanners, &bill).await;

        assert_eq!(combined.candidates.len(), 2);
        assert!(combined.note.unwrap().contains("legislature scan failed"));
    }

    #[tokio::test]
    async fn batches_join_in_scanner_order() {
        let first = ScriptedScanner::named("first").with_batch(ScanBatch {
            candidates: vec![doc("a")],
            folder_url: Some("https://folder/one".into()),
            ..Default::default()
        });
        let second = ScriptedScanner::named("second").with_batch(ScanBatch {
            candidates: vec![doc("b")],
            folder_url: Some("https://folder/two".into()),
            ..Default::default()
        });
        let scanners: Vec<Arc<dyn DocumentScanner>> = vec![Arc::new(first), Arc::new(second)];

        let bill = Bill::new("HB 2200", "Test bill");
        let combined = scan_all(&scanners, &bill).await;

        let ids: Vec<_> = combined.candidates.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        // first scanner's folder link wins
        assert_eq!(combined.folder_url.as_deref(), Some("https://folder/one"));
    }
}
