//! Cloud-folder scanner.
//!
//! Asks a remote script endpoint for the file listing of the bill's
//! folder. The endpoint answers JSON; anything else is treated as an
//! access problem and surfaced as a status note, not a crash.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::config::PipelineConfig;
use crate::error::ScanResult;
use crate::fetch::RelayFetcher;
use crate::scanners::{DocumentScanner, ScanBatch};
use crate::security::SecretString;
use crate::types::{Bill, DocType, Document};

/// Script endpoint response envelope.
#[derive(Debug, Deserialize)]
struct FolderResponse {
    status: String,

    #[serde(rename = "folderUrl")]
    folder_url: Option<String>,

    #[serde(default)]
    files: Vec<DriveFile>,

    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
    url: String,
}

/// Scanner backed by the cloud-folder listing script.
pub struct DriveScanner {
    fetcher: Arc<RelayFetcher>,
    script_url: String,
    secret: SecretString,
}

impl DriveScanner {
    pub fn new(fetcher: Arc<RelayFetcher>, config: &PipelineConfig) -> Self {
        Self {
            fetcher,
            script_url: config.drive_script_url.clone(),
            secret: config.drive_script_secret.clone(),
        }
    }

    fn document_from_file(file: &DriveFile) -> Document {
        let doc_type = if file.name.to_lowercase().contains("fiscal") {
            DocType::FiscalNote
        } else {
            DocType::Document
        };
        Document::new(&file.id, &file.name, doc_type)
            .with_url(&file.url)
            .with_download_url(format!(
                "https://drive.google.com/uc?export=download&id={}",
                file.id
            ))
    }
}

#[async_trait]
impl DocumentScanner for DriveScanner {
    async fn scan(&self, bill: &Bill) -> ScanResult<ScanBatch> {
        let body = serde_json::json!({
            "action": "get_bill_files",
            "billId": bill.id,
            "secret": self.secret.expose(),
        });
        let text = self.fetcher.post_json(&self.script_url, &body).await?;

        let response: FolderResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) => {
                let preview: String = text.chars().take(50).collect();
                warn!(bill = %bill.id, preview, "folder listing returned non-JSON");
                return Ok(ScanBatch::note_only(
                    "Access denied by Drive. Check the web app's sharing settings.",
                ));
            }
        };

        if response.status != "success" {
            let note = response
                .message
                .unwrap_or_else(|| "Folder not found in Drive.".to_string());
            return Ok(ScanBatch::note_only(note));
        }

        let candidates: Vec<Document> =
            response.files.iter().map(Self::document_from_file).collect();
        let note = if candidates.is_empty() {
            "Folder found, but no files inside.".to_string()
        } else {
            format!("Synced {} files from Drive.", candidates.len())
        };

        Ok(ScanBatch {
            candidates,
            folder_url: response.folder_url,
            note: Some(note),
        })
    }

    fn name(&self) -> &str {
        "drive"
    }
}
