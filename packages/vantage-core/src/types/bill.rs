//! Bill - the primary entity the dashboard organizes around.

use serde::{Deserialize, Serialize};

use super::document::Document;

/// A tracked legislative proposal.
///
/// The spreadsheet import is the system of record for the metadata
/// fields; scanners only append documents, and the user edits the
/// summary. Bills are persisted whole, keyed by id, and never deleted
/// by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    /// Free-form identifier, e.g. "HB 1234"
    pub id: String,

    /// Short title
    pub title: String,

    /// Prime sponsor
    #[serde(default)]
    pub sponsor: String,

    /// Committee of referral
    #[serde(default)]
    pub committee: String,

    /// Current status line
    #[serde(default)]
    pub status: String,

    /// Session year
    #[serde(default)]
    pub year: String,

    /// Free-text summary, user-editable
    #[serde(default)]
    pub summary: String,

    /// Associated documents, insertion-ordered, ids unique
    #[serde(default)]
    pub documents: Vec<Document>,

    /// External cloud-folder link when one is known
    #[serde(default)]
    pub folder_url: Option<String>,
}

impl Bill {
    /// Create a bill with the given id and title; everything else empty.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            sponsor: String::new(),
            committee: String::new(),
            status: String::new(),
            year: String::new(),
            summary: String::new(),
            documents: Vec::new(),
            folder_url: None,
        }
    }

    /// Set the sponsor.
    pub fn with_sponsor(mut self, sponsor: impl Into<String>) -> Self {
        self.sponsor = sponsor.into();
        self
    }

    /// Set the committee.
    pub fn with_committee(mut self, committee: impl Into<String>) -> Self {
        self.committee = committee.into();
        self
    }

    /// Set the status line.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Set the session year.
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    /// Set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Set the cloud-folder link.
    pub fn with_folder_url(mut self, url: impl Into<String>) -> Self {
        self.folder_url = Some(url.into());
        self
    }
}
