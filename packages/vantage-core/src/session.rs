//! Bill workspace session.
//!
//! Owns one bill's working state: the document registry, the selection,
//! the chat log, a status line, and the session cancellation token.
//! Every mutation funnels through here so the debounced autosave sees a
//! consistent snapshot, and an in-flight scan of a closed session can
//! never mutate state after close.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::autosave::AutoSaver;
use crate::context::ContextAssembler;
use crate::fetch::RelayFetcher;
use crate::llm::{GenerateModel, LlmGateway, RoleContext};
use crate::pdf::PdfExtractor;
use crate::registry::DocumentRegistry;
use crate::scanners::{scan_all, DocumentScanner};
use crate::store::BillStore;
use crate::types::{Bill, ChatRole, ChatTurn, DocType, Document};

/// One bill's workspace.
pub struct BillSession<M> {
    bill: Bill,
    registry: DocumentRegistry,
    chat: Vec<ChatTurn>,
    status: Option<String>,
    cancel: CancellationToken,
    autosaver: AutoSaver,
    assembler: ContextAssembler,
    gateway: LlmGateway<M>,
    fetcher: Arc<RelayFetcher>,
    pdf: Arc<PdfExtractor>,
}

impl<M: GenerateModel> BillSession<M> {
    /// Open a workspace for `bill`.
    ///
    /// The bill's persisted document list seeds the registry; duplicate
    /// keys from older clients are dropped on the way in.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        mut bill: Bill,
        store: Arc<dyn BillStore>,
        fetcher: Arc<RelayFetcher>,
        pdf: Arc<PdfExtractor>,
        assembler: ContextAssembler,
        gateway: LlmGateway<M>,
        autosave_quiet: std::time::Duration,
    ) -> Self {
        let registry = DocumentRegistry::from_documents(std::mem::take(&mut bill.documents));
        info!(bill = %bill.id, documents = registry.len(), "workspace opened");
        Self {
            bill,
            registry,
            chat: Vec::new(),
            status: None,
            cancel: CancellationToken::new(),
            autosaver: AutoSaver::spawn(store, autosave_quiet),
            assembler,
            gateway,
            fetcher,
            pdf,
        }
    }

    /// Run every scanner and merge the discoveries.
    ///
    /// The duplicate check runs at insert time, after the awaits, so a
    /// manual add that landed mid-scan is seen. A cancelled session
    /// discards the scan result without touching the registry.
    pub async fn scan(&mut self, scanners: &[Arc<dyn DocumentScanner>]) -> usize {
        let batch = tokio::select! {
            // Cancellation wins over a simultaneously-ready scan.
            biased;
            _ = self.cancel.cancelled() => {
                debug!(bill = %self.bill.id, "session closed, discarding scan");
                return 0;
            }
            batch = scan_all(scanners, &self.bill) => batch,
        };

        let inserted = self.registry.merge_insert(batch.candidates);
        if let Some(folder) = batch.folder_url {
            self.bill.folder_url = Some(folder);
        }
        if let Some(note) = batch.note {
            self.status = Some(note);
        }
        if inserted > 0 {
            self.queue_save();
        }
        info!(bill = %self.bill.id, inserted, "scan merged");
        inserted
    }

    /// Fetch and store a document's text.
    ///
    /// PDFs go through the page-bounded extractor, everything else
    /// through the relay chain as text. Failure leaves the document
    /// unimported and sets a status line; the context assembler's
    /// manual-paste fallback takes over from there.
    pub async fn import_document(&mut self, key: &str) -> bool {
        let Some(doc) = self.registry.get(key).cloned() else {
            return false;
        };
        let Some(target) = doc.download_url.clone().or_else(|| doc.url.clone()) else {
            self.status = Some(format!("No source link for {}.", doc.title));
            return false;
        };

        self.status = Some(format!("Importing {}...", doc.title));
        let text = if looks_like_pdf(&doc, &target) {
            self.pdf.extract(&target).await.ok()
        } else {
            self.fetcher.get_text(&target).await.ok()
        };

        if self.cancel.is_cancelled() {
            debug!(bill = %self.bill.id, key, "session closed, discarding import");
            return false;
        }

        match text {
            Some(content) => {
                self.registry.mark_imported(key, &content);
                self.status = Some("Imported to database.".to_string());
                self.queue_save();
                true
            }
            None => {
                self.status =
                    Some("Import failed. The assistant will use metadata only.".to_string());
                false
            }
        }
    }

    /// Append a user-authored document; it is imported from the start.
    pub fn add_manual_document(
        &mut self,
        title: impl Into<String>,
        doc_type: DocType,
        text: impl Into<String>,
    ) -> String {
        let doc = Document::manual(title, doc_type, text);
        let key = doc.key().to_string();
        self.registry.merge_insert(vec![doc]);
        self.queue_save();
        key
    }

    /// Toggle a document in or out of the chat selection.
    pub fn toggle_selection(&mut self, key: &str) -> bool {
        self.registry.toggle_selection(key)
    }

    /// Replace the summary text; queues an autosave.
    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.bill.summary = summary.into();
        self.queue_save();
    }

    /// Ask the assistant about this bill.
    ///
    /// Context is assembled from the current selection. `None` means
    /// the assistant is unavailable; the question stays in the log so
    /// the user can retry.
    pub async fn ask(&mut self, question: &str, role: RoleContext) -> Option<String> {
        // Prior turns become the history summary; the question itself
        // rides in the prompt.
        let history = render_history(&self.chat);
        self.chat.push(ChatTurn::user(question));

        let context = self.assembler.assemble(
            &self.bill,
            &self.bill.summary,
            &self.registry.selected(),
            history.as_deref(),
        );
        let prompt = format!("Context:\n{}\n\nUser Question: {}", context, question);

        match self.gateway.generate(&prompt, role).await {
            Some(answer) => {
                self.chat.push(ChatTurn::assistant(answer.clone()));
                Some(answer)
            }
            None => {
                self.status = Some("I'm having trouble connecting. Try again shortly.".to_string());
                None
            }
        }
    }

    /// Current bill state with the registry's document list attached.
    pub fn snapshot(&self) -> Bill {
        let mut bill = self.bill.clone();
        bill.documents = self.registry.documents().cloned().collect();
        bill
    }

    /// The workspace bill (documents live in the registry).
    pub fn bill(&self) -> &Bill {
        &self.bill
    }

    /// The per-bill document registry.
    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    /// The session chat log.
    pub fn chat_log(&self) -> &[ChatTurn] {
        &self.chat
    }

    /// Latest status line for the UI.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Cancel in-flight work; their results will be discarded.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Close and wait for the final autosave flush.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.autosaver.submit(self.snapshot());
        self.autosaver.shutdown().await;
    }

    fn queue_save(&self) {
        self.autosaver.submit(self.snapshot());
    }
}

fn looks_like_pdf(doc: &Document, target: &str) -> bool {
    doc.title.to_lowercase().ends_with(".pdf")
        || target.to_lowercase().ends_with(".pdf")
        || doc.doc_type == DocType::FiscalNote
}

fn render_history(turns: &[ChatTurn]) -> Option<String> {
    if turns.is_empty() {
        return None;
    }
    Some(
        turns
            .iter()
            .map(|turn| match turn.role {
                ChatRole::User => format!("User: {}", turn.text),
                ChatRole::Assistant => format!("Assistant: {}", turn.text),
            })
            .collect::<Vec<_>>()
            .join("\n"),
    )
}
