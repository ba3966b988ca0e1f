//! Testing utilities including scripted doubles.
//!
//! These are useful for testing applications that use the pipeline
//! without making real network or AI calls. Each double serves queued
//! responses in call order and records what it saw for assertions.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::broadcast;

use crate::error::{FetchError, FetchResult, ScanError, ScanResult, StoreError, StoreResult};
use crate::fetch::Relay;
use crate::llm::GenerateModel;
use crate::scanners::{DocumentScanner, ScanBatch};
use crate::store::BillStore;
use crate::types::Bill;

/// A relay serving scripted responses instead of hitting the network.
///
/// Text responses feed both `get_text` and `post_json`; byte responses
/// feed `get_bytes`. An exhausted queue answers HTTP 599 so chains
/// under test fall through deterministically.
pub struct ScriptedRelay {
    name: String,
    texts: Mutex<VecDeque<FetchResult<String>>>,
    bytes: Mutex<VecDeque<FetchResult<Vec<u8>>>>,
    text_only: bool,
    posts: Mutex<Vec<(String, serde_json::Value)>>,
}

impl ScriptedRelay {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texts: Mutex::new(VecDeque::new()),
            bytes: Mutex::new(VecDeque::new()),
            text_only: false,
            posts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful text response.
    pub fn text(self, body: impl Into<String>) -> Self {
        self.texts.lock().unwrap().push_back(Ok(body.into()));
        self
    }

    /// Queue a failing text response with the given HTTP status.
    pub fn fail_text(self, status: u16) -> Self {
        let err = FetchError::RelayStatus {
            relay: self.name.clone(),
            status,
        };
        self.texts.lock().unwrap().push_back(Err(err));
        self
    }

    /// Queue a successful byte response.
    pub fn bytes(self, body: Vec<u8>) -> Self {
        self.bytes.lock().unwrap().push_back(Ok(body));
        self
    }

    /// Make this relay refuse binary and POST traffic, like the
    /// JSON-envelope relays do.
    pub fn text_only(mut self) -> Self {
        self.text_only = true;
        self
    }

    /// POST bodies this relay has seen, in call order.
    pub fn posts(&self) -> Vec<(String, serde_json::Value)> {
        self.posts.lock().unwrap().clone()
    }

    fn exhausted(&self) -> FetchError {
        FetchError::RelayStatus {
            relay: self.name.clone(),
            status: 599,
        }
    }
}

#[async_trait]
impl Relay for ScriptedRelay {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_text(&self, _client: &Client, _target: &str) -> FetchResult<String> {
        self.texts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(self.exhausted()))
    }

    async fn get_bytes(&self, _client: &Client, _target: &str) -> FetchResult<Vec<u8>> {
        if self.text_only {
            return Err(FetchError::Unsupported {
                relay: self.name.clone(),
                what: "binary",
            });
        }
        self.bytes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(self.exhausted()))
    }

    async fn post_json(
        &self,
        _client: &Client,
        target: &str,
        body: &serde_json::Value,
    ) -> FetchResult<String> {
        if self.text_only {
            return Err(FetchError::Unsupported {
                relay: self.name.clone(),
                what: "POST",
            });
        }
        self.posts
            .lock()
            .unwrap()
            .push((target.to_string(), body.clone()));
        self.texts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(self.exhausted()))
    }
}

/// A scanner serving scripted batches, or failing on every call.
pub struct ScriptedScanner {
    name: String,
    batches: Mutex<VecDeque<ScanBatch>>,
    failing: bool,
}

impl ScriptedScanner {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            batches: Mutex::new(VecDeque::new()),
            failing: false,
        }
    }

    /// Queue a discovery batch.
    pub fn with_batch(self, batch: ScanBatch) -> Self {
        self.batches.lock().unwrap().push_back(batch);
        self
    }

    /// Make every scan call fail.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }
}

#[async_trait]
impl DocumentScanner for ScriptedScanner {
    async fn scan(&self, _bill: &Bill) -> ScanResult<ScanBatch> {
        if self.failing {
            return Err(ScanError::Malformed {
                endpoint: self.name.clone(),
                detail: "scripted failure".to_string(),
            });
        }
        Ok(self
            .batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A generation model serving scripted answers and counting calls.
///
/// With nothing scripted, every call fails - handy for retry-budget
/// tests.
#[derive(Default)]
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<String, String>>>,
    calls: AtomicU32,
    last_system: Mutex<Option<String>>,
    last_prompt: Mutex<Option<String>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful answer.
    pub fn then_answer(self, text: impl Into<String>) -> Self {
        self.script.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.script.lock().unwrap().push_back(Err(message.into()));
        self
    }

    /// How many times `generate` was called.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// The system instruction of the most recent call.
    pub fn last_system_instruction(&self) -> Option<String> {
        self.last_system.lock().unwrap().clone()
    }

    /// The prompt of the most recent call.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerateModel for ScriptedModel {
    async fn generate(
        &self,
        system_instruction: &str,
        prompt: &str,
    ) -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_system.lock().unwrap() = Some(system_instruction.to_string());
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());

        match self.script.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(message.into()),
            None => Err("no scripted response".into()),
        }
    }
}

/// A bill store recording every accepted write.
pub struct RecordingStore {
    writes: Mutex<Vec<Bill>>,
    rejecting: bool,
    notify: broadcast::Sender<Bill>,
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingStore {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(64);
        Self {
            writes: Mutex::new(Vec::new()),
            rejecting: false,
            notify,
        }
    }

    /// Make every write fail.
    pub fn rejecting(mut self) -> Self {
        self.rejecting = true;
        self
    }

    /// Number of accepted writes.
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    /// The most recently accepted write.
    pub fn last_write(&self) -> Option<Bill> {
        self.writes.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl BillStore for RecordingStore {
    async fn write(&self, bill: &Bill) -> StoreResult<()> {
        if self.rejecting {
            return Err(StoreError::Write("rejected by test double".to_string()));
        }
        self.writes.lock().unwrap().push(bill.clone());
        let _ = self.notify.send(bill.clone());
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Bill> {
        self.notify.subscribe()
    }
}
