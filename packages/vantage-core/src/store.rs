//! Bill persistence seam.
//!
//! The persisted store is an external collaborator; the pipeline only
//! needs whole-record upserts keyed by bill id and a live stream of
//! record snapshots. Writes are last-write-wins per bill, and a failed
//! write is logged while the in-memory session state stays
//! authoritative.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::StoreResult;
use crate::types::Bill;

/// Per-user, per-bill keyed record store.
#[async_trait]
pub trait BillStore: Send + Sync {
    /// Upsert one bill record, keyed by its id.
    async fn write(&self, bill: &Bill) -> StoreResult<()>;

    /// Subscribe to bill-record snapshots as they change.
    fn subscribe(&self) -> broadcast::Receiver<Bill>;
}

/// In-memory store for testing and development.
///
/// Not durable; data is lost on restart.
pub struct MemoryBillStore {
    bills: RwLock<HashMap<String, Bill>>,
    notify: broadcast::Sender<Bill>,
}

impl Default for MemoryBillStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBillStore {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(64);
        Self {
            bills: RwLock::new(HashMap::new()),
            notify,
        }
    }

    /// Look up a stored bill by id.
    pub fn get(&self, id: &str) -> Option<Bill> {
        self.bills.read().unwrap().get(id).cloned()
    }

    /// Number of stored bills.
    pub fn len(&self) -> usize {
        self.bills.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bills.read().unwrap().is_empty()
    }
}

#[async_trait]
impl BillStore for MemoryBillStore {
    async fn write(&self, bill: &Bill) -> StoreResult<()> {
        self.bills
            .write()
            .unwrap()
            .insert(bill.id.clone(), bill.clone());
        // Nobody listening is fine.
        let _ = self.notify.send(bill.clone());
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Bill> {
        self.notify.subscribe()
    }
}
