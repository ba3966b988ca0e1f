//! Debounced write-through of bill edits.
//!
//! Rapid edits collapse into one write: every submission replaces the
//! pending snapshot and restarts the quiet timer, and only a full quiet
//! window with no newer edit lets the write fire. Closing the saver
//! flushes whatever is still pending.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::store::BillStore;
use crate::types::Bill;

/// Handle to the background autosave task.
pub struct AutoSaver {
    tx: mpsc::UnboundedSender<Bill>,
    task: JoinHandle<()>,
}

impl AutoSaver {
    /// Spawn the saver with the given quiet window.
    pub fn spawn(store: Arc<dyn BillStore>, quiet: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Bill>();

        let task = tokio::spawn(async move {
            let mut pending: Option<Bill> = None;
            loop {
                match pending.take() {
                    None => match rx.recv().await {
                        Some(bill) => pending = Some(bill),
                        None => break,
                    },
                    Some(bill) => {
                        tokio::select! {
                            edit = rx.recv() => match edit {
                                // Newer edit wins; the timer restarts on
                                // the next loop pass.
                                Some(newer) => pending = Some(newer),
                                None => {
                                    write_through(store.as_ref(), &bill).await;
                                    break;
                                }
                            },
                            _ = tokio::time::sleep(quiet) => {
                                write_through(store.as_ref(), &bill).await;
                            }
                        }
                    }
                }
            }
        });

        Self { tx, task }
    }

    /// Queue a snapshot; restarts the quiet window.
    pub fn submit(&self, bill: Bill) {
        // A closed channel means the saver is shutting down; the final
        // flush already happened.
        let _ = self.tx.send(bill);
    }

    /// Close the edit channel and wait for the final flush.
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.task.await;
    }
}

async fn write_through(store: &dyn BillStore, bill: &Bill) {
    if let Err(e) = store.write(bill).await {
        // Availability over consistency: the session state stays
        // authoritative, the failed write is only logged.
        warn!(bill = %bill.id, error = %e, "autosave write rejected, keeping local state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingStore;
    use tokio::time::{advance, Instant};

    fn edited(summary: &str) -> Bill {
        Bill::new("HB 1234", "Test bill").with_summary(summary)
    }

    async fn settle() {
        // Let the saver task observe channel/timer wakeups.
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_collapse_into_one_write() {
        let store = Arc::new(RecordingStore::new());
        let saver = AutoSaver::spawn(store.clone(), Duration::from_millis(1000));
        let started = Instant::now();

        saver.submit(edited("one"));
        settle().await;
        advance(Duration::from_millis(200)).await;

        saver.submit(edited("two"));
        settle().await;
        advance(Duration::from_millis(200)).await;

        saver.submit(edited("three"));
        settle().await;

        // 999ms into the final quiet window: still nothing written.
        advance(Duration::from_millis(999)).await;
        settle().await;
        assert_eq!(store.write_count(), 0);

        advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.last_write().unwrap().summary, "three");
        assert_eq!(started.elapsed(), Duration::from_millis(1400));

        saver.shutdown().await;
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_edits_each_get_a_write() {
        let store = Arc::new(RecordingStore::new());
        let saver = AutoSaver::spawn(store.clone(), Duration::from_millis(1000));

        saver.submit(edited("one"));
        settle().await;
        advance(Duration::from_millis(1500)).await;
        settle().await;

        saver.submit(edited("two"));
        settle().await;
        advance(Duration::from_millis(1500)).await;
        settle().await;

        assert_eq!(store.write_count(), 2);
        assert_eq!(store.last_write().unwrap().summary, "two");

        saver.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_flushes_the_pending_edit() {
        let store = Arc::new(RecordingStore::new());
        let saver = AutoSaver::spawn(store.clone(), Duration::from_millis(1000));

        saver.submit(edited("unsaved"));
        settle().await;
        saver.shutdown().await;

        assert_eq!(store.write_count(), 1);
        assert_eq!(store.last_write().unwrap().summary, "unsaved");
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_writes_are_absorbed() {
        let store = Arc::new(RecordingStore::new().rejecting());
        let saver = AutoSaver::spawn(store.clone(), Duration::from_millis(1000));

        saver.submit(edited("doomed"));
        settle().await;
        advance(Duration::from_millis(1001)).await;
        settle().await;

        // The rejection is logged, not propagated; the saver keeps
        // accepting edits.
        assert_eq!(store.write_count(), 0);
        saver.submit(edited("again"));
        saver.shutdown().await;
    }
}
