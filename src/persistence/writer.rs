//! Fire-and-forget snapshot writer

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, warn};

use super::{BlobStore, HISTORY_KEY, TIMERS_KEY};
use crate::{error::PersistenceError, state::AppState};

/// The two independently written slices of state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blob {
    Timers,
    History,
}

impl Blob {
    pub fn key(&self) -> &'static str {
        match self {
            Blob::Timers => TIMERS_KEY,
            Blob::History => HISTORY_KEY,
        }
    }

    fn serialize(&self, state: &AppState) -> Result<String, PersistenceError> {
        let result = match self {
            Blob::Timers => serde_json::to_string(&state.timers),
            Blob::History => serde_json::to_string(&state.history),
        };
        result.map_err(|source| PersistenceError::Serialize {
            key: self.key().to_string(),
            source,
        })
    }
}

/// Sequence bookkeeping for one key. Writes to a key run one at a time;
/// a write whose snapshot has been superseded by a later submission is
/// dropped, so at most one stale write is in flight per key.
#[derive(Debug)]
struct KeySlot {
    blob: Blob,
    submitted: AtomicU64,
    committed: Mutex<u64>,
}

impl KeySlot {
    fn new(blob: Blob) -> Self {
        Self {
            blob,
            submitted: AtomicU64::new(0),
            committed: Mutex::new(0),
        }
    }
}

/// One staged write of an immutable snapshot
pub struct PendingWrite {
    store: Arc<dyn BlobStore>,
    slot: Arc<KeySlot>,
    seq: u64,
    snapshot: Arc<AppState>,
}

impl PendingWrite {
    pub fn blob(&self) -> Blob {
        self.slot.blob
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Serialize and write the snapshot unless a later one was submitted
    pub async fn run(self) {
        let key = self.slot.blob.key();
        let mut committed = self.slot.committed.lock().await;
        let latest = self.slot.submitted.load(Ordering::SeqCst);
        if self.seq < latest {
            debug!("Skipping superseded write #{} of {} (#{} queued)", self.seq, key, latest);
            return;
        }

        let outcome = match self.slot.blob.serialize(&self.snapshot) {
            Ok(payload) => self.store.put(key, payload).await,
            Err(e) => Err(e),
        };
        *committed = self.seq;

        match outcome {
            Ok(()) => debug!("Persisted {} (write #{})", key, self.seq),
            Err(e) => warn!("Failed to persist {}: {}", key, e),
        }
    }
}

/// Spawns background writes of state snapshots, one task per key per change
#[derive(Clone)]
pub struct Persister {
    store: Arc<dyn BlobStore>,
    timers: Arc<KeySlot>,
    history: Arc<KeySlot>,
}

impl Persister {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            timers: Arc::new(KeySlot::new(Blob::Timers)),
            history: Arc::new(KeySlot::new(Blob::History)),
        }
    }

    /// Stage a write of `snapshot` to one key, taking the next sequence number
    pub fn stage(&self, blob: Blob, snapshot: Arc<AppState>) -> PendingWrite {
        let slot = match blob {
            Blob::Timers => Arc::clone(&self.timers),
            Blob::History => Arc::clone(&self.history),
        };
        let seq = slot.submitted.fetch_add(1, Ordering::SeqCst) + 1;
        PendingWrite {
            store: Arc::clone(&self.store),
            slot,
            seq,
            snapshot,
        }
    }

    /// Write both keys in the background; the caller never waits
    pub fn persist(&self, snapshot: Arc<AppState>) -> Vec<JoinHandle<()>> {
        [Blob::Timers, Blob::History]
            .into_iter()
            .map(|blob| tokio::spawn(self.stage(blob, Arc::clone(&snapshot)).run()))
            .collect()
    }

    /// Write both keys and wait for them; used for the final state on shutdown
    pub async fn flush(&self, snapshot: Arc<AppState>) {
        futures::join!(
            self.stage(Blob::Timers, Arc::clone(&snapshot)).run(),
            self.stage(Blob::History, snapshot).run(),
        );
    }
}
