//! Persistence module
//!
//! Loads timers and history from a key-value blob store at startup and
//! writes snapshots back in the background after every state change.

pub mod blob_store;
pub mod loader;
pub mod writer;

/// Blob key holding the serialized timer list
pub const TIMERS_KEY: &str = "timer-board:timers";
/// Blob key holding the serialized completion history
pub const HISTORY_KEY: &str = "timer-board:history";

// Re-export main types
pub use blob_store::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use loader::load_initial_state;
pub use writer::{Blob, PendingWrite, Persister};
