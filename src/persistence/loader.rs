//! Startup load of persisted timers and history

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{BlobStore, HISTORY_KEY, TIMERS_KEY};
use crate::{
    error::PersistenceError,
    state::{AppState, Command, CompletedTimer, NewTimer, Reducer, TimerId},
};

/// The parts of a persisted timer that survive a restart; progress and
/// status are reset by `AddTimer` and may be absent
#[derive(Deserialize)]
struct StoredTimer {
    id: TimerId,
    #[serde(flatten)]
    fields: NewTimer,
}

async fn read_blob<T: DeserializeOwned>(
    store: &dyn BlobStore,
    key: &str,
) -> Result<Option<T>, PersistenceError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| PersistenceError::Corrupt {
            key: key.to_string(),
            source,
        })
}

/// Fall back to the empty default for any slice that cannot be read
fn or_default<T: Default>(key: &str, result: Result<Option<T>, PersistenceError>) -> T {
    match result {
        Ok(Some(value)) => value,
        Ok(None) => {
            debug!("No persisted blob for {}, starting empty", key);
            T::default()
        }
        Err(e) => {
            warn!("Could not load {}, starting empty: {}", key, e);
            T::default()
        }
    }
}

/// Build the initial state from the blob store.
///
/// Timers are fed back through [`Command::AddTimer`], so they come back
/// paused at full duration; entries that cannot be decoded or fail
/// validation are skipped one by one.
/// History replaces the empty default wholesale. Never fails.
pub async fn load_initial_state(store: &dyn BlobStore, reducer: &Reducer) -> AppState {
    let (timers, history) = futures::join!(
        read_blob::<Vec<Value>>(store, TIMERS_KEY),
        read_blob::<Vec<CompletedTimer>>(store, HISTORY_KEY),
    );
    let timers = or_default(TIMERS_KEY, timers);
    let history = or_default(HISTORY_KEY, history);

    let mut state = AppState {
        history,
        ..AppState::default()
    };

    for (index, entry) in timers.into_iter().enumerate() {
        let stored: StoredTimer = match serde_json::from_value(entry) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Skipping unreadable persisted timer #{}: {}", index, e);
                continue;
            }
        };
        let id = stored.id.clone();
        match stored.fields.validate_with_id(stored.id) {
            Ok(timer) => state = reducer.reduce(&state, Command::AddTimer(timer)),
            Err(e) => warn!("Skipping persisted timer {}: {}", id, e),
        }
    }

    info!(
        "Loaded {} timers and {} history entries",
        state.timers.len(),
        state.history.len()
    );
    state
}
