//! State container
//!
//! [`TimerStore`] owns the [`AppState`] on a single task and applies
//! commands one at a time in arrival order. Every resulting state that
//! differs from the previous one is published to watchers and handed to
//! the [`Persister`] without waiting on it. When the loop stops, the final
//! state is written once more and awaited so the last change survives exit.
//! Everything else talks to the store through a cloneable [`StoreHandle`].

use std::sync::Arc;

use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, info};

use crate::{
    error::StoreError,
    persistence::Persister,
    state::{AppState, Command, Reducer},
};

const COMMAND_BUFFER: usize = 128;

enum Message {
    Apply {
        command: Command,
        reply: Option<oneshot::Sender<Arc<AppState>>>,
    },
    Shutdown,
}

/// Single owner of the application state
pub struct TimerStore {
    state: Arc<AppState>,
    reducer: Reducer,
    persister: Persister,
    commands: mpsc::Receiver<Message>,
    snapshots: watch::Sender<Arc<AppState>>,
    changed: bool,
}

impl TimerStore {
    /// Spawn the command loop and return a handle to it.
    ///
    /// The join handle resolves with the final state once the loop stops
    /// and that state has been written to the blob store.
    pub fn spawn(
        initial: AppState,
        reducer: Reducer,
        persister: Persister,
    ) -> (StoreHandle, JoinHandle<AppState>) {
        let state = Arc::new(initial);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::clone(&state));

        let store = Self {
            state,
            reducer,
            persister,
            commands: command_rx,
            snapshots: snapshot_tx,
            changed: false,
        };
        let task = tokio::spawn(store.run());

        let handle = StoreHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        };
        (handle, task)
    }

    async fn run(mut self) -> AppState {
        info!(
            "Timer store started with {} timers, completion policy {:?}",
            self.state.timers.len(),
            self.reducer.policy()
        );

        while let Some(message) = self.commands.recv().await {
            match message {
                Message::Apply { command, reply } => {
                    self.apply(command);
                    if let Some(reply) = reply {
                        // The caller may have given up waiting; nothing to do then
                        let _ = reply.send(Arc::clone(&self.state));
                    }
                }
                Message::Shutdown => {
                    info!("Timer store shutting down");
                    break;
                }
            }
        }

        if self.changed {
            self.persister.flush(Arc::clone(&self.state)).await;
        }

        info!("Timer store stopped");
        Arc::unwrap_or_clone(self.state)
    }

    fn apply(&mut self, command: Command) {
        let label = command.name();
        let next = self.reducer.reduce(&self.state, command);
        if next == *self.state {
            return;
        }

        debug!("Applied {}", label);
        for record in &next.history[self.state.history.len()..] {
            info!("Timer '{}' ({}) completed", record.name, record.id);
        }

        let next = Arc::new(next);
        self.changed = true;
        self.state = Arc::clone(&next);
        self.snapshots.send_replace(Arc::clone(&next));
        self.persister.persist(next);
    }
}

/// Command and query handle passed to the UI surface and the tick driver
#[derive(Clone)]
pub struct StoreHandle {
    commands: mpsc::Sender<Message>,
    snapshots: watch::Receiver<Arc<AppState>>,
}

impl StoreHandle {
    /// Apply a command and wait for the state it produced
    pub async fn dispatch(&self, command: Command) -> Result<Arc<AppState>, StoreError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Message::Apply {
                command,
                reply: Some(reply_tx),
            })
            .await
            .map_err(|_| StoreError::Closed)?;
        reply_rx.await.map_err(|_| StoreError::Closed)
    }

    /// Enqueue a command without waiting for it to be applied
    pub async fn submit(&self, command: Command) -> Result<(), StoreError> {
        self.commands
            .send(Message::Apply {
                command,
                reply: None,
            })
            .await
            .map_err(|_| StoreError::Closed)
    }

    /// Latest published state
    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.snapshots.borrow())
    }

    /// Watch for state changes
    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.snapshots.clone()
    }

    /// Ask the command loop to stop after the commands already queued
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        self.commands
            .send(Message::Shutdown)
            .await
            .map_err(|_| StoreError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}
