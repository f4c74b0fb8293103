//! Global tick background task

use std::time::Duration;

use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{state::Command, store::StoreHandle};

/// Default logical second
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(1000);

/// Periodic task that sends one [`Command::Tick`] per period to the store.
///
/// Missed periods (a suspended process, a busy runtime) are not caught up.
pub struct TickDriver {
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl TickDriver {
    /// Start ticking; the first tick fires one full period from now
    pub fn start(store: StoreHandle, period: Duration) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(tick_loop(store, period, stop_rx));
        Self {
            stop_tx: Some(stop_tx),
            task,
        }
    }

    /// Stop scheduling ticks and wait for the task to exit
    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            warn!("Tick driver task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

async fn tick_loop(store: StoreHandle, period: Duration, mut stop_rx: oneshot::Receiver<()>) {
    info!("Starting tick driver ({}ms period)", period.as_millis());

    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if store.submit(Command::tick()).await.is_err() {
                    debug!("Timer store closed, tick driver exiting");
                    break;
                }
            }
            _ = &mut stop_rx => {
                break;
            }
        }
    }

    info!("Tick driver stopped");
}
