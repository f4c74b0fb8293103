//! Timer Board - category-grouped countdown timers
//!
//! This is the main entry point for the timer-board application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use timer_board::{
    api::{create_router, ApiContext},
    config::Config,
    persistence::{load_initial_state, FileBlobStore, Persister},
    state::Reducer,
    store::TimerStore,
    tasks::TickDriver,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timer_board={},tower_http=info", config.log_level()))
        .init();

    info!("Starting timer-board v{}", env!("CARGO_PKG_VERSION"));
    let data_dir = config.data_dir();
    info!(
        "Configuration: host={}, port={}, data_dir={}, tick={}ms, completions={:?}",
        config.host,
        config.port,
        data_dir.display(),
        config.tick_ms,
        config.completion_policy()
    );

    // Restore persisted state; unreadable blobs just start empty
    let blobs = Arc::new(FileBlobStore::new(data_dir));
    let reducer = Reducer::new(config.completion_policy());
    let initial = load_initial_state(blobs.as_ref(), &reducer).await;

    let (store, store_task) = TimerStore::spawn(initial, reducer, Persister::new(blobs));
    let tick_driver = TickDriver::start(store.clone(), config.tick_period());

    // Create HTTP router with all endpoints
    let app = create_router(Arc::new(ApiContext::new(store.clone())));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /timers                     - List timers");
    info!("  POST   /timers                     - Add a timer");
    info!("  POST   /timers/:id/(start|pause|reset)");
    info!("  GET    /categories                 - Timers grouped by category");
    info!("  POST   /categories/:name/(start|pause|reset)");
    info!("  GET    /history                    - Completed timers");
    info!("  GET    /alert, DELETE /alert       - Completion alert");
    info!("  GET    /status, GET /health");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    tick_driver.stop().await;
    if store.shutdown().await.is_ok() {
        let final_state = store_task.await?;
        info!(
            "Final state: {} timers, {} history entries",
            final_state.timers.len(),
            final_state.history.len()
        );
    }

    info!("Shutdown complete");
    Ok(())
}
