//! Timer Board - category-grouped countdown timers
//!
//! A single state container applies commands (user actions and a global
//! one-second tick) to the timer collection, keeps an append-only
//! completion history, surfaces one completion alert at a time, and
//! snapshots state to a blob store after every change.

pub mod api;
pub mod config;
pub mod error;
pub mod persistence;
pub mod state;
pub mod store;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::{AppState, Command, Reducer};
pub use store::{StoreHandle, TimerStore};
pub use utils::signals::shutdown_signal;
