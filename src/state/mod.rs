//! State management module
//!
//! This module contains the timer entities, the application state, and the
//! reducer that owns every transition between states.

pub mod app_state;
pub mod reducer;
pub mod timer;

// Re-export main types
pub use app_state::{AppState, CategoryGroup};
pub use reducer::{Command, CompletionPolicy, Reducer};
pub use timer::{CompletedTimer, NewTimer, Timer, TimerId, TimerStatus};
