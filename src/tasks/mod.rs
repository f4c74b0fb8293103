//! Background tasks module
//!
//! This module contains background tasks that run alongside the state container.

pub mod tick_driver;

// Re-export main types
pub use tick_driver::{TickDriver, DEFAULT_TICK_PERIOD};
