//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{AppState, CategoryGroup, CompletedTimer, Timer};

/// Timer list returned by the list view and every timer command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimersResponse {
    pub timers: Vec<Timer>,
    pub running: usize,
    pub timestamp: DateTime<Utc>,
}

impl TimersResponse {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            timers: state.timers.clone(),
            running: state.running_count(),
            timestamp: Utc::now(),
        }
    }
}

/// Timers grouped per category
#[derive(Debug, Clone, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryGroup>,
}

/// Freshly added timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub status: String,
    pub message: String,
    pub timer: Timer,
}

impl CreatedResponse {
    pub fn new(timer: Timer) -> Self {
        Self {
            status: "created".to_string(),
            message: "Timer added successfully!".to_string(),
            timer,
        }
    }
}

/// Completion history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<CompletedTimer>,
}

/// The pending completion alert, if any
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertResponse {
    pub alert: Option<Timer>,
    pub message: Option<String>,
}

impl AlertResponse {
    pub fn from_state(state: &AppState) -> Self {
        let message = state
            .pending_alert
            .as_ref()
            .map(|timer| format!("Congratulations! Timer \"{}\" completed!", timer.name));
        Self {
            alert: state.pending_alert.clone(),
            message,
        }
    }
}

/// Summary of the board plus server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub timers: usize,
    pub running: usize,
    pub completed: usize,
    pub history: usize,
    pub alert_pending: bool,
    pub uptime_secs: u64,
}

/// Error body for rejected requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
