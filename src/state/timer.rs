//! Timer entity and completion history record

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Opaque timer identifier, assigned once at creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(String);

impl TimerId {
    /// Generate a fresh identifier that is never reused
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TimerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TimerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of a countdown timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Paused,
    Running,
    Completed,
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimerStatus::Paused => "paused",
            TimerStatus::Running => "running",
            TimerStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// One countdown timer.
///
/// `remaining` stays within `[0, duration]`; a timer at zero is always
/// `Completed` and a `Completed` timer is always at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: TimerId,
    pub name: String,
    pub category: String,
    /// Total seconds, fixed at creation
    pub duration: u64,
    pub remaining: u64,
    pub status: TimerStatus,
    /// Reserved: no transition reacts to the half-way point yet
    #[serde(default)]
    pub halfway_alert: bool,
}

impl Timer {
    /// Fraction of the countdown still left, 1.0 for a fresh timer
    pub fn progress(&self) -> f64 {
        if self.duration == 0 {
            return 0.0;
        }
        self.remaining as f64 / self.duration as f64
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn is_completed(&self) -> bool {
        self.status == TimerStatus::Completed
    }

    /// A start control is only meaningful for a paused timer
    pub fn can_start(&self) -> bool {
        self.status == TimerStatus::Paused
    }

    pub fn can_pause(&self) -> bool {
        self.is_running()
    }

    /// Put the timer back at its full duration, paused
    pub(crate) fn rewind(&mut self) {
        self.remaining = self.duration;
        self.status = TimerStatus::Paused;
    }

    /// Coerce a timer into the shape it has when first added
    pub(crate) fn into_fresh(mut self) -> Self {
        self.rewind();
        self
    }
}

/// Add-timer form input, validated before any command is built
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimer {
    pub name: String,
    pub category: String,
    pub duration: u64,
    #[serde(default)]
    pub halfway_alert: bool,
}

impl NewTimer {
    pub fn new(name: impl Into<String>, category: impl Into<String>, duration: u64) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            duration,
            halfway_alert: false,
        }
    }

    pub fn with_halfway_alert(mut self, enabled: bool) -> Self {
        self.halfway_alert = enabled;
        self
    }

    /// Check the input and build a paused timer with a fresh id
    pub fn validate(self) -> Result<Timer, ValidationError> {
        self.validate_with_id(TimerId::generate())
    }

    pub(crate) fn validate_with_id(self, id: TimerId) -> Result<Timer, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        if self.duration == 0 {
            return Err(ValidationError::NonPositiveDuration);
        }

        Ok(Timer {
            id,
            name: self.name,
            category: self.category,
            duration: self.duration,
            remaining: self.duration,
            status: TimerStatus::Paused,
            halfway_alert: self.halfway_alert,
        })
    }
}

/// History record appended once per completion event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTimer {
    pub id: TimerId,
    /// Name snapshot taken when the completion was detected
    pub name: String,
    pub completed_at: DateTime<Utc>,
}

impl CompletedTimer {
    pub fn new(timer: &Timer, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: timer.id.clone(),
            name: timer.name.clone(),
            completed_at,
        }
    }
}
