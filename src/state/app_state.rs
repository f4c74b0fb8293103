//! Application state owned by the reducer

use serde::{Deserialize, Serialize};

use super::{CompletedTimer, Timer, TimerId};

/// Everything the UI can observe: live timers, completion history, and
/// the single pending completion alert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Timers in insertion order
    pub timers: Vec<Timer>,
    /// Append-only completion log
    pub history: Vec<CompletedTimer>,
    /// At most one unacknowledged completion
    pub pending_alert: Option<Timer>,
}

/// Timers sharing one category, as the list view shows them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub timers: Vec<Timer>,
}

impl AppState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a timer by id
    pub fn timer(&self, id: &TimerId) -> Option<&Timer> {
        self.timers.iter().find(|timer| &timer.id == id)
    }

    /// Distinct categories in order of first appearance
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for timer in &self.timers {
            if !seen.contains(&timer.category.as_str()) {
                seen.push(&timer.category);
            }
        }
        seen
    }

    /// Project the timer list into per-category groups
    pub fn grouped_by_category(&self) -> Vec<CategoryGroup> {
        self.categories()
            .into_iter()
            .map(|category| CategoryGroup {
                category: category.to_string(),
                timers: self
                    .timers
                    .iter()
                    .filter(|timer| timer.category == category)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    pub fn running_count(&self) -> usize {
        self.timers.iter().filter(|timer| timer.is_running()).count()
    }

    pub fn has_pending_alert(&self) -> bool {
        self.pending_alert.is_some()
    }
}
