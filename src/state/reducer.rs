//! State transition engine
//!
//! Every change to [`AppState`] goes through [`Reducer::reduce`], a pure
//! function of the previous state and one [`Command`]. It performs no I/O,
//! never fails, and treats unknown ids or categories as no-ops.
//!
//! ## Tick
//!
//! ```text
//! running, remaining = n > 1  ->  running, remaining = n - 1
//! running, remaining = 1      ->  completed, remaining = 0  (+ history, alert)
//! paused | completed          ->  unchanged
//! ```
//!
//! Completion is detected against the pre-tick snapshot. Under
//! [`CompletionPolicy::FirstOnly`] only the first such timer in collection
//! order is recorded; the alert slot is filled only when it is empty.

use chrono::{DateTime, Utc};

use super::{AppState, CompletedTimer, Timer, TimerId, TimerStatus};

/// Commands accepted by the reducer
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Append a timer; it always enters paused at full duration
    AddTimer(Timer),
    StartTimer { id: TimerId },
    PauseTimer { id: TimerId },
    ResetTimer { id: TimerId },
    BulkStart { category: String },
    BulkPause { category: String },
    BulkReset { category: String },
    /// Advance every running timer by one second
    Tick { now: DateTime<Utc> },
    /// Acknowledge the pending completion alert
    ClearAlert,
}

impl Command {
    /// Stamp a tick with the current wall-clock time
    pub fn tick() -> Self {
        Command::Tick { now: Utc::now() }
    }

    /// Short label used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddTimer(_) => "add-timer",
            Command::StartTimer { .. } => "start-timer",
            Command::PauseTimer { .. } => "pause-timer",
            Command::ResetTimer { .. } => "reset-timer",
            Command::BulkStart { .. } => "bulk-start",
            Command::BulkPause { .. } => "bulk-pause",
            Command::BulkReset { .. } => "bulk-reset",
            Command::Tick { .. } => "tick",
            Command::ClearAlert => "clear-alert",
        }
    }
}

/// Which timers completing on a tick get recorded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionPolicy {
    /// Only the first completion in collection order is recorded and
    /// offered to the alert slot; simultaneous completions go unrecorded
    #[default]
    FirstOnly,
    /// Every completion gets a history entry; the first is offered to the
    /// alert slot
    EveryTimer,
}

/// Pure state transition function, parameterised by completion policy
#[derive(Debug, Clone, Copy, Default)]
pub struct Reducer {
    policy: CompletionPolicy,
}

impl Reducer {
    pub fn new(policy: CompletionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> CompletionPolicy {
        self.policy
    }

    /// Compute the state that follows `state` after applying `command`
    pub fn reduce(&self, state: &AppState, command: Command) -> AppState {
        let mut next = state.clone();

        match command {
            Command::AddTimer(timer) => next.timers.push(timer.into_fresh()),
            Command::StartTimer { id } => for_id(&mut next, &id, start),
            Command::PauseTimer { id } => for_id(&mut next, &id, pause),
            Command::ResetTimer { id } => for_id(&mut next, &id, Timer::rewind),
            Command::BulkStart { category } => for_category(&mut next, &category, start),
            Command::BulkPause { category } => for_category(&mut next, &category, pause),
            Command::BulkReset { category } => for_category(&mut next, &category, Timer::rewind),
            Command::Tick { now } => self.tick(&mut next, now),
            Command::ClearAlert => next.pending_alert = None,
        }

        next
    }

    fn tick(&self, state: &mut AppState, now: DateTime<Utc>) {
        let about_to_complete = state
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.is_running() && timer.remaining == 1)
            .map(|(index, _)| index);

        let just_completed: Vec<usize> = match self.policy {
            CompletionPolicy::FirstOnly => about_to_complete.take(1).collect(),
            CompletionPolicy::EveryTimer => about_to_complete.collect(),
        };

        for timer in state.timers.iter_mut().filter(|timer| timer.is_running()) {
            timer.remaining = timer.remaining.saturating_sub(1);
            if timer.remaining == 0 {
                timer.status = TimerStatus::Completed;
            }
        }

        let completed: Vec<&Timer> = just_completed
            .iter()
            .map(|&index| &state.timers[index])
            .filter(|timer| !timer.id.as_str().is_empty() && !timer.name.is_empty())
            .collect();

        let records: Vec<CompletedTimer> = completed
            .iter()
            .map(|timer| CompletedTimer::new(timer, now))
            .collect();
        let first = completed.first().map(|timer| (*timer).clone());

        state.history.extend(records);

        if state.pending_alert.is_none() {
            state.pending_alert = first;
        }
    }
}

fn start(timer: &mut Timer) {
    if timer.status == TimerStatus::Paused {
        timer.status = TimerStatus::Running;
    }
}

// A completed timer stays completed: pausing it would leave a paused timer at zero.
fn pause(timer: &mut Timer) {
    if timer.status == TimerStatus::Running {
        timer.status = TimerStatus::Paused;
    }
}

fn for_id(state: &mut AppState, id: &TimerId, apply: impl Fn(&mut Timer)) {
    state
        .timers
        .iter_mut()
        .filter(|timer| &timer.id == id)
        .for_each(apply);
}

fn for_category(state: &mut AppState, category: &str, apply: impl Fn(&mut Timer)) {
    state
        .timers
        .iter_mut()
        .filter(|timer| timer.category == category)
        .for_each(apply);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::NewTimer;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn tick() -> Command {
        Command::Tick { now: now() }
    }

    fn timer(id: &str, category: &str, duration: u64) -> Timer {
        NewTimer::new(format!("timer {id}"), category, duration)
            .validate_with_id(TimerId::from(id))
            .unwrap()
    }

    fn start_cmd(id: &str) -> Command {
        Command::StartTimer { id: TimerId::from(id) }
    }

    fn apply(reducer: &Reducer, state: AppState, commands: Vec<Command>) -> AppState {
        commands
            .into_iter()
            .fold(state, |state, command| reducer.reduce(&state, command))
    }

    fn get<'a>(state: &'a AppState, id: &str) -> &'a Timer {
        state.timer(&TimerId::from(id)).unwrap()
    }

    #[test]
    fn add_timer_forces_paused_at_full_duration() {
        let mut incoming = timer("a", "Work", 30);
        incoming.status = TimerStatus::Running;
        incoming.remaining = 3;

        let state = Reducer::default().reduce(&AppState::new(), Command::AddTimer(incoming));

        assert_eq!(state.timers.len(), 1);
        assert_eq!(state.timers[0].status, TimerStatus::Paused);
        assert_eq!(state.timers[0].remaining, 30);
    }

    #[test]
    fn scenario_single_timer_runs_to_completion() {
        let reducer = Reducer::default();
        let state = apply(
            &reducer,
            AppState::new(),
            vec![Command::AddTimer(timer("a", "Workout", 2)), start_cmd("a"), tick()],
        );

        assert_eq!(get(&state, "a").remaining, 1);
        assert_eq!(get(&state, "a").status, TimerStatus::Running);
        assert!(state.history.is_empty());

        let state = reducer.reduce(&state, tick());

        let done = get(&state, "a");
        assert_eq!(done.remaining, 0);
        assert_eq!(done.status, TimerStatus::Completed);
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].id, TimerId::from("a"));
        assert_eq!(state.history[0].name, "timer a");
        assert_eq!(state.history[0].completed_at, now());
        assert_eq!(state.pending_alert.as_ref().map(|t| t.id.as_str()), Some("a"));
    }

    #[test]
    fn tick_decrements_every_running_timer() {
        let reducer = Reducer::default();
        let state = apply(
            &reducer,
            AppState::new(),
            vec![
                Command::AddTimer(timer("a", "Work", 5)),
                Command::AddTimer(timer("b", "Home", 9)),
                Command::AddTimer(timer("c", "Home", 9)),
                start_cmd("a"),
                start_cmd("b"),
                tick(),
            ],
        );

        assert_eq!(get(&state, "a").remaining, 4);
        assert_eq!(get(&state, "b").remaining, 8);
        assert_eq!(get(&state, "c").remaining, 9);
    }

    #[test]
    fn idle_tick_changes_nothing() {
        let reducer = Reducer::default();
        let state = apply(
            &reducer,
            AppState::new(),
            vec![Command::AddTimer(timer("a", "Work", 5))],
        );

        assert_eq!(reducer.reduce(&state, tick()), state);
    }

    #[test]
    fn start_is_noop_for_running_and_completed() {
        let reducer = Reducer::default();
        let state = apply(
            &reducer,
            AppState::new(),
            vec![Command::AddTimer(timer("a", "Work", 1)), start_cmd("a"), tick()],
        );
        assert!(get(&state, "a").is_completed());

        let after = reducer.reduce(&state, start_cmd("a"));
        assert_eq!(after, state);
    }

    #[test]
    fn pause_stops_countdown() {
        let reducer = Reducer::default();
        let state = apply(
            &reducer,
            AppState::new(),
            vec![
                Command::AddTimer(timer("a", "Work", 5)),
                start_cmd("a"),
                tick(),
                Command::PauseTimer { id: TimerId::from("a") },
                tick(),
                tick(),
            ],
        );

        assert_eq!(get(&state, "a").remaining, 4);
        assert_eq!(get(&state, "a").status, TimerStatus::Paused);
    }

    #[test]
    fn pause_leaves_completed_timer_completed() {
        let reducer = Reducer::default();
        let state = apply(
            &reducer,
            AppState::new(),
            vec![
                Command::AddTimer(timer("a", "Work", 1)),
                start_cmd("a"),
                tick(),
            ],
        );
        assert!(get(&state, "a").is_completed());

        for command in [
            Command::PauseTimer { id: TimerId::from("a") },
            Command::BulkPause { category: "Work".into() },
        ] {
            let after = reducer.reduce(&state, command);
            let done = get(&after, "a");
            assert_eq!(done.status, TimerStatus::Completed);
            assert_eq!(done.remaining, 0);
        }
    }

    #[test]
    fn reset_restores_duration_from_any_status() {
        let reducer = Reducer::default();
        let reset = Command::ResetTimer { id: TimerId::from("a") };

        let running = apply(
            &reducer,
            AppState::new(),
            vec![Command::AddTimer(timer("a", "Work", 3)), start_cmd("a"), tick()],
        );
        let completed = apply(&reducer, running.clone(), vec![tick(), tick()]);
        assert!(get(&completed, "a").is_completed());

        for state in [running, completed] {
            let after = reducer.reduce(&state, reset.clone());
            assert_eq!(get(&after, "a").remaining, 3);
            assert_eq!(get(&after, "a").status, TimerStatus::Paused);
        }
    }

    #[test]
    fn unknown_targets_are_noops() {
        let reducer = Reducer::default();
        let state = apply(
            &reducer,
            AppState::new(),
            vec![Command::AddTimer(timer("a", "Work", 3))],
        );

        for command in [
            start_cmd("missing"),
            Command::PauseTimer { id: TimerId::from("missing") },
            Command::ResetTimer { id: TimerId::from("missing") },
            Command::BulkStart { category: "Nope".into() },
            Command::BulkPause { category: "Nope".into() },
            Command::BulkReset { category: "Nope".into() },
            Command::ClearAlert,
        ] {
            assert_eq!(reducer.reduce(&state, command), state);
        }
    }

    #[test]
    fn scenario_bulk_start_then_bulk_reset() {
        let reducer = Reducer::default();
        let state = apply(
            &reducer,
            AppState::new(),
            vec![
                Command::AddTimer(timer("a", "Work", 5)),
                Command::AddTimer(timer("b", "Work", 7)),
                Command::BulkStart { category: "Work".into() },
            ],
        );
        assert!(state.timers.iter().all(Timer::is_running));

        let state = apply(
            &reducer,
            state,
            vec![tick(), tick(), Command::BulkReset { category: "Work".into() }],
        );
        assert_eq!(get(&state, "a").remaining, 5);
        assert_eq!(get(&state, "b").remaining, 7);
        assert!(state.timers.iter().all(|t| t.status == TimerStatus::Paused));
    }

    #[test]
    fn bulk_pause_only_touches_its_category() {
        let reducer = Reducer::default();
        let state = apply(
            &reducer,
            AppState::new(),
            vec![
                Command::AddTimer(timer("a", "Work", 5)),
                Command::AddTimer(timer("b", "Home", 5)),
                start_cmd("a"),
                start_cmd("b"),
                tick(),
            ],
        );
        let home_before = get(&state, "b").clone();

        let state = reducer.reduce(&state, Command::BulkPause { category: "Work".into() });

        assert_eq!(get(&state, "a").status, TimerStatus::Paused);
        assert_eq!(get(&state, "b"), &home_before);
    }

    #[test]
    fn bulk_start_leaves_completed_timers_alone() {
        let reducer = Reducer::default();
        let state = apply(
            &reducer,
            AppState::new(),
            vec![
                Command::AddTimer(timer("a", "Work", 1)),
                Command::AddTimer(timer("b", "Work", 4)),
                start_cmd("a"),
                tick(),
                Command::BulkStart { category: "Work".into() },
            ],
        );

        assert!(get(&state, "a").is_completed());
        assert_eq!(get(&state, "a").remaining, 0);
        assert!(get(&state, "b").is_running());
    }

    #[test]
    fn pending_alert_is_not_overwritten() {
        let reducer = Reducer::default();
        let state = apply(
            &reducer,
            AppState::new(),
            vec![
                Command::AddTimer(timer("a", "Work", 1)),
                Command::AddTimer(timer("b", "Work", 2)),
                Command::BulkStart { category: "Work".into() },
                tick(),
            ],
        );
        assert_eq!(state.pending_alert.as_ref().unwrap().id.as_str(), "a");

        let state = reducer.reduce(&state, tick());

        assert!(get(&state, "b").is_completed());
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.pending_alert.as_ref().unwrap().id.as_str(), "a");
    }

    #[test]
    fn scenario_clear_alert_reopens_the_slot() {
        let reducer = Reducer::default();
        let state = apply(
            &reducer,
            AppState::new(),
            vec![
                Command::AddTimer(timer("a", "Work", 1)),
                Command::AddTimer(timer("b", "Work", 1)),
                start_cmd("a"),
                tick(),
                Command::ClearAlert,
            ],
        );
        assert!(state.pending_alert.is_none());

        let state = apply(&reducer, state, vec![start_cmd("b"), tick()]);

        assert_eq!(state.pending_alert.as_ref().unwrap().id.as_str(), "b");
    }

    #[test]
    fn first_only_records_one_of_simultaneous_completions() {
        let reducer = Reducer::new(CompletionPolicy::FirstOnly);
        let state = apply(
            &reducer,
            AppState::new(),
            vec![
                Command::AddTimer(timer("a", "Work", 1)),
                Command::AddTimer(timer("b", "Work", 1)),
                Command::BulkStart { category: "Work".into() },
                tick(),
            ],
        );

        assert!(state.timers.iter().all(Timer::is_completed));
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].id.as_str(), "a");
        assert_eq!(state.pending_alert.as_ref().unwrap().id.as_str(), "a");
    }

    #[test]
    fn every_timer_policy_records_all_completions() {
        let reducer = Reducer::new(CompletionPolicy::EveryTimer);
        let state = apply(
            &reducer,
            AppState::new(),
            vec![
                Command::AddTimer(timer("a", "Work", 1)),
                Command::AddTimer(timer("b", "Work", 1)),
                Command::BulkStart { category: "Work".into() },
                tick(),
            ],
        );

        let ids: Vec<_> = state.history.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(state.pending_alert.as_ref().unwrap().id.as_str(), "a");
    }

    #[test]
    fn running_timer_at_zero_completes_on_next_tick() {
        let mut stuck = timer("a", "Work", 3);
        stuck.status = TimerStatus::Running;
        stuck.remaining = 0;
        let state = AppState {
            timers: vec![stuck],
            ..AppState::default()
        };

        let state = Reducer::default().reduce(&state, tick());

        assert!(get(&state, "a").is_completed());
        assert!(state.history.is_empty());
    }

    #[test]
    fn history_is_append_only() {
        let reducer = Reducer::default();
        let commands = vec![
            Command::AddTimer(timer("a", "Work", 1)),
            Command::AddTimer(timer("b", "Home", 2)),
            start_cmd("a"),
            tick(),
            Command::ClearAlert,
            Command::ResetTimer { id: TimerId::from("a") },
            Command::BulkStart { category: "Home".into() },
            tick(),
            tick(),
            Command::BulkReset { category: "Work".into() },
        ];

        let mut state = AppState::new();
        for command in commands {
            let next = reducer.reduce(&state, command);
            assert!(next.history.len() >= state.history.len());
            assert_eq!(&next.history[..state.history.len()], &state.history[..]);
            state = next;
        }
        assert_eq!(state.history.len(), 2);
    }
}
