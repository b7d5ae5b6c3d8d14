use serde::{Deserialize, Serialize};

use crate::preset::DurationPreset;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerPhase {
    Idle,
    Running,
    /// The countdown reached zero by ticking, as opposed to a manual reset.
    Completed,
}

impl Default for TimerPhase {
    fn default() -> Self {
        TimerPhase::Idle
    }
}

/// Result of applying one tick to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer was not running; the tick had no effect.
    Ignored,
    /// One second was consumed and the countdown continues.
    Ticked,
    /// This tick drained the countdown; the completion cue should fire.
    Completed,
}

/// The countdown state machine.
///
/// Holds no clock of its own: time only passes when [`TimerState::tick`] is
/// applied, once per elapsed second, by whoever owns the schedule. All four
/// mutations keep `remaining_seconds` within `0..=preset.total_seconds`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub preset: DurationPreset,
    pub remaining_seconds: u32,
    pub phase: TimerPhase,
}

impl TimerState {
    pub fn new(preset: DurationPreset) -> Self {
        Self {
            remaining_seconds: preset.total_seconds,
            preset,
            phase: TimerPhase::Idle,
        }
    }

    pub fn running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn completed(&self) -> bool {
        self.phase == TimerPhase::Completed
    }

    /// Switch to a different preset and restore its full duration.
    ///
    /// Applied unconditionally; the UI disables preset controls while the
    /// countdown is running, so that guard lives at the call site.
    pub fn select_preset(&mut self, preset: DurationPreset) {
        self.remaining_seconds = preset.total_seconds;
        self.preset = preset;
        self.phase = TimerPhase::Idle;
    }

    /// Start, pause, or restart depending on the current phase.
    ///
    /// From `Completed` (or anywhere with nothing left to count down) the
    /// full duration is restored first, so this restarts rather than
    /// immediately re-completing. Returns whether the timer is now running.
    pub fn toggle_running(&mut self) -> bool {
        if self.completed() || self.remaining_seconds == 0 {
            self.remaining_seconds = self.preset.total_seconds;
            self.phase = TimerPhase::Running;
        } else if self.running() {
            self.phase = TimerPhase::Idle;
        } else {
            self.phase = TimerPhase::Running;
        }
        self.running()
    }

    /// Back to idle with the full duration. Always legal, idempotent.
    pub fn reset(&mut self) {
        self.remaining_seconds = self.preset.total_seconds;
        self.phase = TimerPhase::Idle;
    }

    /// Consume one second. No-op unless running; the final tick pins the
    /// remainder at zero and moves to `Completed`.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running() {
            return TickOutcome::Ignored;
        }

        if self.remaining_seconds <= 1 {
            self.remaining_seconds = 0;
            self.phase = TimerPhase::Completed;
            TickOutcome::Completed
        } else {
            self.remaining_seconds -= 1;
            TickOutcome::Ticked
        }
    }

    /// Fraction of the countdown already consumed, as 0-100.
    pub fn progress_percent(&self) -> f64 {
        let total = self.preset.total_seconds as f64;
        (total - self.remaining_seconds as f64) / total * 100.0
    }

    /// Remaining time as `HH:MM:SS` when an hour or more is left, else `MM:SS`.
    pub fn clock(&self) -> String {
        format_clock(self.remaining_seconds)
    }
}

pub fn format_clock(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
