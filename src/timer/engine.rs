use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, ensure, Result};
use log::info;
use serde::Serialize;
use tokio::{sync::Mutex, task::JoinHandle, time};

use crate::preset::DurationPreset;

use super::state::{TickOutcome, TimerState};

/// Capability invoked once per `Running -> Completed` transition.
///
/// Implementations must be non-blocking and must swallow their own failures;
/// whether the cue actually fired never feeds back into the timer state.
pub trait CompletionNotifier: Send + Sync {
    fn notify(&self);
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub remaining_seconds: u32,
    pub progress_percent: f64,
    pub clock: String,
}

impl TimerSnapshot {
    fn of(state: &TimerState) -> Self {
        Self {
            remaining_seconds: state.remaining_seconds,
            progress_percent: state.progress_percent(),
            clock: state.clock(),
            state: state.clone(),
        }
    }
}

/// Owns the countdown state and the once-per-second tick task.
///
/// The ticker runs only while the timer does: every transition out of
/// `Running` (pause, reset, preset change, completion, shutdown) aborts the
/// task before the state change is considered settled, so a stale tick can
/// never drain time after a pause. The tick loop itself re-checks the phase
/// under the lock before decrementing, which makes an already-delivered late
/// tick a no-op as well.
#[derive(Clone)]
pub struct TimerEngine {
    state: Arc<Mutex<TimerState>>,
    presets: Arc<Vec<DurationPreset>>,
    notifier: Arc<dyn CompletionNotifier>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
}

impl TimerEngine {
    pub fn new(presets: Vec<DurationPreset>, notifier: Arc<dyn CompletionNotifier>) -> Result<Self> {
        ensure!(!presets.is_empty(), "preset table must not be empty");
        ensure!(
            presets.iter().all(|p| p.total_seconds > 0),
            "preset durations must be greater than zero"
        );

        let initial = presets[0].clone();
        Ok(Self {
            state: Arc::new(Mutex::new(TimerState::new(initial))),
            presets: Arc::new(presets),
            notifier,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
        })
    }

    /// The configured preset table, in display order.
    pub fn presets(&self) -> &[DurationPreset] {
        &self.presets
    }

    /// Read-only view for rendering; the sole interface the UI consumes.
    pub async fn snapshot(&self) -> TimerSnapshot {
        let state = self.state.lock().await;
        TimerSnapshot::of(&state)
    }

    /// Switch to the preset at `index` in the configured table.
    ///
    /// Rejects an out-of-range index; everything else is applied
    /// unconditionally (the running-guard is the UI's concern).
    pub async fn select_preset(&self, index: usize) -> Result<TimerSnapshot> {
        let preset = self
            .presets
            .get(index)
            .cloned()
            .ok_or_else(|| anyhow!("no preset at index {index}"))?;

        self.cancel_ticker().await;
        let mut state = self.state.lock().await;
        state.select_preset(preset);
        Ok(TimerSnapshot::of(&state))
    }

    /// Start, pause, or restart. Spawns the tick task when the timer ends up
    /// running, and tears it down when it ends up paused.
    pub async fn toggle_running(&self) -> TimerSnapshot {
        self.cancel_ticker().await;

        let (snapshot, now_running) = {
            let mut state = self.state.lock().await;
            let now_running = state.toggle_running();
            (TimerSnapshot::of(&state), now_running)
        };

        if now_running {
            self.spawn_ticker().await;
        }
        snapshot
    }

    pub async fn reset(&self) -> TimerSnapshot {
        self.cancel_ticker().await;
        let mut state = self.state.lock().await;
        state.reset();
        TimerSnapshot::of(&state)
    }

    /// Apply a single one-second tick. The internal tick task drives this
    /// while running; an embedding host may also call it directly.
    pub async fn tick(&self) -> TickOutcome {
        let mut state = self.state.lock().await;
        apply_tick(&mut state, self.notifier.as_ref())
    }

    /// Cancel any outstanding tick; called when the UI unmounts.
    pub async fn shutdown(&self) {
        self.cancel_ticker().await;
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let notifier = self.notifier.clone();
        let period = self.tick_interval;

        let handle = tokio::spawn(async move {
            // First tick one full period after start, not immediately.
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            loop {
                interval.tick().await;

                let mut guard = state.lock().await;
                if !guard.running() {
                    break;
                }
                if apply_tick(&mut guard, notifier.as_ref()) == TickOutcome::Completed {
                    break;
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }
}

fn apply_tick(state: &mut TimerState, notifier: &dyn CompletionNotifier) -> TickOutcome {
    let outcome = state.tick();
    if outcome == TickOutcome::Completed {
        info!("countdown finished for preset '{}'", state.preset.label);
        notifier.notify();
    }
    outcome
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::timer::state::TimerPhase;

    #[derive(Default)]
    struct CountingNotifier(AtomicUsize);

    impl CompletionNotifier for CountingNotifier {
        fn notify(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn engine_with(seconds: &[u32]) -> (TimerEngine, Arc<CountingNotifier>) {
        let notifier = Arc::new(CountingNotifier::default());
        let presets = seconds
            .iter()
            .map(|&s| DurationPreset::new(format!("{s} sec"), s))
            .collect();
        let engine = TimerEngine::new(presets, notifier.clone()).unwrap();
        (engine, notifier)
    }

    // Let the spawned tick task register its timer (or observe an abort)
    // before the test advances the paused clock.
    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn rejects_empty_preset_table() {
        let notifier = Arc::new(CountingNotifier::default());
        assert!(TimerEngine::new(Vec::new(), notifier).is_err());
    }

    #[tokio::test]
    async fn rejects_unknown_preset_index() {
        let (engine, _) = engine_with(&[300]);
        assert!(engine.select_preset(1).await.is_err());
        // State untouched by the rejected selection.
        assert_eq!(engine.snapshot().await.remaining_seconds, 300);
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_one_tick_per_elapsed_second() {
        let (engine, _) = engine_with(&[10]);
        engine.toggle_running().await;
        settle().await;

        // Not even a first tick before a full period has elapsed.
        time::advance(Duration::from_millis(999)).await;
        settle().await;
        assert_eq!(engine.snapshot().await.remaining_seconds, 10);

        time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(engine.snapshot().await.remaining_seconds, 9);

        time::advance(Duration::from_secs(3)).await;
        settle().await;
        assert_eq!(engine.snapshot().await.remaining_seconds, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_cancels_outstanding_ticks() {
        let (engine, _) = engine_with(&[900]);
        engine.toggle_running().await;
        settle().await;

        time::advance(Duration::from_secs(10)).await;
        settle().await;
        let paused = engine.toggle_running().await;
        assert_eq!(paused.remaining_seconds, 890);
        assert!(!paused.state.running());

        // Time keeps passing; the countdown must not.
        time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(engine.snapshot().await.remaining_seconds, 890);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_fires_notifier_exactly_once() {
        let (engine, notifier) = engine_with(&[3]);
        engine.toggle_running().await;
        settle().await;

        time::advance(Duration::from_secs(3)).await;
        settle().await;

        let snapshot = engine.snapshot().await;
        assert_eq!(snapshot.state.phase, TimerPhase::Completed);
        assert_eq!(snapshot.remaining_seconds, 0);
        assert_eq!(notifier.0.load(Ordering::SeqCst), 1);

        // The ticker is gone; more time changes nothing.
        time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(notifier.0.load(Ordering::SeqCst), 1);
        assert_eq!(engine.snapshot().await.remaining_seconds, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_completion_counts_down_again() {
        let (engine, notifier) = engine_with(&[2]);
        engine.toggle_running().await;
        settle().await;
        time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert!(engine.snapshot().await.state.completed());

        let restarted = engine.toggle_running().await;
        assert!(restarted.state.running());
        assert_eq!(restarted.remaining_seconds, 2);
        settle().await;

        time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert!(engine.snapshot().await.state.completed());
        assert_eq!(notifier.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn preset_change_cancels_ticker_and_reloads() {
        let (engine, _) = engine_with(&[60, 2700]);
        engine.toggle_running().await;
        settle().await;
        time::advance(Duration::from_secs(5)).await;
        settle().await;
        engine.toggle_running().await;

        let snapshot = engine.select_preset(1).await.unwrap();
        assert_eq!(snapshot.remaining_seconds, 2700);
        assert_eq!(snapshot.state.phase, TimerPhase::Idle);

        time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(engine.snapshot().await.remaining_seconds, 2700);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_while_running_stops_and_restores_full() {
        let (engine, notifier) = engine_with(&[120]);
        engine.toggle_running().await;
        settle().await;
        time::advance(Duration::from_secs(7)).await;
        settle().await;

        let snapshot = engine.reset().await;
        assert_eq!(snapshot.remaining_seconds, 120);
        assert!(!snapshot.state.running());

        time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(engine.snapshot().await.remaining_seconds, 120);
        assert_eq!(notifier.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn manual_tick_is_ignored_while_idle() {
        let (engine, notifier) = engine_with(&[30]);
        assert_eq!(engine.tick().await, TickOutcome::Ignored);
        assert_eq!(engine.snapshot().await.remaining_seconds, 30);
        assert_eq!(notifier.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn snapshot_serializes_camel_case() {
        let (engine, _) = engine_with(&[300]);
        let value = serde_json::to_value(engine.snapshot().await).unwrap();
        assert_eq!(value["remainingSeconds"], 300);
        assert_eq!(value["progressPercent"], 0.0);
        assert_eq!(value["clock"], "05:00");
        assert_eq!(value["state"]["phase"], "idle");
        assert_eq!(value["state"]["preset"]["totalSeconds"], 300);
    }
}
