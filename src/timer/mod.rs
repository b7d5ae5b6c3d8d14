pub mod engine;
pub mod state;

pub use engine::{CompletionNotifier, TimerEngine, TimerSnapshot};
pub use state::{TickOutcome, TimerPhase, TimerState};
