pub mod audio;
pub mod preset;
pub mod timer;
pub mod ui;

pub use preset::{default_presets, DurationPreset};
pub use timer::{TimerEngine, TimerSnapshot};
