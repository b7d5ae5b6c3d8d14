use std::sync::Arc;

use anyhow::Result;

use pomodoro::audio::ChimePlayer;
use pomodoro::{default_presets, ui, TimerEngine};

#[tokio::main]
async fn main() -> Result<()> {
    // Reads RUST_LOG; quiet by default so logs don't fight the terminal UI
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let notifier = Arc::new(ChimePlayer::new());
    let engine = TimerEngine::new(default_presets(), notifier)?;

    ui::run(engine).await
}
