//! Terminal adapter: renders engine snapshots and maps keys onto the four
//! timer operations. Holds no state of its own beyond the event loop.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    layout::{Alignment, Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    DefaultTerminal, Frame,
};
use tokio::time;

use crate::{
    preset::DurationPreset,
    timer::{TimerEngine, TimerSnapshot},
};

/// Redraw cadence between input events; keeps the clock visually in step
/// with the one-second tick without waiting for a keypress.
const REDRAW_INTERVAL: Duration = Duration::from_millis(200);

pub async fn run(engine: TimerEngine) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &engine).await;
    // Unmount: no tick may outlive the UI.
    engine.shutdown().await;
    ratatui::restore();
    result
}

async fn event_loop(terminal: &mut DefaultTerminal, engine: &TimerEngine) -> Result<()> {
    let mut events = EventStream::new();
    let mut redraw = time::interval(REDRAW_INTERVAL);

    loop {
        let snapshot = engine.snapshot().await;
        terminal.draw(|frame| draw(frame, &snapshot, engine.presets()))?;

        tokio::select! {
            _ = redraw.tick() => {}
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if handle_key(engine, key).await? {
                            return Ok(());
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => return Ok(()),
                }
            }
        }
    }
}

/// Returns `true` when the app should quit.
async fn handle_key(engine: &TimerEngine, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
        KeyCode::Char(' ') => {
            engine.toggle_running().await;
        }
        KeyCode::Char('r') => {
            engine.reset().await;
        }
        KeyCode::Char(c @ '1'..='9') => {
            // Selection is disabled while the countdown is running.
            if !engine.snapshot().await.state.running() {
                let index = c as usize - '1' as usize;
                if index < engine.presets().len() {
                    engine.select_preset(index).await?;
                }
            }
        }
        _ => {}
    }
    Ok(false)
}

fn draw(frame: &mut Frame, snapshot: &TimerSnapshot, presets: &[DurationPreset]) {
    let areas = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .split(frame.area());

    frame.render_widget(preset_row(snapshot, presets), areas[0]);

    let clock_style = if snapshot.state.running() {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    };
    let clock = Paragraph::new(snapshot.clock.clone())
        .style(clock_style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Pomodoro"));
    frame.render_widget(clock, areas[1]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Blue))
        .ratio((snapshot.progress_percent / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0}%", snapshot.progress_percent));
    frame.render_widget(gauge, areas[2]);

    frame.render_widget(status_line(snapshot), areas[3]);

    let help = Paragraph::new("1-6 duration | space start/pause | r reset | q quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, areas[4]);
}

fn preset_row<'a>(snapshot: &TimerSnapshot, presets: &'a [DurationPreset]) -> Paragraph<'a> {
    let selected = &snapshot.state.preset;
    let running = snapshot.state.running();

    let mut spans = Vec::with_capacity(presets.len() * 2);
    for (i, preset) in presets.iter().enumerate() {
        let mut style = if preset == selected {
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default()
        };
        if running {
            style = style.add_modifier(Modifier::DIM);
        }
        spans.push(Span::styled(
            format!(" {} {} ", i + 1, preset.label),
            style,
        ));
        spans.push(Span::raw(" "));
    }

    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Duration"))
}

fn status_line(snapshot: &TimerSnapshot) -> Paragraph<'static> {
    let (text, style) = if snapshot.state.completed() {
        (
            "Timer done!".to_string(),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (
            format!(
                "{} - {:.0}% done",
                snapshot.state.preset.label, snapshot.progress_percent
            ),
            Style::default().fg(Color::DarkGray),
        )
    };

    Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center)
}
