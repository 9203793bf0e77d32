/*
[INPUT]:  TaskQueueApi handle, console config, log buffer, shutdown token
[OUTPUT]: Ratatui-based TUI run loop and shared render helpers
[POS]:    TUI runtime loop
[UPDATE]: When changing TUI layout, keybindings, or runtime controls
*/

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use taskq_adapter::TaskQueueApi;
use taskq_console::ConsoleConfig;
use taskq_console::logging::LogBufferHandle;

use super::app::{AppState, Tab, UiEvent};
use super::events::handle_key_event;
use super::terminal::TerminalGuard;
use super::ui::*;

const UI_TICK_INTERVAL: Duration = Duration::from_millis(250);
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(200);

pub(super) fn draw_footer(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let key_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let key = |label: &'static str| Span::styled(label, key_style);

    let line1 = match app.current_tab {
        Tab::Submit => Line::from(vec![
            key("[Tab/Up/Down]"),
            Span::raw(" Field  "),
            key("[Left/Right]"),
            Span::raw(" Change  "),
            key("[Enter]"),
            Span::raw(" Next/Submit  "),
            key("[F1-F4]"),
            Span::raw(" Tabs  "),
            key("[Ctrl+C]"),
            Span::raw(" Quit"),
        ]),
        Tab::Tasks => Line::from(vec![
            key("[Up/Down]"),
            Span::raw(" Select  "),
            key("[f/F]"),
            Span::raw(" Filter  "),
            key("[n/p]"),
            Span::raw(" Page  "),
            key("[Enter]"),
            Span::raw(" Detail  "),
            key("[r]"),
            Span::raw(" Refresh  "),
            key("[q]"),
            Span::raw(" Quit"),
        ]),
        Tab::Dashboard | Tab::Logs => Line::from(vec![
            key("[Tab/l]"),
            Span::raw(" Switch  "),
            key("[1-4]"),
            Span::raw(" Tabs  "),
            key("[r]"),
            Span::raw(" Refresh  "),
            key("[q]"),
            Span::raw(" Quit"),
        ]),
    };
    let line2 = Line::from(Span::raw(format!("Status: {}", app.status_message)));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title("Hotkeys");
    let text = Text::from(vec![line1, line2]);
    let widget = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

pub(crate) fn border_style() -> Style {
    Style::default().fg(Color::Magenta)
}

pub(crate) fn header_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn stale_style() -> Style {
    Style::default()
        .fg(Color::LightRed)
        .add_modifier(Modifier::BOLD)
}

/// Block title with a stale marker when the last poll failed.
pub(crate) fn titled_block(title: &str, error: Option<&str>) -> Block<'static> {
    let mut spans = vec![Span::raw(title.to_string())];
    if let Some(error) = error {
        spans.push(Span::styled(format!(" [stale: {error}]"), stale_style()));
    }
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Line::from(spans))
}

pub async fn run_tui(
    api: Arc<dyn TaskQueueApi>,
    config: &ConsoleConfig,
    log_buffer: LogBufferHandle,
    shutdown: CancellationToken,
) -> Result<()> {
    let mut terminal = TerminalGuard::new()?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let input_shutdown = CancellationToken::new();
    let input_shutdown_clone = input_shutdown.clone();
    let input_tx = event_tx.clone();

    tokio::task::spawn_blocking(move || {
        while !input_shutdown_clone.is_cancelled() {
            if crossterm::event::poll(INPUT_POLL_INTERVAL).unwrap_or(false) {
                if let Ok(event) = crossterm::event::read() {
                    let _ = input_tx.send(UiEvent::Input(event));
                }
            }
        }
    });

    let mut app = AppState::new(api, config, log_buffer, event_tx);
    app.start();
    info!("tui started");

    let mut tick = tokio::time::interval(UI_TICK_INTERVAL);
    let mut should_quit = false;

    while !should_quit {
        terminal.draw(|frame| draw_ui(frame, &mut app))?;

        tokio::select! {
            _ = shutdown.cancelled() => {
                should_quit = true;
            }
            _ = tick.tick() => {}
            maybe_event = event_rx.recv() => {
                match maybe_event {
                    Some(UiEvent::Input(CrosstermEvent::Key(key))) => {
                        if handle_key_event(&mut app, key) {
                            should_quit = true;
                        }
                    }
                    Some(UiEvent::Input(_)) => {}
                    Some(event) => app.handle_background(event),
                    None => should_quit = true,
                }
            }
        }
    }

    app.shutdown();
    input_shutdown.cancel();
    info!("tui stopped");
    Ok(())
}

fn draw_ui(frame: &mut ratatui::Frame, app: &mut AppState) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(area);

    draw_tabs(frame, layout[1], app.current_tab);

    match app.current_tab {
        Tab::Dashboard => draw_dashboard(frame, layout[0], app),
        Tab::Tasks => draw_task_list(frame, layout[0], app),
        Tab::Submit => draw_submit_form(frame, layout[0], app),
        Tab::Logs => draw_logs(frame, layout[0], &app.log_buffer),
    }

    draw_footer(frame, layout[2], app);

    if let Some(detail) = app.detail.as_ref() {
        draw_task_detail(frame, centered_rect(area, 70, 70), detail);
    }
}

pub(crate) fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
