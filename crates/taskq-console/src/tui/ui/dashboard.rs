/*
[INPUT]:  MetricsView snapshot
[OUTPUT]: Counters, success gauge and queue-depth bar chart
[POS]:    TUI UI dashboard tab
[UPDATE]: When the dashboard shows new metrics
*/

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{BarChart, Gauge, Paragraph};

use taskq_console::MetricsDisplay;

use crate::tui::app::AppState;
use crate::tui::runtime::titled_block;

pub(in crate::tui) fn draw_dashboard(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let snapshot = app.metrics.snapshot();
    let error = snapshot.last_error.as_deref();

    let Some(display) = snapshot.data.as_ref().map(MetricsDisplay::from_snapshot) else {
        let message = match error {
            Some(err) => format!("Metrics unavailable: {err}"),
            None => "Loading metrics...".to_string(),
        };
        let widget = Paragraph::new(message)
            .alignment(Alignment::Center)
            .block(titled_block("Metrics", None));
        frame.render_widget(widget, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Min(8),
        ])
        .split(area);

    let updated = snapshot
        .updated_at
        .map(|ts| format!("Metrics (updated {})", ts.format("%H:%M:%S")))
        .unwrap_or_else(|| "Metrics".to_string());
    draw_counters(frame, rows[0], &display, &updated, error);

    let gauge = Gauge::default()
        .block(titled_block("Success Rate", None))
        .gauge_style(Style::default().fg(Color::LightGreen))
        .ratio(display.success_ratio / 100.0)
        .label(display.success_rate.clone());
    frame.render_widget(gauge, rows[1]);

    let data: Vec<(&str, u64)> = display
        .queue
        .iter()
        .map(|point| (point.name, point.tasks))
        .collect();
    let chart = BarChart::default()
        .block(titled_block("Queue Sizes by Priority", None))
        .data(data.as_slice())
        .bar_width(9)
        .bar_gap(3)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(chart, rows[2]);
}

fn draw_counters(
    frame: &mut ratatui::Frame,
    area: Rect,
    display: &MetricsDisplay,
    title: &str,
    error: Option<&str>,
) {
    let label = Style::default().add_modifier(Modifier::BOLD);
    let counter = |name: &'static str, value: String, color: Color| {
        vec![
            Span::styled(format!("{name}: "), label),
            Span::styled(value, Style::default().fg(color)),
            Span::raw("   "),
        ]
    };

    let mut first = counter("Total", display.total_tasks.to_string(), Color::White);
    first.extend(counter("Completed", display.completed_tasks.to_string(), Color::LightGreen));
    first.extend(counter("Failed", display.failed_tasks.to_string(), Color::LightRed));

    let mut second = counter("Pending", display.pending_tasks.to_string(), Color::Yellow);
    second.extend(counter("Processing", display.processing_tasks.to_string(), Color::LightBlue));

    let third = counter(
        "Avg processing time",
        display.avg_processing_time.clone(),
        Color::White,
    );

    let widget = Paragraph::new(vec![Line::from(first), Line::from(second), Line::from(third)])
        .block(titled_block(title, error));
    frame.render_widget(widget, area);
}
