/*
[INPUT]:  TaskListView snapshot, filter state, table selection
[OUTPUT]: Filter bar and task table rendered into Ratatui frame
[POS]:    TUI UI task list tab
[UPDATE]: When task table columns or filter presentation change
*/

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};

use taskq_adapter::{Priority, TaskStatus};
use taskq_console::StatusFilter;
use taskq_console::task_query::EMPTY_MESSAGE;

use crate::tui::app::AppState;
use crate::tui::runtime::{header_style, titled_block};

pub(in crate::tui) fn draw_task_list(frame: &mut ratatui::Frame, area: Rect, app: &mut AppState) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let state = app.tasks.state();
    let snapshot = app.tasks.snapshot();

    let mut filters = vec![Span::raw("Status: ")];
    for filter in StatusFilter::ALL {
        let text = format!(" {filter} ");
        if filter == state.filter {
            filters.push(Span::styled(text, header_style()));
        } else {
            filters.push(Span::raw(text));
        }
        filters.push(Span::raw(" "));
    }
    let total_pages = snapshot.data.as_ref().and_then(|page| page.total_pages);
    let page_label = match total_pages {
        Some(pages) if pages > 0 => format!("   Page {}/{}", state.page + 1, pages),
        _ => format!("   Page {}", state.page + 1),
    };
    filters.push(Span::raw(page_label));
    frame.render_widget(
        Paragraph::new(Line::from(filters)).block(titled_block("Filter", None)),
        layout[0],
    );

    let block = titled_block("Tasks", snapshot.last_error.as_deref());
    let rows = app.visible_rows();
    if rows.is_empty() {
        let message = if snapshot.is_loading() {
            "Loading tasks...".to_string()
        } else if snapshot.data.is_none() {
            snapshot
                .last_error
                .as_deref()
                .map(|err| format!("Tasks unavailable: {err}"))
                .unwrap_or_else(|| EMPTY_MESSAGE.to_string())
        } else {
            EMPTY_MESSAGE.to_string()
        };
        let widget = Paragraph::new(message)
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(widget, layout[1]);
        return;
    }

    let header = Row::new(["Task ID", "Type", "Priority", "Status", "Retries", "Created"])
        .style(header_style());
    let table_rows = rows.into_iter().map(|row| {
        Row::new(vec![
            Cell::from(row.short_id),
            Cell::from(row.task_type),
            Cell::from(row.priority.as_str()).style(priority_style(row.priority)),
            Cell::from(row.status.as_str()).style(status_style(row.status)),
            Cell::from(row.retries),
            Cell::from(row.created_at),
        ])
    });
    let widths = [
        Constraint::Length(20),
        Constraint::Length(18),
        Constraint::Length(9),
        Constraint::Length(11),
        Constraint::Length(8),
        Constraint::Min(19),
    ];
    let table = Table::new(table_rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(table, layout[1], &mut app.table_state);
}

fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::High => Style::default().fg(Color::LightRed),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::Low => Style::default().fg(Color::Gray),
    }
}

fn status_style(status: TaskStatus) -> Style {
    match status {
        TaskStatus::Pending => Style::default().fg(Color::Yellow),
        TaskStatus::Processing => Style::default().fg(Color::LightBlue),
        TaskStatus::Completed => Style::default().fg(Color::LightGreen),
        TaskStatus::Failed => Style::default().fg(Color::LightRed),
        TaskStatus::Cancelled => Style::default().fg(Color::DarkGray),
    }
}
