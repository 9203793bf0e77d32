/*
[INPUT]:  DetailState for the selected task
[OUTPUT]: Task detail overlay rendered into Ratatui frame
[POS]:    TUI UI task detail overlay
[UPDATE]: When detail fields or overlay layout change
*/

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::tui::app::DetailState;
use crate::tui::runtime::titled_block;

pub(in crate::tui) fn draw_task_detail(frame: &mut ratatui::Frame, area: Rect, detail: &DetailState) {
    frame.render_widget(Clear, area);

    let lines: Vec<Line> = match detail {
        DetailState::Loading(task_id) => vec![Line::raw(format!("Loading {task_id}..."))],
        DetailState::Failed { task_id, message } => vec![
            Line::raw(format!("Task ID: {task_id}")),
            Line::from(Span::styled(
                format!("Error: {message}"),
                Style::default().fg(Color::LightRed),
            )),
        ],
        DetailState::Loaded(detail) => {
            let fields = detail.fields();
            let width = fields.iter().map(|(label, _)| label.width()).max().unwrap_or(0);
            fields
                .into_iter()
                .map(|(label, value)| {
                    Line::from(vec![
                        Span::styled(
                            format!("{label:<width$} : "),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::raw(value),
                    ])
                })
                .collect()
        }
    };

    let widget = Paragraph::new(lines)
        .block(titled_block("Task Detail (Esc to close)", None))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}
