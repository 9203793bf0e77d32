/*
[INPUT]:  SubmissionForm state, focused row, registry load status
[OUTPUT]: Registry-driven submit form rendered into Ratatui frame
[POS]:    TUI UI submit tab
[UPDATE]: When field kinds or result presentation change
*/

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use taskq_console::{FieldKind, SubmissionOutcome};

use crate::tui::app::{AppState, FormRow};
use crate::tui::runtime::titled_block;

const CURSOR: &str = "_";

pub(in crate::tui) fn draw_submit_form(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(6)])
        .split(area);

    let form = &app.form;
    let focused = app.focused_row();
    let schema = form.schema();

    let mut labels: Vec<String> = vec!["Task Type".to_string(), "Priority".to_string()];
    if let Some(schema) = schema {
        labels.extend(schema.fields.iter().map(|field| {
            if field.required {
                format!("{} *", field.label())
            } else {
                field.label().to_string()
            }
        }));
    }
    let label_width = labels.iter().map(|l| l.width()).max().unwrap_or(0);

    let mut lines = Vec::new();
    let type_value = if app.registry_loading && form.selected_type().is_none() {
        "loading...".to_string()
    } else {
        form.selected_type().unwrap_or("(none)").to_string()
    };
    lines.push(row_line(
        &labels[0],
        label_width,
        format!("< {type_value} >"),
        focused == FormRow::TaskType,
    ));
    lines.push(row_line(
        &labels[1],
        label_width,
        format!("< {} >", form.priority().label()),
        focused == FormRow::Priority,
    ));

    if let Some(schema) = schema {
        for (index, field) in schema.fields.iter().enumerate() {
            let is_focused = focused == FormRow::Field(index);
            let value = form.value(&field.name);
            let rendered = match &field.kind {
                FieldKind::SingleSelect { .. } => format!("< {value} >"),
                FieldKind::Text | FieldKind::MultilineText => {
                    let shown = value.replace('\n', " \u{21b5} ");
                    if is_focused {
                        format!("{shown}{CURSOR}")
                    } else {
                        shown
                    }
                }
            };
            lines.push(row_line(&labels[index + 2], label_width, rendered, is_focused));
        }
        if schema.fields.is_empty() {
            lines.push(Line::from(Span::styled(
                "  (this task type takes no payload fields)",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    lines.push(Line::raw(""));
    let button = if form.is_submitting() {
        "[ Submitting... ]"
    } else {
        "[ Submit Task ]"
    };
    let button_style = if focused == FormRow::Submit {
        Style::default()
            .fg(Color::Black)
            .bg(Color::LightGreen)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::LightGreen)
    };
    lines.push(Line::from(Span::styled(button, button_style)));

    let title = format!("Submit New Task (max retries {})", form.max_retries());
    let widget = Paragraph::new(lines).block(titled_block(&title, app.registry_error.as_deref()));
    frame.render_widget(widget, layout[0]);

    draw_result(frame, layout[1], form.result());
}

fn row_line(label: &str, width: usize, value: String, focused: bool) -> Line<'static> {
    let padding = " ".repeat(width.saturating_sub(label.width()));
    let marker = if focused { "> " } else { "  " };
    let value_style = if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::raw(marker),
        Span::styled(
            format!("{label}{padding} : "),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(value, value_style),
    ])
}

fn draw_result(frame: &mut ratatui::Frame, area: Rect, result: Option<&SubmissionOutcome>) {
    let lines = match result {
        None => vec![Line::from(Span::styled(
            "Fields marked * are required.",
            Style::default().fg(Color::DarkGray),
        ))],
        Some(outcome) => {
            let color = if outcome.is_success() {
                Color::LightGreen
            } else {
                Color::LightRed
            };
            let mut lines = vec![Line::from(Span::styled(
                outcome.message(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))];
            lines.extend(outcome.details().into_iter().map(Line::from));
            lines
        }
    };
    let widget = Paragraph::new(lines)
        .block(titled_block("Result", None))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}
