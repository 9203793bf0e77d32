/*
[INPUT]:  Crossterm key events
[OUTPUT]: AppState mutations and quit requests
[POS]:    TUI key routing per tab
[UPDATE]: When changing keybindings
*/

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{AppState, FormRow, Tab};

/// Handles key events for the TUI.
///
/// Returns `true` if quit is requested, `false` otherwise.
pub(super) fn handle_key_event(app: &mut AppState, key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    // Function keys switch tabs from anywhere, including the form.
    if let KeyCode::F(n @ 1..=4) = key.code {
        app.set_tab(Tab::ALL[usize::from(n) - 1]);
        return false;
    }

    if app.detail.is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
            app.close_detail();
        }
        return false;
    }

    match app.current_tab {
        Tab::Submit => {
            handle_form_key(app, key.code);
            false
        }
        _ => handle_view_key(app, key.code),
    }
}

fn handle_view_key(app: &mut AppState, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') => true,
        KeyCode::Char('r') => {
            app.refresh_current();
            false
        }
        KeyCode::Tab | KeyCode::Char('l') => {
            app.next_tab();
            false
        }
        KeyCode::BackTab | KeyCode::Char('h') => {
            app.previous_tab();
            false
        }
        KeyCode::Char(ch @ '1'..='4') => {
            let index = ch as usize - '1' as usize;
            app.set_tab(Tab::ALL[index]);
            false
        }
        _ if app.current_tab == Tab::Tasks => {
            handle_task_list_key(app, key);
            false
        }
        _ => false,
    }
}

fn handle_task_list_key(app: &mut AppState, key: KeyCode) {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Right | KeyCode::Char('f') => app.cycle_filter(true),
        KeyCode::Left | KeyCode::Char('F') => app.cycle_filter(false),
        KeyCode::PageDown | KeyCode::Char('n') => app.change_page(true),
        KeyCode::PageUp | KeyCode::Char('p') => app.change_page(false),
        KeyCode::Enter => app.open_detail(),
        _ => {}
    }
}

fn handle_form_key(app: &mut AppState, key: KeyCode) {
    match key {
        KeyCode::Tab | KeyCode::Down => app.move_form_focus(1),
        KeyCode::BackTab | KeyCode::Up => app.move_form_focus(-1),
        KeyCode::Left => app.cycle_focused(false),
        KeyCode::Right => app.cycle_focused(true),
        KeyCode::Backspace => {
            app.edit_focused_text(|value| {
                value.pop();
            });
        }
        KeyCode::Enter => match app.focused_row() {
            FormRow::Submit => app.submit_form(),
            FormRow::Field(_) if app.focused_is_multiline() => {
                app.edit_focused_text(|value| value.push('\n'));
            }
            _ => app.move_form_focus(1),
        },
        KeyCode::Char(ch) => {
            app.edit_focused_text(|value| value.push(ch));
        }
        _ => {}
    }
}
