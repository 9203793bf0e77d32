/*
[INPUT]:  TUI app state for UI components
[OUTPUT]: UI component render functions and module exports
[POS]:    TUI UI module root
[UPDATE]: When adding a tab or overlay renderer
*/

mod dashboard;
mod detail;
mod layout;
mod logs;
mod submit;
mod task_list;

pub(in crate::tui) use dashboard::draw_dashboard;
pub(in crate::tui) use detail::draw_task_detail;
pub(in crate::tui) use layout::draw_tabs;
pub(in crate::tui) use logs::draw_logs;
pub(in crate::tui) use submit::draw_submit_form;
pub(in crate::tui) use task_list::draw_task_list;
