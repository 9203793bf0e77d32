/*
[INPUT]:  TaskQueueApi handle, console config, log buffer
[OUTPUT]: Ratatui-based operator console
[POS]:    TUI module for the taskq-console binary
[UPDATE]: When adding TUI submodules
*/

mod app;
mod events;
mod runtime;
mod terminal;
mod ui;

pub use runtime::run_tui;
