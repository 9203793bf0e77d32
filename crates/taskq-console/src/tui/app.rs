/*
[INPUT]:  TaskQueueApi handle, console config, log buffer, background results
[OUTPUT]: AppState owning the per-tab view models and form focus
[POS]:    TUI app state and tab lifecycle
[UPDATE]: When adding tabs or background operations
*/

use std::sync::Arc;

use crossterm::event::Event as CrosstermEvent;
use ratatui::widgets::TableState;
use tokio::sync::mpsc;
use tracing::{info, warn};

use taskq_adapter::{Task, TaskQueueApi};
use taskq_console::ConsoleConfig;
use taskq_console::detail::{TaskDetail, fetch_detail, lookup_error_message};
use taskq_console::logging::LogBufferHandle;
use taskq_console::registry::{TaskTypeSchema, schema_table};
use taskq_console::task_query::{TaskRow, rows};
use taskq_console::{
    FieldKind, MetricsView, SubmissionClient, SubmissionForm, SubmissionOutcome, TaskListView,
    TaskTypeRegistry, fetch_registry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Tab {
    Dashboard,
    Tasks,
    Submit,
    Logs,
}

impl Tab {
    pub(super) const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Tasks, Tab::Submit, Tab::Logs];

    pub(super) fn title(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Tasks => "Tasks",
            Tab::Submit => "Submit",
            Tab::Logs => "Logs",
        }
    }

    pub(super) fn index(self) -> usize {
        Self::ALL.iter().position(|tab| *tab == self).unwrap_or(0)
    }
}

/// Everything the run loop reacts to.
pub(super) enum UiEvent {
    Input(CrosstermEvent),
    RegistryLoaded(Result<TaskTypeRegistry, String>),
    Submitted(SubmissionOutcome),
    DetailLoaded {
        task_id: String,
        result: Result<TaskDetail, String>,
    },
}

pub(super) enum DetailState {
    Loading(String),
    Loaded(TaskDetail),
    Failed { task_id: String, message: String },
}

/// Focusable rows of the submit form, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FormRow {
    TaskType,
    Priority,
    Field(usize),
    Submit,
}

pub(super) struct AppState {
    api: Arc<dyn TaskQueueApi>,
    events: mpsc::UnboundedSender<UiEvent>,
    schema_table: Vec<TaskTypeSchema>,
    submission: SubmissionClient,
    pub(super) log_buffer: LogBufferHandle,
    pub(super) current_tab: Tab,
    pub(super) metrics: MetricsView,
    pub(super) tasks: TaskListView,
    pub(super) table_state: TableState,
    pub(super) form: SubmissionForm,
    pub(super) form_focus: usize,
    pub(super) registry_loading: bool,
    pub(super) registry_error: Option<String>,
    pub(super) detail: Option<DetailState>,
    pub(super) status_message: String,
    pub(super) id_prefix_len: usize,
}

impl AppState {
    pub(super) fn new(
        api: Arc<dyn TaskQueueApi>,
        config: &ConsoleConfig,
        log_buffer: LogBufferHandle,
        events: mpsc::UnboundedSender<UiEvent>,
    ) -> Self {
        let mut table_state = TableState::default();
        table_state.select(Some(0));
        Self {
            metrics: MetricsView::new(api.clone(), config.polling.metrics_interval()),
            tasks: TaskListView::new(
                api.clone(),
                config.polling.tasks_interval(),
                config.task_list.page_size,
            ),
            submission: SubmissionClient::new(api.clone()),
            form: SubmissionForm::new(
                config.submission.default_priority,
                config.submission.max_retries,
            ),
            schema_table: schema_table(&config.task_types),
            api,
            events,
            log_buffer,
            current_tab: Tab::Dashboard,
            table_state,
            form_focus: 0,
            registry_loading: false,
            registry_error: None,
            detail: None,
            status_message: "Ready".to_string(),
            id_prefix_len: config.task_list.id_prefix_len,
        }
    }

    /// Activate whatever the current tab needs. Call once after construction.
    pub(super) fn start(&mut self) {
        self.enter_tab(self.current_tab);
    }

    pub(super) fn shutdown(&mut self) {
        self.metrics.deactivate();
        self.tasks.deactivate();
    }

    pub(super) fn next_tab(&mut self) {
        let next = (self.current_tab.index() + 1) % Tab::ALL.len();
        self.set_tab(Tab::ALL[next]);
    }

    pub(super) fn previous_tab(&mut self) {
        let len = Tab::ALL.len();
        let previous = (self.current_tab.index() + len - 1) % len;
        self.set_tab(Tab::ALL[previous]);
    }

    /// Inactive views stop polling; the new view starts on entry.
    pub(super) fn set_tab(&mut self, tab: Tab) {
        if tab == self.current_tab {
            return;
        }
        self.leave_tab(self.current_tab);
        self.current_tab = tab;
        self.enter_tab(tab);
    }

    fn enter_tab(&mut self, tab: Tab) {
        match tab {
            Tab::Dashboard => self.metrics.activate(),
            Tab::Tasks => self.tasks.activate(),
            Tab::Submit => self.load_registry(),
            Tab::Logs => {}
        }
    }

    fn leave_tab(&mut self, tab: Tab) {
        match tab {
            Tab::Dashboard => self.metrics.deactivate(),
            Tab::Tasks => {
                self.tasks.deactivate();
                self.detail = None;
            }
            Tab::Submit | Tab::Logs => {}
        }
    }

    pub(super) fn refresh_current(&mut self) {
        match self.current_tab {
            Tab::Dashboard => self.metrics.refresh(),
            Tab::Tasks => self.tasks.refresh(),
            Tab::Submit => self.load_registry(),
            Tab::Logs => {}
        }
        self.status_message = format!("Refreshing {}", self.current_tab.title());
    }

    fn load_registry(&mut self) {
        self.registry_loading = true;
        let api = self.api.clone();
        let table = self.schema_table.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = fetch_registry(api.as_ref(), &table)
                .await
                .map_err(|err| err.to_string());
            let _ = events.send(UiEvent::RegistryLoaded(result));
        });
    }

    pub(super) fn handle_background(&mut self, event: UiEvent) {
        match event {
            UiEvent::Input(_) => {}
            UiEvent::RegistryLoaded(Ok(registry)) => {
                self.registry_loading = false;
                self.registry_error = None;
                self.form.apply_registry(registry);
                self.clamp_form_focus();
            }
            UiEvent::RegistryLoaded(Err(message)) => {
                self.registry_loading = false;
                warn!(error = %message, "task type catalog unavailable");
                self.status_message = format!("load task types failed: {message}");
                self.registry_error = Some(message);
            }
            UiEvent::Submitted(outcome) => {
                self.status_message = outcome.message();
                self.form.record_result(outcome);
            }
            UiEvent::DetailLoaded { task_id, result } => {
                // Ignore a lookup the operator already dismissed or replaced.
                let waiting = matches!(&self.detail, Some(DetailState::Loading(id)) if *id == task_id);
                if !waiting {
                    return;
                }
                self.detail = Some(match result {
                    Ok(detail) => DetailState::Loaded(detail),
                    Err(message) => DetailState::Failed { task_id, message },
                });
            }
        }
    }

    // Task list

    pub(super) fn visible_tasks(&self) -> Vec<Task> {
        self.tasks
            .snapshot()
            .data
            .map(|page| page.content)
            .unwrap_or_default()
    }

    pub(super) fn visible_rows(&self) -> Vec<TaskRow> {
        self.tasks
            .snapshot()
            .data
            .map(|page| rows(&page, self.id_prefix_len))
            .unwrap_or_default()
    }

    pub(super) fn move_selection(&mut self, delta: isize) {
        let len = self.visible_tasks().len();
        if len == 0 {
            self.table_state.select(Some(0));
            return;
        }
        let current = self.table_state.selected().unwrap_or(0).min(len - 1) as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        self.table_state.select(Some(next));
    }

    pub(super) fn cycle_filter(&mut self, forward: bool) {
        let current = self.tasks.state().filter;
        let filter = if forward {
            current.next()
        } else {
            current.previous()
        };
        self.tasks.set_filter(filter);
        self.table_state.select(Some(0));
        self.status_message = format!("Filter: {filter}");
    }

    pub(super) fn change_page(&mut self, forward: bool) {
        let moved = if forward {
            self.tasks.next_page()
        } else {
            self.tasks.previous_page()
        };
        if moved {
            self.table_state.select(Some(0));
            self.status_message = format!("Page {}", self.tasks.state().page + 1);
        }
    }

    pub(super) fn open_detail(&mut self) {
        let tasks = self.visible_tasks();
        let Some(task) = self
            .table_state
            .selected()
            .and_then(|index| tasks.get(index))
            .cloned()
        else {
            return;
        };

        let task_id = task.task_id.clone();
        info!(task_id = %task_id, "opening task detail");
        self.detail = Some(DetailState::Loading(task_id.clone()));

        let api = self.api.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = fetch_detail(api.as_ref(), &task_id, Some(task))
                .await
                .map_err(|err| lookup_error_message(&task_id, &err));
            let _ = events.send(UiEvent::DetailLoaded { task_id, result });
        });
    }

    pub(super) fn close_detail(&mut self) {
        self.detail = None;
    }

    // Submit form

    pub(super) fn form_rows(&self) -> Vec<FormRow> {
        let field_count = self.form.schema().map(|s| s.fields.len()).unwrap_or(0);
        let mut rows = vec![FormRow::TaskType, FormRow::Priority];
        rows.extend((0..field_count).map(FormRow::Field));
        rows.push(FormRow::Submit);
        rows
    }

    pub(super) fn focused_row(&self) -> FormRow {
        let rows = self.form_rows();
        rows.get(self.form_focus)
            .copied()
            .unwrap_or(FormRow::Submit)
    }

    pub(super) fn move_form_focus(&mut self, delta: isize) {
        let len = self.form_rows().len() as isize;
        self.form_focus = (self.form_focus as isize + delta).rem_euclid(len) as usize;
    }

    fn clamp_form_focus(&mut self) {
        let len = self.form_rows().len();
        if self.form_focus >= len {
            self.form_focus = len - 1;
        }
    }

    /// Left/Right on the focused row.
    pub(super) fn cycle_focused(&mut self, forward: bool) {
        match self.focused_row() {
            FormRow::TaskType => {
                self.form.cycle_type(forward);
                self.clamp_form_focus();
            }
            FormRow::Priority => self.form.cycle_priority(forward),
            FormRow::Field(index) => {
                let Some(field) = self
                    .form
                    .schema()
                    .and_then(|schema| schema.fields.get(index))
                    .cloned()
                else {
                    return;
                };
                let options = field.kind.options();
                if options.is_empty() {
                    return;
                }
                let current = self.form.value(&field.name);
                let position = options.iter().position(|opt| opt == current);
                let next = match (position, forward) {
                    (None, _) => 0,
                    (Some(i), true) => (i + 1) % options.len(),
                    (Some(i), false) => (i + options.len() - 1) % options.len(),
                };
                self.form.set_field(&field.name, options[next].clone());
            }
            FormRow::Submit => {}
        }
    }

    /// Apply an edit to the focused text field. Returns false if none is focused.
    pub(super) fn edit_focused_text(&mut self, edit: impl FnOnce(&mut String)) -> bool {
        let FormRow::Field(index) = self.focused_row() else {
            return false;
        };
        let Some(field) = self
            .form
            .schema()
            .and_then(|schema| schema.fields.get(index))
            .cloned()
        else {
            return false;
        };
        if matches!(field.kind, FieldKind::SingleSelect { .. }) {
            return false;
        }
        let mut value = self.form.value(&field.name).to_string();
        edit(&mut value);
        self.form.set_field(&field.name, value)
    }

    pub(super) fn focused_is_multiline(&self) -> bool {
        let FormRow::Field(index) = self.focused_row() else {
            return false;
        };
        self.form
            .schema()
            .and_then(|schema| schema.fields.get(index))
            .is_some_and(|field| field.kind == FieldKind::MultilineText)
    }

    pub(super) fn submit_form(&mut self) {
        let Some(draft) = self.form.begin_submit() else {
            if self.form.selected_type().is_none() {
                self.status_message = "no task type selected".to_string();
            }
            return;
        };
        self.status_message = format!("Submitting {}...", draft.task_type);

        let client = self.submission.clone();
        let registry = self.form.registry().clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = SubmissionOutcome::from_result(client.submit(&registry, &draft).await);
            let _ = events.send(UiEvent::Submitted(outcome));
        });
    }
}
