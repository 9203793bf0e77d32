/*
[INPUT]:  Status filter selection, page navigation, TaskQueueApi
[OUTPUT]: TaskQuery for the backend and a polled page of display rows
[POS]:    Core - task list filtering, pagination and row formatting
[UPDATE]: When adding filter values or changing list presentation
*/

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::info;

use taskq_adapter::{Priority, Task, TaskPage, TaskQuery, TaskQueueApi, TaskStatus};

use crate::poller::{PollSnapshot, PollingStore, Subscription};

pub const EMPTY_MESSAGE: &str = "No tasks found";
const TRUNCATION_MARKER: &str = "...";

/// Status filter offered to the operator. `Cancelled` is displayed but not filterable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Processing,
    Completed,
    Failed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 5] = [
        StatusFilter::All,
        StatusFilter::Pending,
        StatusFilter::Processing,
        StatusFilter::Completed,
        StatusFilter::Failed,
    ];

    pub fn status(self) -> Option<TaskStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some(TaskStatus::Pending),
            StatusFilter::Processing => Some(TaskStatus::Processing),
            StatusFilter::Completed => Some(TaskStatus::Completed),
            StatusFilter::Failed => Some(TaskStatus::Failed),
        }
    }

    pub fn as_str(self) -> &'static str {
        self.status().map(TaskStatus::as_str).unwrap_or("ALL")
    }

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = taskq_adapter::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        match s.parse::<TaskStatus>()? {
            TaskStatus::Pending => Ok(StatusFilter::Pending),
            TaskStatus::Processing => Ok(StatusFilter::Processing),
            TaskStatus::Completed => Ok(StatusFilter::Completed),
            TaskStatus::Failed => Ok(StatusFilter::Failed),
            TaskStatus::Cancelled => Err(taskq_adapter::ParseEnumError {
                kind: "status filter",
                value: s.to_string(),
                expected: "ALL, PENDING, PROCESSING, COMPLETED, FAILED",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterState {
    pub filter: StatusFilter,
    /// 0-based result page
    pub page: u32,
    pub page_size: u32,
}

impl FilterState {
    pub fn new(page_size: u32) -> Self {
        Self {
            filter: StatusFilter::All,
            page: 0,
            page_size,
        }
    }
}

/// Status constraint present iff the filter is not `All`.
pub fn build_query(state: &FilterState) -> TaskQuery {
    TaskQuery {
        status: state.filter.status(),
        page: Some(state.page),
        size: Some(state.page_size),
    }
}

/// `abcdefghijklmnopqrst` -> `abcdefghijklmnop...`; short ids pass through.
pub fn short_id(task_id: &str, prefix_len: usize) -> String {
    match task_id.char_indices().nth(prefix_len) {
        Some((cut, _)) => format!("{}{}", &task_id[..cut], TRUNCATION_MARKER),
        None => task_id.to_string(),
    }
}

pub fn format_timestamp(value: Option<&NaiveDateTime>) -> String {
    value
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// One rendered line of the task table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub task_id: String,
    pub short_id: String,
    pub task_type: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub retries: String,
    pub created_at: String,
}

impl TaskRow {
    pub fn from_task(task: &Task, prefix_len: usize) -> Self {
        Self {
            task_id: task.task_id.clone(),
            short_id: short_id(&task.task_id, prefix_len),
            task_type: task.task_type.clone(),
            priority: task.priority,
            status: task.status,
            retries: format!("{}/{}", task.retry_count, task.max_retries),
            created_at: format_timestamp(task.created_at.as_ref()),
        }
    }
}

pub fn rows(page: &TaskPage, prefix_len: usize) -> Vec<TaskRow> {
    page.content
        .iter()
        .map(|task| TaskRow::from_task(task, prefix_len))
        .collect()
}

/// Task list view model: owns filter state and the active poll.
pub struct TaskListView {
    api: Arc<dyn TaskQueueApi>,
    interval: Duration,
    state: FilterState,
    subscription: Option<Subscription<TaskPage>>,
}

impl TaskListView {
    pub fn new(api: Arc<dyn TaskQueueApi>, interval: Duration, page_size: u32) -> Self {
        Self {
            api,
            interval,
            state: FilterState::new(page_size),
            subscription: None,
        }
    }

    pub fn state(&self) -> FilterState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Start polling with the current filter; restarts if already active.
    pub fn activate(&mut self) {
        self.deactivate();
        let api = self.api.clone();
        let query = build_query(&self.state);
        info!(
            status = %self.state.filter,
            page = self.state.page,
            "task list polling started"
        );
        self.subscription = Some(PollingStore::start(
            "tasks",
            move || {
                let api = api.clone();
                let query = query.clone();
                async move { api.list_tasks(&query).await }
            },
            self.interval,
        ));
    }

    pub fn deactivate(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }

    /// New filter resets to page 0 and re-queries immediately.
    pub fn set_filter(&mut self, filter: StatusFilter) {
        if filter == self.state.filter && self.state.page == 0 {
            return;
        }
        self.state.filter = filter;
        self.state.page = 0;
        self.restart();
    }

    pub fn next_page(&mut self) -> bool {
        let last_page = self
            .snapshot()
            .data
            .and_then(|page| page.total_pages)
            .map(|pages| pages.saturating_sub(1));
        if last_page.is_some_and(|last| self.state.page >= last) {
            return false;
        }
        self.state.page += 1;
        self.restart();
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if self.state.page == 0 {
            return false;
        }
        self.state.page -= 1;
        self.restart();
        true
    }

    pub fn refresh(&self) {
        if let Some(subscription) = &self.subscription {
            subscription.refresh();
        }
    }

    pub fn snapshot(&self) -> PollSnapshot<TaskPage> {
        self.subscription
            .as_ref()
            .map(Subscription::snapshot)
            .unwrap_or_default()
    }

    // Only restart a live poll; an inactive view picks the state up on activate.
    fn restart(&mut self) {
        if self.is_active() {
            self.activate();
        }
    }
}

impl Drop for TaskListView {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatusFilter::All, None)]
    #[case(StatusFilter::Pending, Some("PENDING"))]
    #[case(StatusFilter::Processing, Some("PROCESSING"))]
    #[case(StatusFilter::Completed, Some("COMPLETED"))]
    #[case(StatusFilter::Failed, Some("FAILED"))]
    fn status_constraint_only_when_filtered(
        #[case] filter: StatusFilter,
        #[case] expected: Option<&str>,
    ) {
        let state = FilterState {
            filter,
            ..FilterState::new(20)
        };
        let query = build_query(&state);
        assert_eq!(query.status.map(TaskStatus::as_str), expected);
        let has_status_pair = query.query_pairs().iter().any(|(key, _)| *key == "status");
        assert_eq!(has_status_pair, expected.is_some());
        assert_eq!(query.size, Some(20));
        assert_eq!(query.page, Some(0));
    }

    #[test]
    fn long_ids_are_truncated_with_marker() {
        let id = "0123456789abcdefXYZ";
        assert_eq!(short_id(id, 16), "0123456789abcdef...");
        assert_eq!(short_id("0123456789abcdef", 16), "0123456789abcdef");
        assert_eq!(short_id("abc", 16), "abc");
    }

    #[test]
    fn filter_cycle_visits_every_value() {
        let mut filter = StatusFilter::All;
        for _ in 0..StatusFilter::ALL.len() {
            filter = filter.next();
        }
        assert_eq!(filter, StatusFilter::All);
        assert_eq!(StatusFilter::All.previous(), StatusFilter::Failed);
    }

    #[test]
    fn parse_filter_rejects_cancelled() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("failed".parse::<StatusFilter>().unwrap(), StatusFilter::Failed);
        assert!("CANCELLED".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn row_keeps_full_id_for_detail() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "taskId": "7f3e9a1c-0b6d-4c55-9a8e-2d4f6b1a0c33",
            "taskType": "EMAIL_SEND",
            "priority": "LOW",
            "status": "CANCELLED",
            "retryCount": 1,
            "maxRetries": 3,
            "createdAt": "2024-05-01T10:00:00.123"
        }))
        .unwrap();

        let row = TaskRow::from_task(&task, 16);
        assert_eq!(row.task_id, "7f3e9a1c-0b6d-4c55-9a8e-2d4f6b1a0c33");
        assert_eq!(row.short_id, "7f3e9a1c-0b6d-4c...");
        assert_eq!(row.retries, "1/3");
        assert_eq!(row.created_at, "2024-05-01 10:00:00");
        assert_eq!(row.status, TaskStatus::Cancelled);
    }
}
