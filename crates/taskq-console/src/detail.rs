/*
[INPUT]:  Full task id, TaskQueueApi, optional list row for the same task
[OUTPUT]: TaskDetail with labelled display fields
[POS]:    Core - one-shot task detail lookup
[UPDATE]: When the backend adds fields worth showing
*/

use taskq_adapter::{Task, TaskQueueApi, TaskResponse, TaskqError};
use tracing::debug;

use crate::task_query::format_timestamp;

/// Lookup result plus whatever the list already knew about the task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDetail {
    pub response: TaskResponse,
    pub listed: Option<Task>,
}

impl TaskDetail {
    /// Label/value pairs in display order. Absent values are skipped.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let response = &self.response;
        let listed = self.listed.as_ref();
        let mut fields = vec![("Task ID", response.task_id.clone())];

        let task_type = response
            .task_type
            .clone()
            .or_else(|| listed.map(|task| task.task_type.clone()));
        push(&mut fields, "Type", task_type);
        push(
            &mut fields,
            "Priority",
            response
                .priority
                .or(listed.map(|task| task.priority))
                .map(|p| p.to_string()),
        );
        push(
            &mut fields,
            "Status",
            response
                .status
                .or(listed.map(|task| task.status))
                .map(|s| s.to_string()),
        );

        let max_retries = listed.map(|task| task.max_retries);
        let retries = response
            .retry_count
            .or(listed.map(|task| task.retry_count))
            .map(|count| match max_retries {
                Some(max) => format!("{count}/{max}"),
                None => count.to_string(),
            });
        push(&mut fields, "Retries", retries);
        push(
            &mut fields,
            "Queue position",
            response.queue_position.map(|p| p.to_string()),
        );
        push(
            &mut fields,
            "Estimated wait",
            response.estimated_wait_time.clone(),
        );

        let created = response
            .created_at
            .or(listed.and_then(|task| task.created_at));
        push(&mut fields, "Created", created.map(|ts| format_timestamp(Some(&ts))));
        push(
            &mut fields,
            "Scheduled",
            listed
                .and_then(|task| task.scheduled_at)
                .map(|ts| format_timestamp(Some(&ts))),
        );
        push(
            &mut fields,
            "Started",
            listed
                .and_then(|task| task.started_at)
                .map(|ts| format_timestamp(Some(&ts))),
        );
        let completed = response
            .completed_at
            .or(listed.and_then(|task| task.completed_at));
        push(&mut fields, "Completed", completed.map(|ts| format_timestamp(Some(&ts))));
        push(
            &mut fields,
            "Worker",
            listed.and_then(|task| task.worker_id.clone()),
        );
        let error = response
            .error_message
            .clone()
            .or_else(|| listed.and_then(|task| task.error_message.clone()));
        push(&mut fields, "Error", error);

        if let Some(payload) = listed.and_then(|task| task.payload.as_ref()) {
            for (key, value) in payload {
                let rendered = match value {
                    serde_json::Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                fields.push(("Payload", format!("{key} = {rendered}")));
            }
        }
        fields
    }
}

fn push(fields: &mut Vec<(&'static str, String)>, label: &'static str, value: Option<String>) {
    if let Some(value) = value {
        fields.push((label, value));
    }
}

/// Operator-facing text for a failed lookup.
pub fn lookup_error_message(task_id: &str, err: &TaskqError) -> String {
    if err.is_not_found() {
        format!("task {task_id} not found")
    } else {
        err.to_string()
    }
}

/// One-shot `GET /api/tasks/{taskId}`; no polling.
pub async fn fetch_detail(
    api: &dyn TaskQueueApi,
    task_id: &str,
    listed: Option<Task>,
) -> taskq_adapter::Result<TaskDetail> {
    debug!(task_id = %task_id, "fetching task detail");
    let response = api.get_task(task_id).await?;
    Ok(TaskDetail { response, listed })
}
