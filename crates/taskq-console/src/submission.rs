/*
[INPUT]:  TaskDraft from the form, TaskTypeRegistry, TaskQueueApi
[OUTPUT]: Validated SubmitTaskRequest, one POST per submit, typed outcome
[POS]:    Core - task submission client
[UPDATE]: When validation rules or outcome messages change
*/

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use taskq_adapter::{Priority, SubmitTaskRequest, TaskQueueApi, TaskResponse, TaskqError};

use crate::registry::{FieldKind, RegistryError, TaskTypeRegistry};

#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Detected client-side; nothing was sent
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    UnknownType(#[from] RegistryError),

    /// The request never completed
    #[error("network error: {0}")]
    Network(String),

    /// Backend answered with a non-2xx status
    #[error("backend rejected task (status {status}): {message}")]
    Backend { status: u16, message: String },

    /// 2xx with a body we could not read
    #[error("unexpected response: {0}")]
    Response(String),
}

impl From<TaskqError> for SubmissionError {
    fn from(err: TaskqError) -> Self {
        match err {
            TaskqError::Network(inner) => SubmissionError::Network(inner.to_string()),
            TaskqError::Backend { status, message } => SubmissionError::Backend { status, message },
            other => SubmissionError::Response(other.to_string()),
        }
    }
}

/// Everything the operator chose, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub task_type: String,
    pub priority: Priority,
    pub payload: BTreeMap<String, String>,
    pub max_retries: u32,
}

/// Check a draft against the registry and turn it into a request body.
///
/// The payload must carry exactly the schema's field names. Required fields
/// must be non-blank and select values must be one of the declared options.
pub fn validate_draft(
    registry: &TaskTypeRegistry,
    draft: &TaskDraft,
) -> Result<SubmitTaskRequest, SubmissionError> {
    let schema = registry.schema_for(&draft.task_type)?;

    let missing: Vec<&str> = schema
        .fields
        .iter()
        .filter(|field| !draft.payload.contains_key(&field.name))
        .map(|field| field.name.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(SubmissionError::Validation(format!(
            "missing payload fields: {}",
            missing.join(", ")
        )));
    }

    let extra: Vec<&str> = draft
        .payload
        .keys()
        .filter(|key| schema.field(key).is_none())
        .map(String::as_str)
        .collect();
    if !extra.is_empty() {
        return Err(SubmissionError::Validation(format!(
            "unexpected payload fields: {}",
            extra.join(", ")
        )));
    }

    for field in &schema.fields {
        let value = draft.payload.get(&field.name).map(String::as_str).unwrap_or_default();
        if field.required && value.trim().is_empty() {
            return Err(SubmissionError::Validation(format!(
                "{} is required",
                field.label()
            )));
        }
        if let FieldKind::SingleSelect { options } = &field.kind {
            if !options.is_empty() && !options.iter().any(|option| option == value) {
                return Err(SubmissionError::Validation(format!(
                    "{} must be one of: {}",
                    field.label(),
                    options.join(", ")
                )));
            }
        }
    }

    Ok(SubmitTaskRequest {
        task_type: draft.task_type.clone(),
        priority: draft.priority,
        payload: draft.payload.clone(),
        max_retries: draft.max_retries,
        scheduled_at: None,
    })
}

#[derive(Clone)]
pub struct SubmissionClient {
    api: Arc<dyn TaskQueueApi>,
}

impl SubmissionClient {
    pub fn new(api: Arc<dyn TaskQueueApi>) -> Self {
        Self { api }
    }

    /// Validate then send exactly one creation request. Never retries.
    pub async fn submit(
        &self,
        registry: &TaskTypeRegistry,
        draft: &TaskDraft,
    ) -> Result<TaskResponse, SubmissionError> {
        let request = validate_draft(registry, draft).inspect_err(|err| {
            info!(task_type = %draft.task_type, error = %err, "submission rejected locally");
        })?;

        match self.api.submit_task(&request).await {
            Ok(response) => {
                info!(
                    task_id = %response.task_id,
                    task_type = %request.task_type,
                    priority = %request.priority,
                    "task submitted"
                );
                Ok(response)
            }
            Err(err) => {
                warn!(task_type = %request.task_type, error = %err, "task submission failed");
                Err(err.into())
            }
        }
    }
}

/// Result of the latest submit attempt, rendered in the form.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Accepted(TaskResponse),
    Failed(String),
}

impl SubmissionOutcome {
    pub fn from_result(result: Result<TaskResponse, SubmissionError>) -> Self {
        match result {
            Ok(response) => SubmissionOutcome::Accepted(response),
            Err(err) => SubmissionOutcome::Failed(err.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Accepted(_))
    }

    pub fn message(&self) -> String {
        match self {
            SubmissionOutcome::Accepted(response) => {
                format!("Task submitted successfully! Task ID: {}", response.task_id)
            }
            SubmissionOutcome::Failed(message) => format!("Error: {message}"),
        }
    }

    /// Optional acceptance extras, one line each.
    pub fn details(&self) -> Vec<String> {
        let SubmissionOutcome::Accepted(response) = self else {
            return Vec::new();
        };
        let mut lines = Vec::new();
        if let Some(status) = response.status {
            lines.push(format!("Status: {status}"));
        }
        if let Some(position) = response.queue_position {
            lines.push(format!("Queue position: {position}"));
        }
        if let Some(wait) = &response.estimated_wait_time {
            lines.push(format!("Estimated wait: {wait}"));
        }
        lines
    }
}
