/*
[INPUT]:  Backend JSON shapes (Task entity, MetricsResponse, Spring Page envelope)
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
[UPDATE]: Accept null page content and array-encoded timestamps
*/

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{Priority, TaskStatus};

/// One unit of backend work as observed by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub task_id: String,
    pub task_type: String,
    pub priority: Priority,
    pub status: TaskStatus,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_at: Option<NaiveDateTime>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub started_at: Option<NaiveDateTime>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
}

fn default_max_retries() -> u32 {
    3
}

/// Per-priority queue depth. Missing keys mean an empty queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSizes {
    #[serde(default)]
    pub high: u64,
    #[serde(default)]
    pub medium: u64,
    #[serde(default)]
    pub low: u64,
}

impl QueueSizes {
    pub fn get(&self, priority: Priority) -> u64 {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }
}

/// Result of one `GET /api/metrics`.
///
/// Counters are required: a response missing one fails to decode instead of
/// producing a half-filled snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub failed_tasks: u64,
    pub pending_tasks: u64,
    pub processing_tasks: u64,
    pub avg_processing_time: f64,
    pub success_rate: f64,
    #[serde(default)]
    pub queue_sizes: QueueSizes,
}

/// Spring `Page<Task>` envelope. Only `content` is load-bearing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPage {
    #[serde(default, deserialize_with = "serde_helpers::deserialize_null_as_empty")]
    pub content: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_elements: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl TaskPage {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

pub(crate) mod serde_helpers {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDateTime {
        Text(String),
        Parts(Vec<u32>),
    }

    /// Accepts `2024-05-01T10:00:00[.fff]`, RFC 3339, or Jackson's
    /// `[2024, 5, 1, 10, 0, 0, nanos]` array form.
    pub fn deserialize_optional_datetime<'de, D>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawDateTime>::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(RawDateTime::Text(text)) => {
                if let Ok(value) = text.parse::<NaiveDateTime>() {
                    return Ok(Some(value));
                }
                DateTime::parse_from_rfc3339(&text)
                    .map(|value| Some(value.naive_utc()))
                    .map_err(|err| D::Error::custom(format!("invalid timestamp '{text}': {err}")))
            }
            Some(RawDateTime::Parts(parts)) => {
                let part = |index: usize| parts.get(index).copied().unwrap_or(0);
                if parts.len() < 3 {
                    return Err(D::Error::custom("timestamp array needs at least 3 parts"));
                }
                NaiveDate::from_ymd_opt(part(0) as i32, part(1), part(2))
                    .and_then(|date| date.and_hms_nano_opt(part(3), part(4), part(5), part(6)))
                    .map(Some)
                    .ok_or_else(|| D::Error::custom("timestamp array out of range"))
            }
        }
    }

    pub fn deserialize_null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn task_accepts_minimal_entity() {
        let json = r#"{
            "taskId": "5f0c2a1e-0000-4000-8000-000000000001",
            "taskType": "EMAIL_SEND",
            "priority": "HIGH",
            "status": "PENDING"
        }"#;
        let task: Task = serde_json::from_str(json).expect("task");
        assert_eq!(task.retry_count, 0);
        assert_eq!(task.max_retries, 3);
        assert!(task.created_at.is_none());
    }

    #[test]
    fn task_timestamps_accept_string_and_array_forms() {
        let json = r#"{
            "taskId": "t-1",
            "taskType": "REPORT_GENERATE",
            "priority": "LOW",
            "status": "COMPLETED",
            "createdAt": "2024-05-01T10:00:00.123",
            "completedAt": [2024, 5, 1, 10, 0, 30]
        }"#;
        let task: Task = serde_json::from_str(json).expect("task");
        let created = task.created_at.expect("created_at");
        assert_eq!(created.date(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        let completed = task.completed_at.expect("completed_at");
        assert_eq!(completed.to_string(), "2024-05-01 10:00:30");
    }

    #[test]
    fn metrics_missing_counter_is_rejected() {
        let json = r#"{"totalTasks": 4, "completedTasks": 1}"#;
        assert!(serde_json::from_str::<MetricsSnapshot>(json).is_err());
    }

    #[test]
    fn queue_sizes_default_missing_keys() {
        let sizes: QueueSizes = serde_json::from_str(r#"{"high": 7}"#).expect("sizes");
        assert_eq!(sizes.get(Priority::High), 7);
        assert_eq!(sizes.get(Priority::Low), 0);
    }

    #[test]
    fn page_without_content_is_empty() {
        let missing: TaskPage = serde_json::from_str("{}").expect("page");
        assert!(missing.is_empty());
        let null: TaskPage = serde_json::from_str(r#"{"content": null}"#).expect("page");
        assert!(null.is_empty());
    }
}
