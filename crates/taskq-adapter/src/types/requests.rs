/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust request structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{Priority, TaskStatus};

/// Body of `POST /api/tasks/submit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTaskRequest {
    pub task_type: String,
    pub priority: Priority,
    pub payload: BTreeMap<String, String>,
    pub max_retries: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<NaiveDateTime>,
}

/// Query string of `GET /api/tasks`.
///
/// `status: None` means unfiltered; the parameter is then omitted entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl TaskQuery {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_request_uses_camel_case_keys() {
        let mut payload = BTreeMap::new();
        payload.insert("to".to_string(), "a@b.com".to_string());
        let request = SubmitTaskRequest {
            task_type: "EMAIL_SEND".to_string(),
            priority: Priority::High,
            payload,
            max_retries: 3,
            scheduled_at: None,
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "taskType": "EMAIL_SEND",
                "priority": "HIGH",
                "payload": {"to": "a@b.com"},
                "maxRetries": 3
            })
        );
    }

    #[test]
    fn unfiltered_query_has_no_status_pair() {
        let query = TaskQuery {
            status: None,
            page: Some(0),
            size: Some(20),
        };
        let pairs = query.query_pairs();
        assert!(pairs.iter().all(|(key, _)| *key != "status"));
        assert_eq!(pairs.len(), 2);
    }
}
