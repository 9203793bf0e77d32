/*
[INPUT]:  Task queries, task ids, and submission requests
[OUTPUT]: Task pages, single task responses, submission acknowledgements
[POS]:    HTTP layer - task endpoints
[UPDATE]: When adding task endpoints or changing query parameters
*/

use reqwest::Method;
use tracing::debug;

use crate::http::{Result, TaskqClient};
use crate::types::{SubmitTaskRequest, TaskPage, TaskQuery, TaskResponse};

impl TaskqClient {
    /// List tasks, optionally constrained to one status
    ///
    /// GET /api/tasks?status={status}&page={page}&size={size}
    pub async fn list_tasks(&self, query: &TaskQuery) -> Result<TaskPage> {
        let builder = self
            .request(Method::GET, "/api/tasks")?
            .query(&query.query_pairs());
        self.send_json(builder).await
    }

    /// Look up one task by its full id
    ///
    /// GET /api/tasks/{taskId}
    pub async fn get_task(&self, task_id: &str) -> Result<TaskResponse> {
        let builder = self.request_with_segments(Method::GET, "/api/tasks/", &[task_id])?;
        self.send_json(builder).await
    }

    /// Submit a new task. Sends exactly one request; never retries.
    ///
    /// POST /api/tasks/submit
    pub async fn submit_task(&self, request: &SubmitTaskRequest) -> Result<TaskResponse> {
        let builder = self
            .request(Method::POST, "/api/tasks/submit")?
            .json(request);
        let response: TaskResponse = self.send_json(builder).await?;
        debug!(task_id = %response.task_id, "task accepted by backend");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::http::{ClientConfig, TaskqClient, TaskqError};
    use crate::types::{Priority, SubmitTaskRequest, TaskQuery, TaskStatus};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TaskqClient {
        TaskqClient::with_config(ClientConfig {
            base_url: server.uri(),
            ..ClientConfig::default()
        })
        .expect("client init")
    }

    #[tokio::test]
    async fn test_list_tasks_with_status() {
        let server = MockServer::start().await;
        let mock_response = r#"{
            "content": [
                {
                    "id": 7,
                    "taskId": "0d9f7c52-6f4a-4c6e-9a61-5a2b3c4d5e6f",
                    "taskType": "IMAGE_PROCESS",
                    "priority": "MEDIUM",
                    "status": "FAILED",
                    "payload": {"imageUrl": "http://img", "operation": "resize"},
                    "retryCount": 3,
                    "maxRetries": 3,
                    "createdAt": "2024-05-01T10:00:00",
                    "errorMessage": "timeout"
                }
            ],
            "totalElements": 1,
            "totalPages": 1,
            "number": 0,
            "size": 20
        }"#;

        let _mock = Mock::given(method("GET"))
            .and(path("/api/tasks"))
            .and(query_param("status", "FAILED"))
            .and(query_param("page", "0"))
            .and(query_param("size", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(mock_response, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let page = client_for(&server)
            .list_tasks(&TaskQuery {
                status: Some(TaskStatus::Failed),
                page: Some(0),
                size: Some(20),
            })
            .await
            .expect("list_tasks failed");

        assert_eq!(page.content.len(), 1);
        let task = &page.content[0];
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.retry_count, 3);
        assert_eq!(task.error_message.as_deref(), Some("timeout"));
        assert_eq!(page.total_pages, Some(1));
    }

    #[tokio::test]
    async fn test_get_task_encodes_id() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("GET"))
            .and(path("/api/tasks/abc%20123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "taskId": "abc 123",
                "taskType": "EMAIL_SEND",
                "priority": "LOW",
                "status": "PROCESSING",
                "retryCount": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let task = client_for(&server)
            .get_task("abc 123")
            .await
            .expect("get_task failed");
        assert_eq!(task.task_id, "abc 123");
        assert_eq!(task.status, Some(TaskStatus::Processing));
    }

    #[tokio::test]
    async fn test_submit_task_posts_body_once() {
        let server = MockServer::start().await;
        let mut payload = BTreeMap::new();
        payload.insert("to".to_string(), "a@b.com".to_string());
        payload.insert("subject".to_string(), "s".to_string());
        payload.insert("body".to_string(), "b".to_string());
        let request = SubmitTaskRequest {
            task_type: "EMAIL_SEND".to_string(),
            priority: Priority::High,
            payload,
            max_retries: 3,
            scheduled_at: None,
        };

        let _mock = Mock::given(method("POST"))
            .and(path("/api/tasks/submit"))
            .and(body_json(serde_json::json!({
                "taskType": "EMAIL_SEND",
                "priority": "HIGH",
                "payload": {"to": "a@b.com", "subject": "s", "body": "b"},
                "maxRetries": 3
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "taskId": "abc123",
                "status": "PENDING",
                "queuePosition": 4,
                "estimatedWaitTime": "~2 seconds"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .submit_task(&request)
            .await
            .expect("submit_task failed");
        assert_eq!(response.task_id, "abc123");
        assert_eq!(response.queue_position, Some(4));
    }

    #[tokio::test]
    async fn test_submit_task_bad_request_is_backend_error() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("POST"))
            .and(path("/api/tasks/submit"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let request = SubmitTaskRequest {
            task_type: "EMAIL_SEND".to_string(),
            priority: Priority::Low,
            payload: BTreeMap::new(),
            max_retries: 3,
            scheduled_at: None,
        };
        let err = client_for(&server).submit_task(&request).await.unwrap_err();
        assert!(matches!(err, TaskqError::Backend { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_submit_task_empty_success_body_is_invalid_response() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("POST"))
            .and(path("/api/tasks/submit"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let request = SubmitTaskRequest {
            task_type: "EMAIL_SEND".to_string(),
            priority: Priority::Medium,
            payload: BTreeMap::new(),
            max_retries: 3,
            scheduled_at: None,
        };
        let err = client_for(&server).submit_task(&request).await.unwrap_err();
        assert!(matches!(err, TaskqError::InvalidResponse(_)), "got {err:?}");
        assert!(!err.is_network());
    }
}
