/*
[INPUT]:  No parameters (read-only backend aggregates)
[OUTPUT]: Metrics snapshot and the supported task-type catalog
[POS]:    HTTP layer - metrics endpoints
[UPDATE]: When the metrics response shape changes
*/

use reqwest::Method;

use crate::http::{Result, TaskqClient};
use crate::types::{MetricsSnapshot, TaskTypeCatalog};

impl TaskqClient {
    /// Fetch the current queue/task metrics
    ///
    /// GET /api/metrics
    pub async fn get_metrics(&self) -> Result<MetricsSnapshot> {
        let builder = self.request(Method::GET, "/api/metrics")?;
        self.send_json(builder).await
    }

    /// List task types the backend has executors for, in backend order
    ///
    /// GET /api/metrics/task-types
    pub async fn list_task_types(&self) -> Result<Vec<String>> {
        let builder = self.request(Method::GET, "/api/metrics/task-types")?;
        let catalog: TaskTypeCatalog = self.send_json(builder).await?;
        Ok(catalog.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::http::{ClientConfig, TaskqClient, TaskqError};
    use crate::types::{MetricsSnapshot, QueueSizes};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TaskqClient {
        TaskqClient::with_config(ClientConfig {
            base_url: server.uri(),
            ..ClientConfig::default()
        })
        .expect("client init")
    }

    #[tokio::test]
    async fn test_get_metrics() {
        let server = MockServer::start().await;
        let mock_response = r#"{
            "totalTasks": 120,
            "completedTasks": 100,
            "failedTasks": 5,
            "pendingTasks": 10,
            "processingTasks": 5,
            "avgProcessingTime": 1534.6,
            "queueSizes": {"high": 2, "medium": 5, "low": 3},
            "successRate": 83.33
        }"#;

        let _mock = Mock::given(method("GET"))
            .and(path("/api/metrics"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(mock_response, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let metrics = client_for(&server)
            .get_metrics()
            .await
            .expect("get_metrics failed");

        let expected = MetricsSnapshot {
            total_tasks: 120,
            completed_tasks: 100,
            failed_tasks: 5,
            pending_tasks: 10,
            processing_tasks: 5,
            avg_processing_time: 1534.6,
            success_rate: 83.33,
            queue_sizes: QueueSizes {
                high: 2,
                medium: 5,
                low: 3,
            },
        };
        assert_eq!(metrics, expected);
    }

    #[tokio::test]
    async fn test_list_task_types_keeps_backend_order() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("GET"))
            .and(path("/api/metrics/task-types"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                "REPORT_GENERATE",
                "EMAIL_SEND",
                "IMAGE_PROCESS"
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let types = client_for(&server)
            .list_task_types()
            .await
            .expect("list_task_types failed");
        assert_eq!(types, vec!["REPORT_GENERATE", "EMAIL_SEND", "IMAGE_PROCESS"]);
    }

    #[tokio::test]
    async fn test_get_metrics_server_error() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("GET"))
            .and(path("/api/metrics"))
            .respond_with(ResponseTemplate::new(503).set_body_string("redis unavailable"))
            .mount(&server)
            .await;

        let err = client_for(&server).get_metrics().await.unwrap_err();
        match err {
            TaskqError::Backend { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "redis unavailable");
            }
            other => panic!("expected backend error, got {other:?}"),
        }
    }
}
