/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for taskq-adapter tests

use taskq_adapter::{ClientConfig, TaskqClient};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server
pub fn client_for(server: &MockServer) -> TaskqClient {
    TaskqClient::with_config(ClientConfig {
        base_url: server.uri(),
        ..ClientConfig::default()
    })
    .expect("client init")
}

/// One task entity as the backend serializes it
pub fn task_json(task_id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "taskId": task_id,
        "taskType": "EMAIL_SEND",
        "priority": "HIGH",
        "status": status,
        "retryCount": 0,
        "maxRetries": 3,
        "createdAt": "2024-05-01T10:00:00"
    })
}
