/*
[INPUT]:  Mock HTTP responses
[OUTPUT]: Test results for HTTP client
[POS]:    Integration tests - HTTP endpoints
[UPDATE]: When HTTP endpoints change
*/

mod common;

use std::time::Duration;

use common::{client_for, setup_mock_server, task_json};
use rstest::rstest;
use taskq_adapter::{ClientConfig, TaskQueueApi, TaskQuery, TaskStatus, TaskqClient, TaskqError};
use tokio_test::assert_ok;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_client_creation() {
    let client = assert_ok!(TaskqClient::new());
    assert_eq!(client.base_url().as_str(), "http://localhost:8080/");
}

#[test]
fn test_client_keeps_path_prefix() {
    let config = ClientConfig {
        base_url: "http://gateway.internal/queue".to_string(),
        ..ClientConfig::default()
    };
    let client = assert_ok!(TaskqClient::with_config(config));
    assert_eq!(client.base_url().as_str(), "http://gateway.internal/queue/");
}

#[test]
fn test_client_rejects_invalid_base_url() {
    let config = ClientConfig {
        base_url: "not a url".to_string(),
        ..ClientConfig::default()
    };
    let err = TaskqClient::with_config(config).unwrap_err();
    assert!(matches!(err, TaskqError::UrlParse(_)));
}

#[rstest]
#[case(None, None)]
#[case(Some(TaskStatus::Pending), Some("PENDING"))]
#[case(Some(TaskStatus::Processing), Some("PROCESSING"))]
#[case(Some(TaskStatus::Completed), Some("COMPLETED"))]
#[case(Some(TaskStatus::Failed), Some("FAILED"))]
#[tokio::test]
async fn test_status_parameter_sent_only_when_filtered(
    #[case] status: Option<TaskStatus>,
    #[case] expected: Option<&str>,
) {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": [task_json("t-1", "PENDING")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = TaskQuery {
        status,
        ..TaskQuery::default()
    };
    let page = assert_ok!(client.list_tasks(&query).await);
    assert_eq!(page.content.len(), 1);

    let requests = server.received_requests().await.expect("recording enabled");
    let sent_status = requests[0]
        .url
        .query_pairs()
        .find(|(key, _)| key == "status")
        .map(|(_, value)| value.into_owned());
    assert_eq!(sent_status.as_deref(), expected);
}

#[tokio::test]
async fn test_missing_content_is_empty_page() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .and(query_param("status", "FAILED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalElements": 0
        })))
        .mount(&server)
        .await;

    let page = assert_ok!(
        client_for(&server)
            .list_tasks(&TaskQuery {
                status: Some(TaskStatus::Failed),
                ..TaskQuery::default()
            })
            .await
    );
    assert!(page.is_empty());
}

#[tokio::test]
async fn test_trait_object_dispatches_to_client() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/metrics/task-types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["EMAIL_SEND"])))
        .expect(1)
        .mount(&server)
        .await;

    let api: Box<dyn TaskQueueApi> = Box::new(client_for(&server));
    let types = assert_ok!(api.list_task_types().await);
    assert_eq!(types, vec!["EMAIL_SEND".to_string()]);
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Bind then drop a plain listener so nothing answers on the port.
    let uri = {
        let listener = assert_ok!(std::net::TcpListener::bind("127.0.0.1:0"));
        format!("http://{}", assert_ok!(listener.local_addr()))
    };
    let client = assert_ok!(TaskqClient::with_config(ClientConfig {
        base_url: uri,
        timeout: Duration::from_secs(2),
        connect_timeout: Duration::from_secs(1),
    }));

    let err = client.get_metrics().await.unwrap_err();
    assert!(err.is_network(), "expected network error, got {err:?}");
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalTasks": 3
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).get_metrics().await.unwrap_err();
    assert!(matches!(err, TaskqError::Serialization(_)));
}
