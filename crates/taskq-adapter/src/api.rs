/*
[INPUT]:  Consumers that need backend access without binding to reqwest
[OUTPUT]: TaskQueueApi trait and its TaskqClient implementation
[POS]:    Seam between console logic and the HTTP layer
[UPDATE]: When an endpoint is added to TaskqClient that consumers need
*/

use async_trait::async_trait;

use crate::http::{Result, TaskqClient};
use crate::types::{MetricsSnapshot, SubmitTaskRequest, TaskPage, TaskQuery, TaskResponse};

/// Backend operations the console depends on.
#[async_trait]
pub trait TaskQueueApi: Send + Sync {
    async fn get_metrics(&self) -> Result<MetricsSnapshot>;

    async fn list_task_types(&self) -> Result<Vec<String>>;

    async fn list_tasks(&self, query: &TaskQuery) -> Result<TaskPage>;

    async fn get_task(&self, task_id: &str) -> Result<TaskResponse>;

    async fn submit_task(&self, request: &SubmitTaskRequest) -> Result<TaskResponse>;
}

#[async_trait]
impl TaskQueueApi for TaskqClient {
    async fn get_metrics(&self) -> Result<MetricsSnapshot> {
        TaskqClient::get_metrics(self).await
    }

    async fn list_task_types(&self) -> Result<Vec<String>> {
        TaskqClient::list_task_types(self).await
    }

    async fn list_tasks(&self, query: &TaskQuery) -> Result<TaskPage> {
        TaskqClient::list_tasks(self, query).await
    }

    async fn get_task(&self, task_id: &str) -> Result<TaskResponse> {
        TaskqClient::get_task(self, task_id).await
    }

    async fn submit_task(&self, request: &SubmitTaskRequest) -> Result<TaskResponse> {
        TaskqClient::submit_task(self, request).await
    }
}
