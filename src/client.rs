use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::task::{NewTask, Task, TaskId};

const TASKS_PATH: &str = "/api/tasks";

/// REST client for the `/api/tasks` resource.
///
/// No timeout and no retries are configured: a request either resolves or
/// fails once, and callers decide what to do with the failure.
#[derive(Clone, Debug)]
pub struct TaskClient {
    base_url: String,
    http: reqwest::Client,
}

impl TaskClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn collection_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), TASKS_PATH)
    }

    pub fn task_url(&self, id: TaskId) -> String {
        format!("{}/{}", self.collection_url(), id)
    }

    pub async fn list(&self) -> Result<Vec<Task>, ApiError> {
        let url = self.collection_url();
        tracing::debug!(target: "taskboard.http", stage = "list.in", url = %url);
        let resp = self.send("GET", self.http.get(&url), &url).await?;
        let tasks: Vec<Task> = decode(resp, &url).await?;
        tracing::debug!(target: "taskboard.http", stage = "list.out", count = tasks.len());
        Ok(tasks)
    }

    pub async fn get(&self, id: TaskId) -> Result<Task, ApiError> {
        let url = self.task_url(id);
        tracing::debug!(target: "taskboard.http", stage = "get.in", url = %url);
        let resp = self.send("GET", self.http.get(&url), &url).await?;
        decode(resp, &url).await
    }

    pub async fn create(&self, task: &NewTask) -> Result<Task, ApiError> {
        let url = self.collection_url();
        tracing::debug!(
            target: "taskboard.http",
            stage = "create.in",
            url = %url,
            title_len = task.title.len(),
            priority = %task.priority
        );
        let resp = self.send("POST", self.http.post(&url).json(task), &url).await?;
        let created: Task = decode(resp, &url).await?;
        tracing::debug!(target: "taskboard.http", stage = "create.out", id = ?created.id);
        Ok(created)
    }

    /// Full-object replace of an existing task.
    pub async fn update(&self, task: &Task) -> Result<Task, ApiError> {
        let id = task.id.ok_or(ApiError::MissingId)?;
        let url = self.task_url(id);
        tracing::debug!(
            target: "taskboard.http",
            stage = "update.in",
            url = %url,
            status = %task.status,
            priority = %task.priority
        );
        let resp = self.send("PUT", self.http.put(&url).json(task), &url).await?;
        decode(resp, &url).await
    }

    pub async fn delete(&self, id: TaskId) -> Result<(), ApiError> {
        let url = self.task_url(id);
        tracing::debug!(target: "taskboard.http", stage = "delete.in", url = %url);
        let resp = self.send("DELETE", self.http.delete(&url), &url).await?;
        tracing::debug!(target: "taskboard.http", stage = "delete.out", status = %resp.status());
        Ok(())
    }

    async fn send(
        &self,
        method: &'static str,
        req: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<Response, ApiError> {
        let resp = req.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::status_error(
            method,
            url.to_string(),
            status.as_u16(),
            &body,
        ))
    }
}

async fn decode<T: DeserializeOwned>(resp: Response, url: &str) -> Result<T, ApiError> {
    let text = resp.text().await.map_err(|source| ApiError::Transport {
        url: url.to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|e| ApiError::decode_error(url.to_string(), e, &text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, Status};
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;

    const ONE_TASK: &str =
        r#"[{"id":1,"title":"Test Task","description":"Desc","priority":"HIGH","status":"TODO"}]"#;

    #[test]
    fn builds_resource_urls() {
        let client = TaskClient::new("http://localhost:8080/");
        assert_eq!(client.collection_url(), "http://localhost:8080/api/tasks");
        assert_eq!(client.task_url(1), "http://localhost:8080/api/tasks/1");
    }

    #[tokio::test]
    async fn list_decodes_tasks() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/api/tasks")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ONE_TASK)
            .create_async()
            .await;

        let client = TaskClient::new(server.url());
        let tasks = client.list().await.unwrap();
        m.assert_async().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Test Task");
        assert_eq!(tasks[0].priority, Priority::High);
    }

    #[tokio::test]
    async fn create_posts_title_description_priority() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/api/tasks")
            .match_body(Matcher::Json(serde_json::json!({
                "title": "Neue Aufgabe",
                "description": "Beschreibung",
                "priority": "MEDIUM"
            })))
            .with_status(201)
            .with_body(r#"{"id":5,"title":"Neue Aufgabe","description":"Beschreibung","priority":"MEDIUM","status":"TODO"}"#)
            .create_async()
            .await;

        let client = TaskClient::new(server.url());
        let created = client
            .create(&NewTask {
                title: "Neue Aufgabe".to_string(),
                description: "Beschreibung".to_string(),
                priority: Priority::Medium,
            })
            .await
            .unwrap();
        m.assert_async().await;
        assert_eq!(created.id, Some(5));
        assert_eq!(created.status, Status::Todo);
    }

    #[tokio::test]
    async fn update_requires_an_id() {
        let client = TaskClient::new("http://127.0.0.1:9");
        let task: Task = serde_json::from_str(r#"{"title":"unsaved"}"#).unwrap();
        let err = client.update(&task).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingId));
    }

    #[tokio::test]
    async fn delete_accepts_no_content() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("DELETE", "/api/tasks/1")
            .with_status(204)
            .create_async()
            .await;

        let client = TaskClient::new(server.url());
        client.delete(1).await.unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/tasks/999")
            .with_status(500)
            .with_body("Task not found with ID: 999")
            .create_async()
            .await;

        let client = TaskClient::new(server.url());
        let err = client.get(999).await.unwrap_err();
        match err {
            ApiError::Status {
                method,
                status,
                body,
                ..
            } => {
                assert_eq!(method, "GET");
                assert_eq!(status, 500);
                assert!(body.contains("999"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn garbage_body_is_a_decode_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/tasks")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let client = TaskClient::new(server.url());
        let err = client.list().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }
}
