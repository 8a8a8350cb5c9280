//! REST client for the remote task store.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::RemoteStore;
use crate::error::{RemoteError, RemoteErrorKind};
use crate::list::TaskCounts;
use crate::task::{Task, TaskId};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Deserialize)]
struct TasksEnvelope {
    tasks: Vec<Task>,
}

#[derive(Deserialize)]
struct TaskEnvelope {
    task: Task,
}

#[derive(Serialize)]
struct NameBody<'a> {
    name: &'a str,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Health {
    pub status: String,
}

async fn read_body(resp: reqwest::Response, url: &str) -> Result<(u16, String), RemoteError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|err| RemoteError::from_reqwest(err, url))?;
    if !status.is_success() {
        return Err(RemoteError::status_error(status.as_u16(), url, &body));
    }
    Ok((status.as_u16(), body))
}

async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response, url: &str) -> Result<T, RemoteError> {
    let (status, body) = read_body(resp, url).await?;
    serde_json::from_str::<T>(&body).map_err(|err| RemoteError::decode_error(status, url, err, &body))
}

/// `reqwest`-backed [`RemoteStore`].
#[derive(Clone)]
pub struct HttpRemote {
    http: reqwest::Client,
    base: String,
    // Pre-built endpoints that take no id
    url_tasks: String,
    // Parsed form of `url_tasks`; ids are appended as encoded path segments
    tasks_endpoint: reqwest::Url,
    url_completed: String,
    url_all: String,
}

impl HttpRemote {
    /// Build a client for `base_url` (e.g. `http://localhost:5000/api`).
    ///
    /// `timeout_ms` of `None` leaves the transport default in place.
    pub fn new(base_url: &str, timeout_ms: Option<u64>) -> Result<Self, RemoteError> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let http = builder
            .build()
            .map_err(|err| RemoteError::from_reqwest(err, base_url))?;
        let base = base_url.trim_end_matches('/').to_string();
        let url_tasks = format!("{base}/tasks");
        let tasks_endpoint = reqwest::Url::parse(&url_tasks)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                RemoteError::new(RemoteErrorKind::Request, "base url is not a valid http(s) url")
                    .with_url(base_url)
            })?;
        Ok(Self {
            http,
            tasks_endpoint,
            url_tasks,
            url_completed: format!("{base}/tasks/completed"),
            url_all: format!("{base}/tasks/all"),
            base,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// `<base>/tasks/<id>` with the id percent-encoded as one path segment.
    fn task_url(&self, id: &TaskId, action: Option<&str>) -> String {
        let mut url = self.tasks_endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id.as_str());
            if let Some(action) = action {
                segments.push(action);
            }
        }
        url.into()
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<Health, RemoteError> {
        let url = format!("{}/health", self.base);
        tracing::debug!(target: "tasklist.remote", stage = "health.in", url = %url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| RemoteError::from_reqwest(err, &url))?;
        parse_json(resp, &url).await
    }

    /// `GET /tasks/count`
    pub async fn counts(&self) -> Result<TaskCounts, RemoteError> {
        let url = format!("{}/count", self.url_tasks);
        tracing::debug!(target: "tasklist.remote", stage = "count.in", url = %url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| RemoteError::from_reqwest(err, &url))?;
        parse_json(resp, &url).await
    }

    async fn send_for_task(&self, req: reqwest::RequestBuilder, url: &str) -> Result<Task, RemoteError> {
        let resp = req
            .send()
            .await
            .map_err(|err| RemoteError::from_reqwest(err, url))?;
        let envelope: TaskEnvelope = parse_json(resp, url).await?;
        Ok(envelope.task)
    }

    async fn send_for_nothing(&self, req: reqwest::RequestBuilder, url: &str) -> Result<(), RemoteError> {
        let resp = req
            .send()
            .await
            .map_err(|err| RemoteError::from_reqwest(err, url))?;
        let (status, _) = read_body(resp, url).await?;
        tracing::debug!(target: "tasklist.remote", stage = "delete.out", url = %url, status = status);
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn list_tasks(&self) -> Result<Vec<Task>, RemoteError> {
        let url = &self.url_tasks;
        tracing::debug!(target: "tasklist.remote", stage = "list.in", url = %url);
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| RemoteError::from_reqwest(err, url))?;
        let envelope: TasksEnvelope = parse_json(resp, url).await?;
        tracing::debug!(target: "tasklist.remote", stage = "list.out", tasks = envelope.tasks.len());
        Ok(envelope.tasks)
    }

    async fn create_task(&self, name: &str) -> Result<Task, RemoteError> {
        let url = &self.url_tasks;
        tracing::debug!(target: "tasklist.remote", stage = "create.in", url = %url, name_len = name.len());
        let req = self.http.post(url).json(&NameBody { name });
        self.send_for_task(req, url).await
    }

    async fn toggle_task(&self, id: &TaskId) -> Result<Task, RemoteError> {
        let url = self.task_url(id, Some("complete"));
        tracing::debug!(target: "tasklist.remote", stage = "toggle.in", url = %url);
        let req = self.http.patch(&url);
        self.send_for_task(req, &url).await
    }

    async fn rename_task(&self, id: &TaskId, name: &str) -> Result<Task, RemoteError> {
        let url = self.task_url(id, None);
        tracing::debug!(target: "tasklist.remote", stage = "rename.in", url = %url, name_len = name.len());
        let req = self.http.put(&url).json(&NameBody { name });
        self.send_for_task(req, &url).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), RemoteError> {
        let url = self.task_url(id, None);
        tracing::debug!(target: "tasklist.remote", stage = "delete.in", url = %url);
        let req = self.http.delete(&url);
        self.send_for_nothing(req, &url).await
    }

    async fn clear_completed(&self) -> Result<(), RemoteError> {
        let url = &self.url_completed;
        tracing::debug!(target: "tasklist.remote", stage = "clear_completed.in", url = %url);
        let req = self.http.delete(url);
        self.send_for_nothing(req, url).await
    }

    async fn clear_all(&self) -> Result<(), RemoteError> {
        let url = &self.url_all;
        tracing::debug!(target: "tasklist.remote", stage = "clear_all.in", url = %url);
        let req = self.http.delete(url);
        self.send_for_nothing(req, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Status;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn list_unwraps_tasks_envelope() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/tasks")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"tasks":[{"id":"a1","name":"Buy milk","status":"pending","created_at":"2024-05-01T10:00:00.000001"}]}"#)
            .create_async()
            .await;

        let remote = HttpRemote::new(&server.url(), None).unwrap();
        let tasks = remote.list_tasks().await.unwrap();
        m.assert_async().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, TaskId::from("a1"));
        assert_eq!(tasks[0].status, Status::Pending);
    }

    #[tokio::test]
    async fn create_sends_name_verbatim() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/tasks")
            .match_body(Matcher::Json(json!({"name": " Buy milk "})))
            .with_status(201)
            .with_body(r#"{"task":{"id":"n1","name":" Buy milk ","status":"pending"}}"#)
            .create_async()
            .await;

        let remote = HttpRemote::new(&format!("{}/", server.url()), None).unwrap();
        let task = remote.create_task(" Buy milk ").await.unwrap();
        m.assert_async().await;
        assert_eq!(task.name, " Buy milk ");
    }

    #[tokio::test]
    async fn toggle_uses_patch_complete() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("PATCH", "/tasks/7/complete")
            .with_status(200)
            .with_body(r#"{"task":{"id":7,"name":"x","status":"completed"}}"#)
            .create_async()
            .await;

        let remote = HttpRemote::new(&server.url(), Some(1_000)).unwrap();
        let task = remote.toggle_task(&TaskId::from(7)).await.unwrap();
        m.assert_async().await;
        assert_eq!(task.status, Status::Completed);
    }

    #[tokio::test]
    async fn rename_uses_put_with_name() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("PUT", "/tasks/7")
            .match_body(Matcher::Json(json!({"name": "Renamed"})))
            .with_status(200)
            .with_body(r#"{"task":{"id":7,"name":"Renamed","status":"pending"}}"#)
            .create_async()
            .await;

        let remote = HttpRemote::new(&server.url(), None).unwrap();
        let task = remote.rename_task(&TaskId::from(7), "Renamed").await.unwrap();
        m.assert_async().await;
        assert_eq!(task.name, "Renamed");
    }

    #[tokio::test]
    async fn ids_are_encoded_as_one_path_segment() {
        let mut server = Server::new_async().await;
        let rename = server
            .mock("PUT", "/tasks/a%3Fb")
            .match_body(Matcher::Json(json!({"name": "x"})))
            .with_status(200)
            .with_body(r#"{"task":{"id":"a?b","name":"x","status":"pending"}}"#)
            .create_async()
            .await;
        let toggle = server
            .mock("PATCH", "/tasks/x%2Fy%23z/complete")
            .with_status(200)
            .with_body(r#"{"task":{"id":"x/y#z","name":"n","status":"completed"}}"#)
            .create_async()
            .await;

        let remote = HttpRemote::new(&format!("{}/", server.url()), None).unwrap();
        let renamed = remote.rename_task(&TaskId::from("a?b"), "x").await.unwrap();
        let toggled = remote.toggle_task(&TaskId::from("x/y#z")).await.unwrap();
        rename.assert_async().await;
        toggle.assert_async().await;
        assert_eq!(renamed.id, TaskId::from("a?b"));
        assert_eq!(toggled.status, Status::Completed);
    }

    #[test]
    fn rejects_base_url_that_is_not_http() {
        let err = HttpRemote::new("not a url", None).err().unwrap();
        assert_eq!(err.kind(), RemoteErrorKind::Request);
        assert_eq!(err.url(), Some("not a url"));
    }

    #[tokio::test]
    async fn bulk_deletes_hit_their_routes() {
        let mut server = Server::new_async().await;
        let one = server.mock("DELETE", "/tasks/3").with_status(200).create_async().await;
        let completed = server
            .mock("DELETE", "/tasks/completed")
            .with_status(200)
            .with_body(r#"{"message":"Completed tasks cleared successfully"}"#)
            .create_async()
            .await;
        let all = server.mock("DELETE", "/tasks/all").with_status(200).create_async().await;

        let remote = HttpRemote::new(&server.url(), None).unwrap();
        remote.delete_task(&TaskId::from(3)).await.unwrap();
        remote.clear_completed().await.unwrap();
        remote.clear_all().await.unwrap();
        one.assert_async().await;
        completed.assert_async().await;
        all.assert_async().await;
    }

    #[tokio::test]
    async fn not_found_is_status_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("DELETE", "/tasks/missing")
            .with_status(404)
            .with_body(r#"{"error":"Task not found"}"#)
            .create_async()
            .await;

        let remote = HttpRemote::new(&server.url(), None).unwrap();
        let err = remote.delete_task(&TaskId::from("missing")).await.unwrap_err();
        assert_eq!(err.kind(), RemoteErrorKind::Status);
        assert_eq!(err.status(), Some(404));
        assert!(err.url().unwrap_or_default().contains("/tasks/missing"));
    }

    #[tokio::test]
    async fn garbage_body_is_decode_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/tasks")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let remote = HttpRemote::new(&server.url(), None).unwrap();
        let err = remote.list_tasks().await.unwrap_err();
        assert_eq!(err.kind(), RemoteErrorKind::Decode);
        assert_eq!(err.status(), Some(200));
    }

    #[tokio::test]
    async fn health_and_counts() {
        let mut server = Server::new_async().await;
        let _h = server
            .mock("GET", "/health")
            .with_status(200)
            .with_body(r#"{"status":"ok"}"#)
            .create_async()
            .await;
        let _c = server
            .mock("GET", "/tasks/count")
            .with_status(200)
            .with_body(r#"{"pending":2,"completed":1,"total":3}"#)
            .create_async()
            .await;

        let remote = HttpRemote::new(&server.url(), None).unwrap();
        assert_eq!(remote.health().await.unwrap().status, "ok");
        let counts = remote.counts().await.unwrap();
        assert_eq!(counts, TaskCounts { pending: 2, completed: 1, total: 3 });
    }

    #[tokio::test]
    async fn unreachable_server_is_connect_error() {
        let remote = HttpRemote::new("http://127.0.0.1:1", Some(2_000)).unwrap();
        let err = remote.list_tasks().await.unwrap_err();
        assert!(matches!(err.kind(), RemoteErrorKind::Connect | RemoteErrorKind::Request));
    }
}
