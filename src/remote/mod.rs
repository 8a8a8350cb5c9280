//! Remote task store.
//!
//! The canonical task data lives behind a REST resource at `/tasks`. The
//! controller talks to it only through [`RemoteStore`], so the HTTP client and
//! the in-process store used by tests are interchangeable.

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::task::{Task, TaskId};

pub mod http;
pub mod memory;

pub use http::HttpRemote;
pub use memory::{MemoryRemote, RemoteCall};

/// Operations the task list needs from the remote store.
///
/// Each call returns the store's own view of the affected task; the client
/// never fabricates one.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// `GET /tasks`
    async fn list_tasks(&self) -> Result<Vec<Task>, RemoteError>;

    /// `POST /tasks` with `{name}`
    async fn create_task(&self, name: &str) -> Result<Task, RemoteError>;

    /// `PATCH /tasks/{id}/complete`
    async fn toggle_task(&self, id: &TaskId) -> Result<Task, RemoteError>;

    /// `PUT /tasks/{id}` with `{name}`
    async fn rename_task(&self, id: &TaskId, name: &str) -> Result<Task, RemoteError>;

    /// `DELETE /tasks/{id}`
    async fn delete_task(&self, id: &TaskId) -> Result<(), RemoteError>;

    /// `DELETE /tasks/completed`
    async fn clear_completed(&self) -> Result<(), RemoteError>;

    /// `DELETE /tasks/all`
    async fn clear_all(&self) -> Result<(), RemoteError>;
}
