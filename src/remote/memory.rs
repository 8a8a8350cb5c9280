//! In-process remote store.
//!
//! Behaves like the REST server (ids assigned on create, toggle flips status,
//! unknown ids answer 404) and records every call it receives. Calls can be
//! made to fail to exercise the controller's error paths.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Local;

use super::RemoteStore;
use crate::error::{RemoteError, RemoteErrorKind};
use crate::fields::Status;
use crate::task::{Task, TaskId};

/// One request as seen by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    List,
    Create { name: String },
    Toggle(TaskId),
    Rename { id: TaskId, name: String },
    Delete(TaskId),
    ClearCompleted,
    ClearAll,
}

#[derive(Debug, Default)]
struct Inner {
    tasks: Vec<Task>,
    next_id: u64,
    calls: Vec<RemoteCall>,
    offline: bool,
}

#[derive(Debug, Default)]
pub struct MemoryRemote {
    inner: Mutex<Inner>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `tasks`. New ids continue after the largest numeric id.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks
            .iter()
            .filter_map(|t| t.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        MemoryRemote {
            inner: Mutex::new(Inner {
                tasks,
                next_id,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means a test thread panicked mid-call; the data is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every following call fail with a connect error until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.lock().calls.clone()
    }

    /// The store's own copy of the list.
    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    fn begin(&self, call: RemoteCall) -> Result<MutexGuard<'_, Inner>, RemoteError> {
        let mut inner = self.lock();
        inner.calls.push(call);
        if inner.offline {
            return Err(RemoteError::new(RemoteErrorKind::Connect, "remote store is offline"));
        }
        Ok(inner)
    }
}

fn not_found(id: &TaskId) -> RemoteError {
    RemoteError::new(RemoteErrorKind::Status, "Task not found")
        .with_status(404)
        .with_url(format!("memory:/tasks/{id}"))
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn list_tasks(&self) -> Result<Vec<Task>, RemoteError> {
        let inner = self.begin(RemoteCall::List)?;
        Ok(inner.tasks.clone())
    }

    async fn create_task(&self, name: &str) -> Result<Task, RemoteError> {
        let mut inner = self.begin(RemoteCall::Create { name: name.to_string() })?;
        inner.next_id += 1;
        let task = Task {
            id: TaskId::from(inner.next_id),
            name: name.to_string(),
            status: Status::Pending,
            created_at: Some(Local::now().naive_local()),
        };
        inner.tasks.push(task.clone());
        Ok(task)
    }

    async fn toggle_task(&self, id: &TaskId) -> Result<Task, RemoteError> {
        let mut inner = self.begin(RemoteCall::Toggle(id.clone()))?;
        let task = inner
            .tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| not_found(id))?;
        task.status = match task.status {
            Status::Pending => Status::Completed,
            Status::Completed => Status::Pending,
        };
        Ok(task.clone())
    }

    async fn rename_task(&self, id: &TaskId, name: &str) -> Result<Task, RemoteError> {
        let mut inner = self.begin(RemoteCall::Rename {
            id: id.clone(),
            name: name.to_string(),
        })?;
        let task = inner
            .tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| not_found(id))?;
        task.name = name.to_string();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), RemoteError> {
        let mut inner = self.begin(RemoteCall::Delete(id.clone()))?;
        let before = inner.tasks.len();
        inner.tasks.retain(|t| &t.id != id);
        if inner.tasks.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn clear_completed(&self) -> Result<(), RemoteError> {
        let mut inner = self.begin(RemoteCall::ClearCompleted)?;
        inner.tasks.retain(|t| !t.is_completed());
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), RemoteError> {
        let mut inner = self.begin(RemoteCall::ClearAll)?;
        inner.tasks.clear();
        Ok(())
    }
}
