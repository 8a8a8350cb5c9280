//! Task list controller.
//!
//! `TaskListController` owns all list state and mediates between the remote
//! store (source of the tasks), the local cache (a full snapshot mirror) and
//! whatever view is rendering it. Every mutation waits for the store's answer
//! and derives the next list from it through the reducers in [`crate::list`];
//! on failure the state is left exactly as it was.

use tracing::{debug, info, warn};

use crate::cache::{self, LocalCache};
use crate::error::{Error, ValidationError};
use crate::fields::{Filter, HydrationPolicy};
use crate::list::{self, TaskCounts};
use crate::remote::RemoteStore;
use crate::task::{Task, TaskId};

pub const DEFAULT_CACHE_KEY: &str = "tasks";

/// Where the list came from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationSource {
    Cache,
    Remote,
}

/// Rename sub-state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Viewing,
    Editing { task_id: TaskId, draft: String },
}

/// A destructive action waiting for the user's go-ahead.
///
/// Obtained from one of the `request_*` methods and consumed by
/// [`TaskListController::confirm`]. Dropping it declines the action.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a confirmation does nothing until passed to `confirm`"]
pub enum Confirmation {
    DeleteTask { id: TaskId, name: String },
    ClearCompleted { count: usize },
    ClearAll { count: usize },
}

impl Confirmation {
    /// Question to put in front of the user.
    pub fn prompt(&self) -> String {
        match self {
            Confirmation::DeleteTask { name, .. } => format!("Delete task \"{name}\"?"),
            Confirmation::ClearCompleted { count } => {
                format!("Clear {count} completed task(s)?")
            }
            Confirmation::ClearAll { count } => format!("Delete all {count} task(s)?"),
        }
    }
}

/// Plain state container; every field is derived from remote answers or user input.
#[derive(Debug, Clone, Default)]
pub struct TaskListState {
    pub tasks: Vec<Task>,
    pub draft_name: String,
    pub submitting: bool,
    pub edit: EditState,
    pub filter: Filter,
}

pub struct TaskListController<R, C> {
    remote: R,
    cache: C,
    cache_key: String,
    policy: HydrationPolicy,
    cache_present: bool,
    source: Option<HydrationSource>,
    state: TaskListState,
}

impl<R: RemoteStore, C: LocalCache> TaskListController<R, C> {
    pub fn new(remote: R, cache: C) -> Self {
        TaskListController {
            remote,
            cache,
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            policy: HydrationPolicy::default(),
            cache_present: false,
            source: None,
            state: TaskListState::default(),
        }
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = key.into();
        self
    }

    pub fn with_policy(mut self, policy: HydrationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn state(&self) -> &TaskListState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    /// Where the current list came from, once hydration has succeeded.
    pub fn hydration_source(&self) -> Option<HydrationSource> {
        self.source
    }

    // ---- hydration ----

    /// Populate the list at startup according to the hydration policy.
    ///
    /// Once it has succeeded, later calls return the recorded source without
    /// touching either store. A failed remote fetch leaves the list empty and
    /// is not retried automatically.
    pub async fn hydrate(&mut self) -> Result<HydrationSource, Error> {
        if let Some(source) = self.source {
            return Ok(source);
        }

        let source = match self.policy {
            HydrationPolicy::CacheFirst => match self.read_snapshot() {
                Some(tasks) => {
                    info!(target: "tasklist", source = "cache", tasks = tasks.len(), "hydrated");
                    self.state.tasks = tasks;
                    HydrationSource::Cache
                }
                None => self.hydrate_from_remote().await?,
            },
            HydrationPolicy::RemoteFirst => {
                self.cache_present = matches!(self.cache.read(&self.cache_key), Ok(Some(_)));
                match self.hydrate_from_remote().await {
                    Ok(source) => source,
                    Err(err) => {
                        let tasks = self.read_snapshot().ok_or(err)?;
                        info!(target: "tasklist", source = "cache", tasks = tasks.len(), "remote unavailable, hydrated from cache");
                        self.state.tasks = tasks;
                        HydrationSource::Cache
                    }
                }
            }
        };
        self.source = Some(source);
        Ok(source)
    }

    async fn hydrate_from_remote(&mut self) -> Result<HydrationSource, Error> {
        match self.remote.list_tasks().await {
            Ok(tasks) => {
                info!(target: "tasklist", source = "remote", tasks = tasks.len(), "hydrated");
                self.set_tasks(tasks);
                Ok(HydrationSource::Remote)
            }
            Err(err) => {
                warn!(target: "tasklist", error = %err, "error fetching tasks");
                Err(err.into())
            }
        }
    }

    /// Cached snapshot, or `None` if missing or unreadable. Also records whether an entry exists.
    fn read_snapshot(&mut self) -> Option<Vec<Task>> {
        let raw = match self.cache.read(&self.cache_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(target: "tasklist", error = %err, "cache read failed");
                return None;
            }
        };
        self.cache_present = true;
        match cache::decode_snapshot(&raw) {
            Ok(tasks) => Some(tasks),
            Err(err) => {
                warn!(target: "tasklist", error = %err, "ignoring unparseable cache snapshot");
                None
            }
        }
    }

    /// Re-fetch the whole list from the remote store and overwrite the cache.
    pub async fn refresh(&mut self) -> Result<(), Error> {
        let tasks = self.remote.list_tasks().await.map_err(|err| {
            warn!(target: "tasklist", error = %err, "error refreshing tasks");
            Error::from(err)
        })?;
        self.source = Some(HydrationSource::Remote);
        self.set_tasks(tasks);
        Ok(())
    }

    // ---- cache mirror ----

    fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.state.tasks = tasks;
        self.sync_cache();
    }

    /// Write the full list back to the cache.
    ///
    /// An empty list is only written over an existing entry, so an empty
    /// in-memory list never creates a cache entry of its own.
    fn sync_cache(&mut self) {
        if self.state.tasks.is_empty() && !self.cache_present {
            return;
        }
        let result = cache::encode_snapshot(&self.state.tasks)
            .and_then(|raw| self.cache.write(&self.cache_key, &raw));
        match result {
            Ok(()) => {
                self.cache_present = true;
                debug!(target: "tasklist", tasks = self.state.tasks.len(), "cache synced");
            }
            Err(err) => warn!(target: "tasklist", error = %err, "cache write failed"),
        }
    }

    // ---- create ----

    pub fn draft_name(&self) -> &str {
        &self.state.draft_name
    }

    pub fn set_draft_name(&mut self, name: impl Into<String>) {
        self.state.draft_name = name.into();
    }

    /// Whether a create call is in flight (the add form is disabled meanwhile).
    pub fn is_submitting(&self) -> bool {
        self.state.submitting
    }

    /// Create a task from the current draft name.
    ///
    /// The draft is sent as typed; only a whitespace-only draft is rejected.
    /// The draft is cleared once the store has answered.
    pub async fn create(&mut self) -> Result<&Task, Error> {
        if self.state.draft_name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        self.state.submitting = true;
        let result = self.remote.create_task(&self.state.draft_name).await;
        self.state.submitting = false;

        let task = result.map_err(|err| {
            warn!(target: "tasklist", error = %err, "error adding task");
            Error::from(err)
        })?;
        let id = task.id.clone();
        info!(target: "tasklist", id = %id, "task added");
        let tasks = std::mem::take(&mut self.state.tasks);
        self.set_tasks(list::append(tasks, task));
        self.state.draft_name.clear();
        list::find(&self.state.tasks, &id).ok_or(Error::NotFound(id))
    }

    // ---- toggle / rename ----

    pub async fn toggle(&mut self, id: &TaskId) -> Result<(), Error> {
        if list::find(&self.state.tasks, id).is_none() {
            return Err(Error::NotFound(id.clone()));
        }
        let task = self.remote.toggle_task(id).await.map_err(|err| {
            warn!(target: "tasklist", id = %id, error = %err, "error toggling task");
            Error::from(err)
        })?;
        info!(target: "tasklist", id = %id, status = ?task.status, "task toggled");
        let tasks = std::mem::take(&mut self.state.tasks);
        self.set_tasks(list::replace(tasks, task));
        Ok(())
    }

    /// Rename a task directly, bypassing the edit sub-state.
    pub async fn rename(&mut self, id: &TaskId, name: &str) -> Result<(), Error> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if list::find(&self.state.tasks, id).is_none() {
            return Err(Error::NotFound(id.clone()));
        }
        let task = self.remote.rename_task(id, name).await.map_err(|err| {
            warn!(target: "tasklist", id = %id, error = %err, "error updating task");
            Error::from(err)
        })?;
        info!(target: "tasklist", id = %id, "task renamed");
        let tasks = std::mem::take(&mut self.state.tasks);
        self.set_tasks(list::replace(tasks, task));
        Ok(())
    }

    pub fn edit_state(&self) -> &EditState {
        &self.state.edit
    }

    /// Start renaming `id`, seeding the draft with its current name.
    pub fn begin_edit(&mut self, id: &TaskId) -> Result<(), Error> {
        let task = list::find(&self.state.tasks, id).ok_or_else(|| Error::NotFound(id.clone()))?;
        self.state.edit = EditState::Editing {
            task_id: id.clone(),
            draft: task.name.clone(),
        };
        Ok(())
    }

    pub fn set_edit_draft(&mut self, text: impl Into<String>) {
        if let EditState::Editing { draft, .. } = &mut self.state.edit {
            *draft = text.into();
        }
    }

    /// Discard the draft and go back to viewing.
    pub fn cancel_edit(&mut self) {
        self.state.edit = EditState::Viewing;
    }

    /// Send the draft as the new name.
    ///
    /// An empty draft is rejected and editing continues. On a store failure
    /// editing also continues so the draft is not lost.
    pub async fn confirm_edit(&mut self) -> Result<(), Error> {
        let (id, draft) = match &self.state.edit {
            EditState::Editing { task_id, draft } => (task_id.clone(), draft.clone()),
            EditState::Viewing => return Err(Error::NotEditing),
        };
        self.rename(&id, &draft).await?;
        self.state.edit = EditState::Viewing;
        Ok(())
    }

    // ---- destructive actions ----

    /// Ask to delete `id`.
    pub fn request_delete(&self, id: &TaskId) -> Result<Confirmation, Error> {
        let task = list::find(&self.state.tasks, id).ok_or_else(|| Error::NotFound(id.clone()))?;
        Ok(Confirmation::DeleteTask {
            id: id.clone(),
            name: task.name.clone(),
        })
    }

    /// Ask to clear completed tasks; `None` when there are none (no prompt needed).
    pub fn request_clear_completed(&self) -> Option<Confirmation> {
        let count = self.counts().completed;
        (count > 0).then_some(Confirmation::ClearCompleted { count })
    }

    /// Ask to clear everything; `None` when the list is already empty.
    pub fn request_clear_all(&self) -> Option<Confirmation> {
        let count = self.state.tasks.len();
        (count > 0).then_some(Confirmation::ClearAll { count })
    }

    /// Carry out an accepted confirmation.
    pub async fn confirm(&mut self, confirmation: Confirmation) -> Result<(), Error> {
        match confirmation {
            Confirmation::DeleteTask { id, .. } => {
                self.remote.delete_task(&id).await.map_err(|err| {
                    warn!(target: "tasklist", id = %id, error = %err, "error deleting task");
                    Error::from(err)
                })?;
                info!(target: "tasklist", id = %id, "task deleted");
                if matches!(&self.state.edit, EditState::Editing { task_id, .. } if *task_id == id) {
                    self.state.edit = EditState::Viewing;
                }
                let tasks = std::mem::take(&mut self.state.tasks);
                self.set_tasks(list::remove(tasks, &id));
            }
            Confirmation::ClearCompleted { .. } => {
                self.remote.clear_completed().await.map_err(|err| {
                    warn!(target: "tasklist", error = %err, "error clearing completed tasks");
                    Error::from(err)
                })?;
                info!(target: "tasklist", "completed tasks cleared");
                let tasks = std::mem::take(&mut self.state.tasks);
                self.set_tasks(list::remove_completed(tasks));
            }
            Confirmation::ClearAll { .. } => {
                self.remote.clear_all().await.map_err(|err| {
                    warn!(target: "tasklist", error = %err, "error clearing all tasks");
                    Error::from(err)
                })?;
                info!(target: "tasklist", "all tasks cleared");
                self.state.edit = EditState::Viewing;
                self.set_tasks(Vec::new());
            }
        }
        Ok(())
    }

    // ---- derived view state ----

    pub fn filter(&self) -> Filter {
        self.state.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.state.filter = filter;
    }

    /// Tasks matching the active filter, in list order.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        list::filtered(&self.state.tasks, self.state.filter)
    }

    /// Counts over the full, unfiltered list.
    pub fn counts(&self) -> TaskCounts {
        list::counts(&self.state.tasks)
    }
}
