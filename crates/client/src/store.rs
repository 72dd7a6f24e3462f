//! Pessimistic client-side cache of projects and their tasks.
//!
//! Every mutation performs exactly one request and touches local state only
//! after the server has confirmed it, so a failed call never needs rolling
//! back. The request is awaited without holding the state lock; the write
//! lock is taken briefly afterwards to apply the response. Overlapping
//! calls are applied in arrival order and the last response wins.

use taskboard_core::project::{CreateProject, Project, UpdateProject};
use taskboard_core::task::{CreateTask, Task, UpdateTask};
use taskboard_core::types::{DbId, Timestamp};
use tokio::sync::RwLock;

use crate::api::ProjectApi;
use crate::dashboard::{self, DashboardSummary};
use crate::error::ClientError;

/// Message recorded when the project list cannot be loaded.
pub const FETCH_PROJECTS_FAILED: &str = "Failed to load projects.";

/// Whether a project's tasks are known locally.
///
/// An empty `Loaded` list means the project has no tasks; `NotLoaded` means
/// nothing is known yet. `Partial` holds tasks this client created before
/// the full list was ever fetched: they are real, but others may exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TaskSlot {
    #[default]
    NotLoaded,
    Loading,
    Partial(Vec<Task>),
    Loaded(Vec<Task>),
}

impl TaskSlot {
    /// The complete task list, if it has been fetched.
    pub fn loaded(&self) -> Option<&[Task]> {
        match self {
            TaskSlot::Loaded(tasks) => Some(tasks),
            _ => None,
        }
    }

    /// Every task known locally, complete or not.
    pub fn known(&self) -> &[Task] {
        match self {
            TaskSlot::Loaded(tasks) | TaskSlot::Partial(tasks) => tasks,
            TaskSlot::NotLoaded | TaskSlot::Loading => &[],
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, TaskSlot::Loaded(_))
    }

    fn known_mut(&mut self) -> Option<&mut Vec<Task>> {
        match self {
            TaskSlot::Loaded(tasks) | TaskSlot::Partial(tasks) => Some(tasks),
            TaskSlot::NotLoaded | TaskSlot::Loading => None,
        }
    }
}

/// A project as held by the store. `project.tasks` is always `None` here;
/// the tasks live in `tasks`.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedProject {
    pub project: Project,
    pub tasks: TaskSlot,
}

impl CachedProject {
    /// Wrap a server representation, moving any embedded task list into the
    /// slot.
    fn from_server(mut project: Project) -> Self {
        let tasks = match project.tasks.take() {
            Some(tasks) => TaskSlot::Loaded(tasks),
            None => TaskSlot::NotLoaded,
        };
        Self { project, tasks }
    }

    pub fn id(&self) -> DbId {
        self.project.id
    }
}

/// Everything the store knows, as one cloneable value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    /// Projects in server order (newest first after a fetch), new ones
    /// appended.
    pub projects: Vec<CachedProject>,
    /// `true` while at least one `fetch_projects` call is in flight.
    pub loading: bool,
    /// User-facing message from the last failed `fetch_projects`.
    pub error: Option<String>,
}

impl StoreState {
    fn find_mut(&mut self, id: DbId) -> Option<&mut CachedProject> {
        self.projects.iter_mut().find(|entry| entry.id() == id)
    }

    /// Replace the entry with the same id, or append a new one.
    fn upsert(&mut self, entry: CachedProject) {
        match self.find_mut(entry.id()) {
            Some(existing) => *existing = entry,
            None => self.projects.push(entry),
        }
    }

    /// The cached task list containing `task_id`, if any.
    fn task_list_containing(&mut self, task_id: DbId) -> Option<&mut Vec<Task>> {
        self.projects
            .iter_mut()
            .filter_map(|entry| entry.tasks.known_mut())
            .find(|tasks| tasks.iter().any(|t| t.id == task_id))
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: StoreState,
    pending_fetches: usize,
}

/// Client-side replica of the server's projects and tasks.
///
/// Methods take `&self`; share the store behind an `Arc` to use it from
/// several tasks.
#[derive(Debug)]
pub struct ProjectStore<A> {
    api: A,
    inner: RwLock<Inner>,
}

impl<A: ProjectApi> ProjectStore<A> {
    /// An empty store. Call [`fetch_projects`](Self::fetch_projects) to
    /// populate it.
    pub fn new(api: A) -> Self {
        Self {
            api,
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    // ---- projects ----

    /// Replace the whole collection with the server's project list. Every
    /// entry's tasks return to [`TaskSlot::NotLoaded`].
    ///
    /// On failure the previous collection is kept and
    /// [`FETCH_PROJECTS_FAILED`] is recorded in [`error`](Self::error).
    pub async fn fetch_projects(&self) -> Result<(), ClientError> {
        {
            let mut inner = self.inner.write().await;
            inner.pending_fetches += 1;
            inner.state.loading = true;
        }

        let result = self.api.list_projects().await;

        let mut inner = self.inner.write().await;
        inner.pending_fetches = inner.pending_fetches.saturating_sub(1);
        inner.state.loading = inner.pending_fetches > 0;

        match result {
            Ok(projects) => {
                inner.state.projects = projects
                    .into_iter()
                    .map(|mut project| {
                        project.tasks = None;
                        CachedProject::from_server(project)
                    })
                    .collect();
                inner.state.error = None;
                tracing::debug!(count = inner.state.projects.len(), "Projects loaded");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "Error fetching projects");
                inner.state.error = Some(FETCH_PROJECTS_FAILED.to_string());
                Err(err)
            }
        }
    }

    /// Local lookup only; never fetches.
    pub async fn get_project_by_id(&self, id: DbId) -> Option<CachedProject> {
        let inner = self.inner.read().await;
        inner
            .state
            .projects
            .iter()
            .find(|entry| entry.id() == id)
            .cloned()
    }

    /// Fetch one project with its tasks and upsert it into the cache.
    pub async fn load_project(&self, id: DbId) -> Result<CachedProject, ClientError> {
        let project = self.api.get_project(id).await.inspect_err(|err| {
            tracing::error!(project_id = id, error = %err, "Error fetching project");
        })?;

        let entry = CachedProject::from_server(project);
        self.inner.write().await.state.upsert(entry.clone());
        Ok(entry)
    }

    pub async fn create_project(&self, input: &CreateProject) -> Result<Project, ClientError> {
        let project = self.api.create_project(input).await.inspect_err(|err| {
            tracing::error!(error = %err, "Error creating project");
        })?;

        let mut inner = self.inner.write().await;
        inner.state.upsert(CachedProject::from_server(project.clone()));
        tracing::debug!(project_id = project.id, "Project cached");
        Ok(project)
    }

    /// Apply a partial update. A project missing from the cache stays
    /// missing; loaded tasks are kept.
    pub async fn update_project(
        &self,
        id: DbId,
        patch: &UpdateProject,
    ) -> Result<Project, ClientError> {
        let project = self.api.update_project(id, patch).await.inspect_err(|err| {
            tracing::error!(project_id = id, error = %err, "Error updating project");
        })?;

        let mut inner = self.inner.write().await;
        if let Some(entry) = inner.state.find_mut(id) {
            let mut fresh = project.clone();
            if let Some(tasks) = fresh.tasks.take() {
                entry.tasks = TaskSlot::Loaded(tasks);
            }
            entry.project = fresh;
        }
        Ok(project)
    }

    /// Delete a project. Its tasks leave the cache with it.
    pub async fn delete_project(&self, id: DbId) -> Result<(), ClientError> {
        self.api.delete_project(id).await.inspect_err(|err| {
            tracing::error!(project_id = id, error = %err, "Error deleting project");
        })?;

        let mut inner = self.inner.write().await;
        inner.state.projects.retain(|entry| entry.id() != id);
        tracing::debug!(project_id = id, "Project removed from cache");
        Ok(())
    }

    // ---- tasks ----

    /// Replace a project's task slot with the server's list (due date
    /// ascending, undated last).
    ///
    /// A slot that already holds tasks keeps them visible while the request
    /// is in flight.
    pub async fn fetch_tasks_for_project(&self, project_id: DbId) -> Result<Vec<Task>, ClientError> {
        {
            let mut inner = self.inner.write().await;
            if let Some(entry) = inner.state.find_mut(project_id) {
                if entry.tasks == TaskSlot::NotLoaded {
                    entry.tasks = TaskSlot::Loading;
                }
            }
        }

        let result = self.api.list_tasks(project_id).await;

        let mut inner = self.inner.write().await;
        let entry = inner.state.find_mut(project_id);
        match result {
            Ok(tasks) => {
                if let Some(entry) = entry {
                    entry.tasks = TaskSlot::Loaded(tasks.clone());
                }
                tracing::debug!(project_id, count = tasks.len(), "Tasks loaded");
                Ok(tasks)
            }
            Err(err) => {
                if let Some(entry) = entry {
                    if entry.tasks == TaskSlot::Loading {
                        entry.tasks = TaskSlot::NotLoaded;
                    }
                }
                tracing::error!(project_id, error = %err, "Error fetching tasks");
                Err(err)
            }
        }
    }

    /// Return the complete task list, fetching it unless the slot is
    /// already [`TaskSlot::Loaded`].
    pub async fn ensure_tasks_loaded(&self, project_id: DbId) -> Result<Vec<Task>, ClientError> {
        {
            let inner = self.inner.read().await;
            let cached = inner
                .state
                .projects
                .iter()
                .find(|entry| entry.id() == project_id)
                .and_then(|entry| entry.tasks.loaded());
            if let Some(tasks) = cached {
                return Ok(tasks.to_vec());
            }
        }
        self.fetch_tasks_for_project(project_id).await
    }

    /// Create a task and append it to its project's slot. A slot without a
    /// complete list becomes [`TaskSlot::Partial`], so a later
    /// [`ensure_tasks_loaded`](Self::ensure_tasks_loaded) still fetches.
    pub async fn create_task(
        &self,
        project_id: DbId,
        input: &CreateTask,
    ) -> Result<Task, ClientError> {
        let task = self
            .api
            .create_task(project_id, input)
            .await
            .inspect_err(|err| {
                tracing::error!(project_id, error = %err, "Error creating task");
            })?;

        let mut inner = self.inner.write().await;
        if let Some(entry) = inner.state.find_mut(project_id) {
            match entry.tasks.known_mut() {
                Some(tasks) => match tasks.iter_mut().find(|t| t.id == task.id) {
                    Some(existing) => *existing = task.clone(),
                    None => tasks.push(task.clone()),
                },
                None => entry.tasks = TaskSlot::Partial(vec![task.clone()]),
            }
        }
        tracing::debug!(task_id = task.id, project_id, "Task cached");
        Ok(task)
    }

    /// Apply a partial update and replace the task wherever it is cached.
    /// The task stays in the project that already holds it.
    pub async fn update_task(&self, task_id: DbId, patch: &UpdateTask) -> Result<Task, ClientError> {
        let task = self
            .api
            .update_task(task_id, patch)
            .await
            .inspect_err(|err| {
                tracing::error!(task_id, error = %err, "Error updating task");
            })?;

        let mut inner = self.inner.write().await;
        if let Some(tasks) = inner.state.task_list_containing(task_id) {
            if let Some(existing) = tasks.iter_mut().find(|t| t.id == task_id) {
                *existing = task.clone();
            }
        }
        Ok(task)
    }

    pub async fn delete_task(&self, task_id: DbId) -> Result<(), ClientError> {
        self.api.delete_task(task_id).await.inspect_err(|err| {
            tracing::error!(task_id, error = %err, "Error deleting task");
        })?;

        let mut inner = self.inner.write().await;
        if let Some(tasks) = inner.state.task_list_containing(task_id) {
            tasks.retain(|t| t.id != task_id);
        }
        Ok(())
    }

    // ---- read accessors ----

    pub async fn snapshot(&self) -> StoreState {
        self.inner.read().await.state.clone()
    }

    pub async fn projects(&self) -> Vec<CachedProject> {
        self.inner.read().await.state.projects.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.read().await.state.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.read().await.state.error.clone()
    }

    /// Dashboard aggregates over the current cache.
    pub async fn dashboard(&self, now: Timestamp) -> DashboardSummary {
        let inner = self.inner.read().await;
        dashboard::summarize(&inner.state.projects, now)
    }
}
