#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use taskboard_client::{ClientError, ProjectApi};
use taskboard_core::project::{Category, CreateProject, Project, UpdateProject};
use taskboard_core::task::{sort_by_due_date, CreateTask, Task, UpdateTask};
use taskboard_core::types::DbId;

/// In-memory stand-in for the REST server. Clones share the same state, so
/// a test can keep a handle while the store owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryApi {
    inner: Arc<Mutex<Server>>,
}

#[derive(Debug, Default)]
struct Server {
    next_id: DbId,
    projects: BTreeMap<DbId, Project>,
    tasks: BTreeMap<DbId, Task>,
    fail_next: bool,
    calls: usize,
}

impl Server {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    /// Count the call and consume a pending injected failure.
    fn begin(&mut self) -> Result<(), ClientError> {
        self.calls += 1;
        if std::mem::take(&mut self.fail_next) {
            return Err(ClientError::Api {
                status: 500,
                message: "An internal error occurred".to_string(),
            });
        }
        Ok(())
    }

    fn tasks_of(&self, project_id: DbId) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect();
        sort_by_due_date(&mut tasks);
        tasks
    }
}

fn not_found(entity: &str, id: DbId) -> ClientError {
    ClientError::NotFound {
        message: format!("{entity} with id {id} not found"),
    }
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call fail with a 500.
    pub fn fail_next(&self) {
        self.inner.lock().unwrap().fail_next = true;
    }

    /// Number of calls received so far.
    pub fn calls(&self) -> usize {
        self.inner.lock().unwrap().calls
    }

    /// What a fresh `GET /projects` would return right now.
    pub fn server_projects(&self) -> Vec<Project> {
        let server = self.inner.lock().unwrap();
        server.projects.values().rev().cloned().collect()
    }

    pub fn server_task(&self, id: DbId) -> Option<Task> {
        self.inner.lock().unwrap().tasks.get(&id).cloned()
    }

    /// Create a project directly on the server, bypassing any store.
    pub fn seed_project(&self, name: &str) -> Project {
        let mut server = self.inner.lock().unwrap();
        let id = server.next_id();
        let now = Utc::now();
        let project = Project {
            id,
            name: name.to_string(),
            description: None,
            category: Category::Personal,
            created_at: now,
            updated_at: now,
            tasks: None,
        };
        server.projects.insert(id, project.clone());
        project
    }
}

#[async_trait]
impl ProjectApi for MemoryApi {
    async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.inner.lock().unwrap().begin()?;
        Ok(self.server_projects())
    }

    async fn get_project(&self, id: DbId) -> Result<Project, ClientError> {
        let mut server = self.inner.lock().unwrap();
        server.begin()?;
        let mut project = server
            .projects
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("Project", id))?;
        project.tasks = Some(server.tasks_of(id));
        Ok(project)
    }

    async fn create_project(&self, input: &CreateProject) -> Result<Project, ClientError> {
        let mut server = self.inner.lock().unwrap();
        server.begin()?;
        if input.name.trim().is_empty() {
            return Err(ClientError::Api {
                status: 400,
                message: "name must not be empty".to_string(),
            });
        }
        let id = server.next_id();
        let now = Utc::now();
        let project = Project {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            category: input.category,
            created_at: now,
            updated_at: now,
            tasks: None,
        };
        server.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        id: DbId,
        patch: &UpdateProject,
    ) -> Result<Project, ClientError> {
        let mut server = self.inner.lock().unwrap();
        server.begin()?;
        let project = server
            .projects
            .get_mut(&id)
            .ok_or_else(|| not_found("Project", id))?;
        if let Some(name) = &patch.name {
            project.name = name.clone();
        }
        if let Some(description) = &patch.description {
            project.description = Some(description.clone());
        }
        if let Some(category) = patch.category {
            project.category = category;
        }
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn delete_project(&self, id: DbId) -> Result<(), ClientError> {
        let mut server = self.inner.lock().unwrap();
        server.begin()?;
        server
            .projects
            .remove(&id)
            .ok_or_else(|| not_found("Project", id))?;
        server.tasks.retain(|_, t| t.project_id != id);
        Ok(())
    }

    async fn list_tasks(&self, project_id: DbId) -> Result<Vec<Task>, ClientError> {
        let mut server = self.inner.lock().unwrap();
        server.begin()?;
        Ok(server.tasks_of(project_id))
    }

    async fn create_task(
        &self,
        project_id: DbId,
        input: &CreateTask,
    ) -> Result<Task, ClientError> {
        let mut server = self.inner.lock().unwrap();
        server.begin()?;
        if !server.projects.contains_key(&project_id) {
            return Err(not_found("Project", project_id));
        }
        let id = server.next_id();
        let now = Utc::now();
        let task = Task {
            id,
            title: input.title.clone(),
            description: input.description.clone(),
            due_date: input.due_date,
            estimated_duration: input.estimated_duration,
            status: input.status.unwrap_or_default(),
            project_id,
            created_at: now,
            updated_at: now,
        };
        server.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: DbId, patch: &UpdateTask) -> Result<Task, ClientError> {
        let mut server = self.inner.lock().unwrap();
        server.begin()?;
        let task = server
            .tasks
            .get_mut(&id)
            .ok_or_else(|| not_found("Task", id))?;
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(description) = &patch.description {
            task.description = Some(description.clone());
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(duration) = patch.estimated_duration {
            task.estimated_duration = Some(duration);
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: DbId) -> Result<(), ClientError> {
        let mut server = self.inner.lock().unwrap();
        server.begin()?;
        server
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("Task", id))
    }
}
