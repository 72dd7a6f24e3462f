//! REST transport for the taskboard API.
//!
//! [`ProjectApi`] is the seam the store talks through; [`HttpApi`] implements
//! it on top of [`reqwest`].

use async_trait::async_trait;
use serde::Deserialize;
use taskboard_core::project::{CreateProject, Project, UpdateProject};
use taskboard_core::task::{CreateTask, Task, UpdateTask};
use taskboard_core::types::DbId;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Operations the server exposes over `/api`.
#[async_trait]
pub trait ProjectApi: Send + Sync {
    /// `GET /projects`, newest first, tasks not loaded.
    async fn list_projects(&self) -> Result<Vec<Project>, ClientError>;

    /// `GET /projects/{id}`, with tasks loaded.
    async fn get_project(&self, id: DbId) -> Result<Project, ClientError>;

    async fn create_project(&self, input: &CreateProject) -> Result<Project, ClientError>;

    async fn update_project(
        &self,
        id: DbId,
        patch: &UpdateProject,
    ) -> Result<Project, ClientError>;

    async fn delete_project(&self, id: DbId) -> Result<(), ClientError>;

    /// `GET /projects/{id}/tasks`, ordered by due date.
    async fn list_tasks(&self, project_id: DbId) -> Result<Vec<Task>, ClientError>;

    async fn create_task(&self, project_id: DbId, input: &CreateTask)
        -> Result<Task, ClientError>;

    async fn update_task(&self, id: DbId, patch: &UpdateTask) -> Result<Task, ClientError>;

    async fn delete_task(&self, id: DbId) -> Result<(), ClientError>;
}

/// Error body produced by the server, `{ "message": ..., "code": ... }`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client for a taskboard server.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    api_url: String,
}

impl HttpApi {
    /// Create a client for the given base URL, e.g. `http://host:3000/api`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    /// Build a client with the configured base URL and request timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. 404 becomes
    /// [`ClientError::NotFound`]; any other failure becomes
    /// [`ClientError::Api`] carrying the server's message when it sent one.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let raw = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let message = serde_json::from_str::<ErrorBody>(&raw)
            .map(|body| body.message)
            .unwrap_or(raw);

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound { message });
        }
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ClientError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl ProjectApi for HttpApi {
    async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        let response = self.client.get(self.url("/projects")).send().await?;
        Self::parse_response(response).await
    }

    async fn get_project(&self, id: DbId) -> Result<Project, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/projects/{id}")))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn create_project(&self, input: &CreateProject) -> Result<Project, ClientError> {
        let response = self
            .client
            .post(self.url("/projects"))
            .json(input)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update_project(
        &self,
        id: DbId,
        patch: &UpdateProject,
    ) -> Result<Project, ClientError> {
        let response = self
            .client
            .put(self.url(&format!("/projects/{id}")))
            .json(patch)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete_project(&self, id: DbId) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/projects/{id}")))
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn list_tasks(&self, project_id: DbId) -> Result<Vec<Task>, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/projects/{project_id}/tasks")))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn create_task(
        &self,
        project_id: DbId,
        input: &CreateTask,
    ) -> Result<Task, ClientError> {
        let response = self
            .client
            .post(self.url(&format!("/projects/{project_id}/tasks")))
            .json(input)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update_task(&self, id: DbId, patch: &UpdateTask) -> Result<Task, ClientError> {
        let response = self
            .client
            .put(self.url(&format!("/tasks/{id}")))
            .json(patch)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete_task(&self, id: DbId) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/tasks/{id}")))
            .send()
            .await?;
        Self::check_status(response).await
    }
}
