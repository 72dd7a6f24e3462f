//! Task entity, DTOs, and due-date ordering.
//!
//! Tasks belong to exactly one project for their whole life: the update DTO
//! deliberately has no `project_id` field.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Progress state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(type_name = "TEXT"))]
pub enum TaskStatus {
    #[default]
    ToDo,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// `true` for statuses that still need work (ToDo, InProgress).
    pub fn is_open(self) -> bool {
        !matches!(self, TaskStatus::Completed)
    }
}

/// A task row from the `tasks` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Timestamp>,
    /// Estimated effort in minutes.
    pub estimated_duration: Option<i32>,
    pub status: TaskStatus,
    pub project_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a task. The owning project comes from the URL path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<i32>,
    /// Defaults to `ToDo` if omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl CreateTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn due(mut self, due_date: Timestamp) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// DTO for updating a task. All fields are optional; omitted fields keep
/// their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl UpdateTask {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Compare two optional due dates ascending, with missing dates last.
pub fn compare_due_dates(a: Option<&Timestamp>, b: Option<&Timestamp>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort tasks the way the API lists them: due date ascending, undated
/// tasks last, ties by id.
///
/// Matches `ORDER BY due_date IS NULL, due_date, id` in the task repository.
pub fn sort_by_due_date(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        compare_due_dates(a.due_date.as_ref(), b.due_date.as_ref()).then(a.id.cmp(&b.id))
    });
}
