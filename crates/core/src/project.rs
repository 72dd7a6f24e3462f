//! Project entity and DTOs.
//!
//! A project is the top-level unit of organization and owns zero or more
//! tasks. The `tasks` field is only populated when a caller explicitly asks
//! for them (the detail endpoint); list and mutation responses omit it.

use serde::{Deserialize, Serialize};

use crate::task::Task;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Coarse grouping a project belongs to.
///
/// Serialized (and stored) as the variant name, e.g. `"Personal"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(type_name = "TEXT"))]
pub enum Category {
    #[default]
    Personal,
    Work,
    Family,
    Other,
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A project row from the `projects` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Owned tasks, ordered by due date. `None` means "not loaded", which is
    /// not the same as an empty list.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for creating a new project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Defaults to `Personal` if omitted.
    #[serde(default)]
    pub category: Category,
}

impl CreateProject {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            description: None,
            category,
        }
    }
}

/// DTO for updating an existing project. All fields are optional; omitted
/// fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
