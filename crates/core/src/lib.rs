//! Shared domain types for the taskboard workspace.
//!
//! Holds the `Project` and `Task` entities with their create/update DTOs,
//! the domain error type, and small pure helpers. This crate performs no
//! I/O; the db crate decodes rows into these types (behind the `sqlx`
//! feature) and the client crate deserializes API responses into them.

pub mod error;
pub mod project;
pub mod task;
pub mod types;
