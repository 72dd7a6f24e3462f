//! Client-side replica of the taskboard server state.
//!
//! [`ProjectStore`] holds the most recently confirmed projects (and, lazily,
//! their tasks) and mutates that state only after the server has answered.
//! The HTTP transport sits behind the [`ProjectApi`] trait so the store can
//! be driven by [`HttpApi`] in production and by fakes in tests.
//! [`dashboard`] derives read-only aggregates from the cached state.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod store;

pub use api::{HttpApi, ProjectApi};
pub use config::ClientConfig;
pub use error::ClientError;
pub use store::{CachedProject, ProjectStore, StoreState, TaskSlot};
