//! Read-only aggregates over the cached projects.
//!
//! Only tasks already held in the cache contribute to task figures (see
//! [`TaskSlot::known`](crate::store::TaskSlot::known)); nothing here
//! triggers a fetch.

use chrono::Duration;
use serde::Serialize;
use taskboard_core::task::{compare_due_dates, Task, TaskStatus};
use taskboard_core::types::Timestamp;

use crate::store::CachedProject;

/// How far ahead a due date still counts as upcoming.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

/// How many upcoming tasks are listed before the rest is summarized as a count.
pub const UPCOMING_DISPLAY_LIMIT: usize = 5;

/// Number of cached tasks per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub to_do: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl StatusCounts {
    fn record(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::ToDo => self.to_do += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::Completed => self.completed += 1,
        }
    }

    pub fn get(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::ToDo => self.to_do,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
        }
    }

    pub fn total(&self) -> usize {
        self.to_do + self.in_progress + self.completed
    }
}

/// An open task due soon, annotated with its project's name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingTask {
    #[serde(flatten)]
    pub task: Task,
    pub project_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_projects: usize,
    pub total_tasks: usize,
    pub status_counts: StatusCounts,
    /// At most [`UPCOMING_DISPLAY_LIMIT`] tasks, soonest first.
    pub upcoming: Vec<UpcomingTask>,
    /// Upcoming tasks left out of `upcoming`.
    pub more_upcoming: usize,
}

/// Compute every dashboard figure for `projects` as of `now`.
pub fn summarize(projects: &[CachedProject], now: Timestamp) -> DashboardSummary {
    let mut upcoming = upcoming_tasks(projects, now);
    let more_upcoming = upcoming.len().saturating_sub(UPCOMING_DISPLAY_LIMIT);
    upcoming.truncate(UPCOMING_DISPLAY_LIMIT);

    DashboardSummary {
        total_projects: projects.len(),
        total_tasks: total_tasks(projects),
        status_counts: count_by_status(projects),
        upcoming,
        more_upcoming,
    }
}

fn loaded_tasks(
    projects: &[CachedProject],
) -> impl Iterator<Item = (&CachedProject, &Task)> + '_ {
    projects.iter().flat_map(|entry| {
        entry.tasks.known().iter().map(move |task| (entry, task))
    })
}

pub fn total_tasks(projects: &[CachedProject]) -> usize {
    loaded_tasks(projects).count()
}

pub fn count_by_status(projects: &[CachedProject]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for (_, task) in loaded_tasks(projects) {
        counts.record(task.status);
    }
    counts
}

/// Whether `task` is open and due within `[now, now + 7 days]`.
pub fn is_upcoming(task: &Task, now: Timestamp) -> bool {
    let horizon = now + Duration::days(UPCOMING_WINDOW_DAYS);
    match task.due_date {
        Some(due) => task.status.is_open() && due >= now && due <= horizon,
        None => false,
    }
}

/// Every upcoming task, soonest first. Tasks due at the same instant keep
/// the order they were encountered in.
pub fn upcoming_tasks(projects: &[CachedProject], now: Timestamp) -> Vec<UpcomingTask> {
    let mut upcoming: Vec<UpcomingTask> = loaded_tasks(projects)
        .filter(|(_, task)| is_upcoming(task, now))
        .map(|(entry, task)| UpcomingTask {
            task: task.clone(),
            project_name: entry.project.name.clone(),
        })
        .collect();
    upcoming.sort_by(|a, b| compare_due_dates(a.task.due_date.as_ref(), b.task.due_date.as_ref()));
    upcoming
}
