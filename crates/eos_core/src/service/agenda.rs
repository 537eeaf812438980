//! Read-only planning views over loaded records.
//!
//! Every function here is pure; callers load collections through the engine
//! and pass them in.

use crate::model::project::Project;
use crate::model::task::{Task, TaskStatus};
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// A task blocked for longer than this many days counts as avoidance.
pub const AVOIDANCE_THRESHOLD_DAYS: i64 = 3;

const DAILY_FOCUS_PREFIX: &str = "daily_focus_";

/// Actionable tasks due on or before `today`.
///
/// `Doing` comes first, then higher priority. Tasks without a due date are
/// always due. Equal tasks keep collection order.
pub fn today_tasks(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    let today = iso_date(today);
    let mut due: Vec<Task> = tasks
        .iter()
        .filter(|task| task.status.is_scheduled() && task.due_date.as_str() <= today.as_str())
        .cloned()
        .collect();

    due.sort_by(|a, b| {
        let doing = |task: &Task| task.status == TaskStatus::Doing;
        let priority = |task: &Task| task.priority.map_or(0, |p| p.get());
        doing(b)
            .cmp(&doing(a))
            .then_with(|| priority(b).cmp(&priority(a)))
    });
    due
}

/// Whether some `Inbox` task was created before `today` and still waits
/// for processing.
pub fn has_stale_inbox(tasks: &[Task], today: NaiveDate) -> bool {
    tasks.iter().any(|task| {
        task.status == TaskStatus::Inbox
            && task
                .created_date
                .is_some_and(|created| created.date_naive() < today)
    })
}

/// Whether `task` has been blocked for more than
/// [`AVOIDANCE_THRESHOLD_DAYS`].
pub fn is_avoidance(task: &Task, now: DateTime<Utc>) -> bool {
    match (task.status, task.blocked_date) {
        (TaskStatus::Blocked, Some(blocked_at)) => {
            now - blocked_at > Duration::days(AVOIDANCE_THRESHOLD_DAYS)
        }
        _ => false,
    }
}

/// Task counts for one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectProgress {
    pub total: usize,
    pub done: usize,
    pub next: usize,
    /// Rounded share of done tasks, 0 when the project has no tasks.
    pub percent: u8,
}

pub fn project_progress(project_id: &str, tasks: &[Task]) -> ProjectProgress {
    let mut progress = ProjectProgress::default();
    for task in tasks.iter().filter(|task| task.belongs_to(project_id)) {
        progress.total += 1;
        match task.status {
            TaskStatus::Done => progress.done += 1,
            TaskStatus::Next => progress.next += 1,
            _ => {}
        }
    }
    if progress.total > 0 {
        // Half rounds up.
        let percent = (progress.done * 200 + progress.total) / (progress.total * 2);
        progress.percent = u8::try_from(percent).unwrap_or(100);
    }
    progress
}

pub fn active_project_count(projects: &[Project]) -> usize {
    projects.iter().filter(|project| project.is_active()).count()
}

/// Settings key holding the focus statement for `date`.
pub fn daily_focus_key(date: NaiveDate) -> String {
    format!("{DAILY_FOCUS_PREFIX}{}", iso_date(date))
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
