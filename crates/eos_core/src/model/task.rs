//! Task record.
//!
//! # Invariants
//! - `TaskName` has at least [`MIN_TASK_NAME_CHARS`] characters.
//! - `Next`/`Doing` tasks carry a project, a priority and an estimate.
//! - `BlockedDate` is present iff `Status = Blocked`.
//! - `CreatedDate` is written once and never cleared.

use super::generate_id;
use super::laws::{ValidationError, MIN_TASK_NAME_CHARS};
use super::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TaskId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Inbox,
    Next,
    Doing,
    Blocked,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "Inbox",
            Self::Next => "Next",
            Self::Doing => "Doing",
            Self::Blocked => "Blocked",
            Self::Done => "Done",
        }
    }

    /// `Next` and `Doing` tasks are scheduled work.
    pub fn is_scheduled(self) -> bool {
        matches!(self, Self::Next | Self::Doing)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Energy {
    Low,
    #[default]
    Medium,
    High,
}

/// Task priority, 1 (lowest) to 5 (highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TaskPriority(u8);

impl TaskPriority {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for TaskPriority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("task priority {value} is outside 1..=5"))
    }
}

impl From<TaskPriority> for u8 {
    fn from(value: TaskPriority) -> Self {
        value.0
    }
}

/// Time estimate in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum EstimatedTime {
    Min15,
    Min30,
    Min60,
    Min90,
}

impl EstimatedTime {
    pub fn minutes(self) -> u16 {
        match self {
            Self::Min15 => 15,
            Self::Min30 => 30,
            Self::Min60 => 60,
            Self::Min90 => 90,
        }
    }
}

impl TryFrom<u16> for EstimatedTime {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            15 => Ok(Self::Min15),
            30 => Ok(Self::Min30),
            60 => Ok(Self::Min60),
            90 => Ok(Self::Min90),
            other => Err(format!("estimated time {other} is not one of 15/30/60/90")),
        }
    }
}

impl From<EstimatedTime> for u16 {
    fn from(value: EstimatedTime) -> Self {
        value.minutes()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
    #[serde(rename = "TaskID")]
    pub task_id: TaskId,
    pub task_name: String,
    /// Empty means unassigned (Inbox). Weak reference; may not resolve.
    #[serde(rename = "ProjectID", default)]
    pub project_id: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub energy: Energy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<EstimatedTime>,
    /// `YYYY-MM-DD`, empty when unset.
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub notes: String,
    /// Managed by the engine.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::optional"
    )]
    pub blocked_date: Option<DateTime<Utc>>,
    /// Managed by the engine.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::optional"
    )]
    pub created_date: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates an unassigned `Inbox` task.
    pub fn new(task_name: impl Into<String>) -> Self {
        Self {
            task_id: generate_id(),
            task_name: task_name.into(),
            project_id: String::new(),
            status: TaskStatus::Inbox,
            priority: None,
            energy: Energy::default(),
            estimated_time: None,
            due_date: String::new(),
            notes: String::new(),
            blocked_date: None,
            created_date: None,
        }
    }

    /// Schedules the task under a project with the fields `Next` requires.
    pub fn scheduled(
        task_name: impl Into<String>,
        project_id: impl Into<String>,
        priority: TaskPriority,
        estimated_time: EstimatedTime,
    ) -> Self {
        let mut task = Self::new(task_name);
        task.project_id = project_id.into();
        task.status = TaskStatus::Next;
        task.priority = Some(priority);
        task.estimated_time = Some(estimated_time);
        task
    }

    pub fn has_project(&self) -> bool {
        !self.project_id.is_empty()
    }

    pub fn belongs_to(&self, project_id: &str) -> bool {
        self.has_project() && self.project_id == project_id
    }

    /// Rejects vague names.
    pub fn validate_name(&self) -> Result<(), ValidationError> {
        if self.task_name.chars().count() < MIN_TASK_NAME_CHARS {
            return Err(ValidationError::NameTooShort);
        }
        Ok(())
    }

    /// Scheduled tasks must be fully defined.
    pub fn validate_definition(&self) -> Result<(), ValidationError> {
        if self.status.is_scheduled()
            && (!self.has_project() || self.priority.is_none() || self.estimated_time.is_none())
        {
            return Err(ValidationError::IncompleteDefinition);
        }
        Ok(())
    }
}
