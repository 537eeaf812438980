//! Second-brain note record.
//!
//! Notes carry no System Laws. Their project/task relations are weak ids.

use super::generate_id;
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub type NoteId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteType {
    Idea,
    Insight,
    Planning,
    Reflection,
    Lesson,
}

impl NoteType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idea => "Idea",
            Self::Insight => "Insight",
            Self::Planning => "Planning",
            Self::Reflection => "Reflection",
            Self::Lesson => "Lesson",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Note {
    #[serde(rename = "NoteID")]
    pub note_id: NoteId,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "Type")]
    pub note_type: NoteType,
    #[serde(
        rename = "RelatedProjectID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub related_project_id: Option<String>,
    #[serde(
        rename = "RelatedTaskID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub related_task_id: Option<String>,
    #[serde(default)]
    pub content: String,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub date: String,
}

impl Note {
    /// Creates an unrelated note dated today.
    pub fn new(title: impl Into<String>, note_type: NoteType) -> Self {
        Self {
            note_id: generate_id(),
            title: title.into(),
            note_type,
            related_project_id: None,
            related_task_id: None,
            content: String::new(),
            date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
        }
    }

    /// An empty id never matches, mirroring `Task::belongs_to`.
    pub fn is_related_to_project(&self, project_id: &str) -> bool {
        !project_id.is_empty() && self.related_project_id.as_deref() == Some(project_id)
    }
}
