//! Context-weighted substring ranking.
//!
//! # Invariants
//! - Matching is case-insensitive substring containment on the trimmed
//!   query.
//! - Hits are ordered by descending score; ties keep discovery order
//!   (projects, then tasks, then notes, each in collection order).

use crate::model::note::Note;
use crate::model::project::Project;
use crate::model::task::Task;
use std::fmt::{Display, Formatter};

pub const PROJECT_NAME_SCORE: u32 = 10;
pub const TASK_NAME_SCORE: u32 = 8;
pub const TASK_NOTES_SCORE: u32 = 4;
pub const NOTE_TITLE_SCORE: u32 = 6;
pub const NOTE_CONTENT_SCORE: u32 = 3;
pub const CONTEXT_MULTIPLIER: u32 = 2;

const UNTITLED_NOTE: &str = "Untitled Note";

/// Screen the search was opened from; boosts the matching entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SearchContext {
    Projects,
    Tasks,
    Brain,
    #[default]
    Global,
}

impl SearchContext {
    /// Parses a lowercase context name. Unknown names search globally.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "projects" => Self::Projects,
            "tasks" => Self::Tasks,
            "brain" => Self::Brain,
            _ => Self::Global,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Tasks => "tasks",
            Self::Brain => "brain",
            Self::Global => "global",
        }
    }

    fn multiplier(self, kind: EntityKind) -> u32 {
        let boosted = matches!(
            (self, kind),
            (Self::Projects, EntityKind::Project)
                | (Self::Tasks, EntityKind::Task)
                | (Self::Brain, EntityKind::Note)
        );
        if boosted {
            CONTEXT_MULTIPLIER
        } else {
            1
        }
    }
}

impl From<&str> for SearchContext {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl Display for SearchContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Project,
    Task,
    Note,
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub id: String,
    pub kind: EntityKind,
    pub title: String,
    pub subtitle: String,
    pub score: u32,
}

/// Scores and orders every matching entity.
pub fn rank(
    projects: &[Project],
    tasks: &[Task],
    notes: &[Note],
    query: &str,
    context: SearchContext,
) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

    let mut hits = Vec::new();

    for project in projects {
        if contains(&project.project_name) {
            hits.push(SearchHit {
                id: project.project_id.clone(),
                kind: EntityKind::Project,
                title: project.project_name.clone(),
                subtitle: project.status.as_str().to_string(),
                score: PROJECT_NAME_SCORE * context.multiplier(EntityKind::Project),
            });
        }
    }

    for task in tasks {
        let base = if contains(&task.task_name) {
            TASK_NAME_SCORE
        } else if contains(&task.notes) {
            TASK_NOTES_SCORE
        } else {
            continue;
        };
        hits.push(SearchHit {
            id: task.task_id.clone(),
            kind: EntityKind::Task,
            title: task.task_name.clone(),
            subtitle: task_subtitle(task),
            score: base * context.multiplier(EntityKind::Task),
        });
    }

    for note in notes {
        let base = if contains(&note.title) {
            NOTE_TITLE_SCORE
        } else if contains(&note.content) {
            NOTE_CONTENT_SCORE
        } else {
            continue;
        };
        let title = if note.title.trim().is_empty() {
            UNTITLED_NOTE.to_string()
        } else {
            note.title.clone()
        };
        hits.push(SearchHit {
            id: note.note_id.clone(),
            kind: EntityKind::Note,
            title,
            subtitle: note.note_type.as_str().to_string(),
            score: base * context.multiplier(EntityKind::Note),
        });
    }

    // Stable sort keeps discovery order on ties.
    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits
}

fn task_subtitle(task: &Task) -> String {
    match task.priority {
        Some(priority) => format!("{} • P{}", task.status.as_str(), priority.get()),
        None => task.status.as_str().to_string(),
    }
}
