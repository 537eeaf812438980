//! Project record.
//!
//! # Invariants
//! - A persisted project always has a non-blank `SuccessDefinition`.
//! - Files are owned by the project and disappear with it.

use super::attachment::ProjectFile;
use super::generate_id;
use super::laws::ValidationError;
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub type ProjectId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectArea {
    Faith,
    Work,
    Money,
    Health,
    Learning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    Idea,
    Active,
    #[serde(rename = "On Hold")]
    OnHold,
    Completed,
}

impl ProjectStatus {
    /// Persisted/display label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idea => "Idea",
            Self::Active => "Active",
            Self::OnHold => "On Hold",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    #[serde(rename = "ProjectID")]
    pub project_id: ProjectId,
    pub project_name: String,
    pub area: ProjectArea,
    pub status: ProjectStatus,
    pub priority: ProjectPriority,
    /// `YYYY-MM-DD`.
    pub start_date: String,
    /// `YYYY-MM-DD`.
    pub deadline: String,
    /// What "done" looks like. Required.
    pub success_definition: String,
    #[serde(default)]
    pub why_this_matters: String,
    #[serde(default)]
    pub project_notes: String,
    #[serde(default)]
    pub files: Vec<ProjectFile>,
}

impl Project {
    /// Creates an `Idea` project in the `Work` area starting and due today.
    pub fn new(project_name: impl Into<String>, success_definition: impl Into<String>) -> Self {
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        Self {
            project_id: generate_id(),
            project_name: project_name.into(),
            area: ProjectArea::Work,
            status: ProjectStatus::Idea,
            priority: ProjectPriority::Medium,
            start_date: today.clone(),
            deadline: today,
            success_definition: success_definition.into(),
            why_this_matters: String::new(),
            project_notes: String::new(),
            files: Vec::new(),
        }
    }

    /// Checks the record-local project law.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.success_definition.trim().is_empty() {
            return Err(ValidationError::SuccessDefinitionRequired);
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status == ProjectStatus::Active
    }

    /// Appends an attachment. Persist by saving the project.
    pub fn attach(&mut self, file: ProjectFile) {
        self.files.push(file);
    }

    /// Removes an attachment by id; returns whether one was removed.
    pub fn detach(&mut self, file_id: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|file| file.file_id != file_id);
        self.files.len() != before
    }

    pub fn file(&self, file_id: &str) -> Option<&ProjectFile> {
        self.files.iter().find(|file| file.file_id == file_id)
    }
}
