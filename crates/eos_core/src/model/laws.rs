//! System Law limits and violation taxonomy.
//!
//! # Responsibility
//! - Name every System Law a write can violate.
//! - Keep the numeric limits next to the violations they produce.
//!
//! # Invariants
//! - `ValidationError::kind()` codes are stable and safe to match on.
//! - `Display` text is user-facing and shown verbatim by callers.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum number of projects with `Status = Active` at any time.
pub const MAX_ACTIVE_PROJECTS: usize = 5;

/// Minimum task name length, in characters.
pub const MIN_TASK_NAME_CHARS: usize = 3;

/// A System Law rejected a write. Always raised before any mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Project `SuccessDefinition` is blank.
    SuccessDefinitionRequired,
    /// Saving would exceed [`MAX_ACTIVE_PROJECTS`].
    ActiveProjectLimit,
    /// Task name is shorter than [`MIN_TASK_NAME_CHARS`].
    NameTooShort,
    /// Another task is already `Doing`.
    SingleActiveTask,
    /// A `Next`/`Doing` task lacks project, priority or estimated time.
    IncompleteDefinition,
}

impl ValidationError {
    /// Stable machine-readable code for this violation.
    pub fn kind(self) -> &'static str {
        match self {
            Self::SuccessDefinitionRequired => "success-definition-required",
            Self::ActiveProjectLimit => "active-project-limit",
            Self::NameTooShort => "name-too-short",
            Self::SingleActiveTask => "single-active-task",
            Self::IncompleteDefinition => "incomplete-definition",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuccessDefinitionRequired => {
                write!(f, "System Law: Projects without Success Definition are invalid.")
            }
            Self::ActiveProjectLimit => write!(
                f,
                "You already have {MAX_ACTIVE_PROJECTS} active projects. Complete or pause one first."
            ),
            Self::NameTooShort => write!(f, "System Law: No vague task names."),
            Self::SingleActiveTask => write!(f, "Finish what you started."),
            Self::IncompleteDefinition => write!(
                f,
                "Define project, priority, and time before scheduling this task."
            ),
        }
    }
}

impl Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::ValidationError;

    #[test]
    fn kinds_are_kebab_case_codes() {
        let kinds = [
            ValidationError::SuccessDefinitionRequired,
            ValidationError::ActiveProjectLimit,
            ValidationError::NameTooShort,
            ValidationError::SingleActiveTask,
            ValidationError::IncompleteDefinition,
        ]
        .map(ValidationError::kind);

        assert_eq!(
            kinds,
            [
                "success-definition-required",
                "active-project-limit",
                "name-too-short",
                "single-active-task",
                "incomplete-definition",
            ]
        );
    }

    #[test]
    fn active_limit_message_names_the_cap() {
        assert!(ValidationError::ActiveProjectLimit
            .to_string()
            .contains("5 active projects"));
    }
}
