//! Completion watcher.
//!
//! Advisory rule run by callers after saving a task as `Done`: when every
//! task of its project is done and the project is still `Active`, offer to
//! mark the project `Completed`. `save_task` never runs this itself.

use crate::clock::Clock;
use crate::model::project::{Project, ProjectStatus};
use crate::model::task::{Task, TaskStatus};
use crate::service::engine::{ConsistencyEngine, EngineResult};
use crate::store::CollectionStore;
use log::info;

/// Confirmation request surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOffer {
    pub project_id: String,
    pub project_name: String,
    pub task_count: usize,
}

impl CompletionOffer {
    /// Prompt text for the confirmation dialog.
    pub fn prompt(&self) -> String {
        format!(
            "All tasks for \"{}\" are completed. Mark project as Completed?",
            self.project_name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    NotApplicable,
    Declined(CompletionOffer),
    Completed(Project),
}

/// Returns the offer `task` unlocks, if any. Reads only.
pub fn check_project_completion<S, C>(
    engine: &ConsistencyEngine<S, C>,
    task: &Task,
) -> EngineResult<Option<CompletionOffer>>
where
    S: CollectionStore,
    C: Clock,
{
    if task.status != TaskStatus::Done || !task.has_project() {
        return Ok(None);
    }

    let project_tasks: Vec<Task> = engine
        .get_tasks()?
        .into_iter()
        .filter(|other| other.belongs_to(&task.project_id))
        .collect();
    if project_tasks.is_empty()
        || project_tasks
            .iter()
            .any(|other| other.status != TaskStatus::Done)
    {
        return Ok(None);
    }

    let Some(project) = engine.get_project(&task.project_id)? else {
        return Ok(None);
    };
    if project.status != ProjectStatus::Active {
        return Ok(None);
    }

    Ok(Some(CompletionOffer {
        project_id: project.project_id,
        project_name: project.project_name,
        task_count: project_tasks.len(),
    }))
}

/// Checks `task`, asks `confirm` when an offer exists, and completes the
/// project through the engine on affirmation.
pub fn run_completion_watcher<S, C, F>(
    engine: &ConsistencyEngine<S, C>,
    task: &Task,
    confirm: F,
) -> EngineResult<CompletionOutcome>
where
    S: CollectionStore,
    C: Clock,
    F: FnOnce(&CompletionOffer) -> bool,
{
    let Some(offer) = check_project_completion(engine, task)? else {
        return Ok(CompletionOutcome::NotApplicable);
    };

    if !confirm(&offer) {
        info!(
            "event=project_completion module=completion status=declined project_id={}",
            offer.project_id
        );
        return Ok(CompletionOutcome::Declined(offer));
    }

    let Some(mut project) = engine.get_project(&offer.project_id)? else {
        return Ok(CompletionOutcome::NotApplicable);
    };
    project.status = ProjectStatus::Completed;
    let project = engine.save_project(project)?;
    info!(
        "event=project_completion module=completion status=ok project_id={} task_count={}",
        project.project_id, offer.task_count
    );
    Ok(CompletionOutcome::Completed(project))
}
