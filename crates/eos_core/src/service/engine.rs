//! Consistency engine.
//!
//! # Responsibility
//! - Mediate every read/write of projects, tasks, notes and settings.
//! - Enforce System Laws before any write and derive managed task fields.
//! - Cascade project deletion to dependent tasks and notes.
//!
//! # Invariants
//! - A rejected save leaves every stored collection untouched.
//! - At most `MAX_ACTIVE_PROJECTS` active projects and one `Doing` task
//!   exist after any successful save.
//! - Project deletion writes tasks, then notes, then projects.

use crate::clock::{Clock, SystemClock};
use crate::model::generate_id;
use crate::model::laws::{ValidationError, MAX_ACTIVE_PROJECTS};
use crate::model::note::Note;
use crate::model::project::{Project, ProjectArea, ProjectPriority, ProjectStatus};
use crate::model::setting::Setting;
use crate::model::task::{Task, TaskStatus};
use crate::repo::collection_repo::{upsert_by_id, CollectionRepo};
use crate::search::ranked::{rank, SearchContext, SearchHit};
use crate::service::agenda::daily_focus_key;
use crate::store::{CollectionStore, StoreError};
use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EngineResult<T> = Result<T, EngineError>;

/// Failure of an engine operation.
#[derive(Debug)]
pub enum EngineError {
    /// A System Law rejected the write; nothing was written.
    Validation(ValidationError),
    /// The store failed; the write was aborted and prior state is intact.
    Storage(StoreError),
}

impl EngineError {
    /// Returns the violated law, if this is a validation failure.
    pub fn violation(&self) -> Option<ValidationError> {
        match self {
            Self::Validation(violation) => Some(*violation),
            Self::Storage(_) => None,
        }
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}

/// What a project deletion removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub tasks_removed: usize,
    pub notes_removed: usize,
    pub project_removed: bool,
}

impl CascadeReport {
    pub fn is_noop(&self) -> bool {
        self.tasks_removed == 0 && self.notes_removed == 0 && !self.project_removed
    }
}

pub const SEED_PROJECT_NAME: &str = "Setup Execution OS";
pub const SEED_SUCCESS_DEFINITION: &str =
    "The app is configured and I have entered my top 3 active projects.";

/// Rule-enforcing facade over the collection store.
pub struct ConsistencyEngine<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: CollectionStore> ConsistencyEngine<S> {
    /// Creates an engine stamping managed dates from the wall clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: CollectionStore, C: Clock> ConsistencyEngine<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn projects(&self) -> CollectionRepo<'_, S, Project> {
        CollectionRepo::new(&self.store)
    }

    pub fn tasks(&self) -> CollectionRepo<'_, S, Task> {
        CollectionRepo::new(&self.store)
    }

    pub fn notes(&self) -> CollectionRepo<'_, S, Note> {
        CollectionRepo::new(&self.store)
    }

    pub fn settings(&self) -> CollectionRepo<'_, S, Setting> {
        CollectionRepo::new(&self.store)
    }

    /// Seeds the default active project when the projects collection has
    /// never been written. Returns whether seeding happened.
    pub fn initialize(&self) -> EngineResult<bool> {
        if self.projects().exists()? {
            return Ok(false);
        }

        let today = self.clock.today().format("%Y-%m-%d").to_string();
        let seed = Project {
            project_id: generate_id(),
            project_name: SEED_PROJECT_NAME.to_string(),
            area: ProjectArea::Work,
            status: ProjectStatus::Active,
            priority: ProjectPriority::High,
            start_date: today.clone(),
            deadline: today,
            success_definition: SEED_SUCCESS_DEFINITION.to_string(),
            why_this_matters: "To reduce cognitive load and start executing.".to_string(),
            project_notes: "Initial setup notes.".to_string(),
            files: Vec::new(),
        };
        let seed = self.save_project(seed)?;
        info!(
            "event=storage_seed module=engine status=ok project_id={}",
            seed.project_id
        );
        Ok(true)
    }

    // --- Projects ---

    pub fn get_projects(&self) -> EngineResult<Vec<Project>> {
        Ok(self.projects().load()?)
    }

    pub fn get_project(&self, project_id: &str) -> EngineResult<Option<Project>> {
        Ok(self.projects().find(project_id)?)
    }

    /// Validates and upserts a project; returns it as persisted.
    ///
    /// # Errors
    /// - `success-definition-required` when `SuccessDefinition` is blank.
    /// - `active-project-limit` when saving it `Active` would exceed the cap.
    pub fn save_project(&self, mut project: Project) -> EngineResult<Project> {
        if project.project_id.trim().is_empty() {
            project.project_id = generate_id();
        }

        project
            .validate()
            .map_err(|violation| reject("project_save", violation))?;

        let repo = self.projects();
        let mut projects = repo.load()?;

        if project.is_active() {
            let other_active = projects
                .iter()
                .filter(|existing| existing.is_active() && existing.project_id != project.project_id)
                .count();
            if other_active >= MAX_ACTIVE_PROJECTS {
                return Err(reject("project_save", ValidationError::ActiveProjectLimit));
            }
        }

        let replaced = upsert_by_id(&mut projects, project.clone());
        repo.store_all(&projects)?;
        info!(
            "event=project_save module=engine status=ok op={} project_id={} project_status={}",
            upsert_op(replaced),
            project.project_id,
            project.status.as_str()
        );
        Ok(project)
    }

    /// Deletes a project with its tasks and related notes.
    ///
    /// Writes happen in the order tasks, notes, project. Unknown ids are a
    /// no-op. Notes related only through a task are kept.
    pub fn delete_project(&self, project_id: &str) -> EngineResult<CascadeReport> {
        let tasks_removed = self
            .tasks()
            .remove_where(|task| task.belongs_to(project_id))?;
        let notes_removed = self
            .notes()
            .remove_where(|note| note.is_related_to_project(project_id))?;
        let project_removed = self.projects().remove(project_id)?;

        let report = CascadeReport {
            tasks_removed,
            notes_removed,
            project_removed,
        };
        info!(
            "event=project_delete module=engine status=ok project_id={} tasks_removed={} notes_removed={} project_removed={}",
            project_id, report.tasks_removed, report.notes_removed, report.project_removed
        );
        Ok(report)
    }

    // --- Tasks ---

    pub fn get_tasks(&self) -> EngineResult<Vec<Task>> {
        Ok(self.tasks().load()?)
    }

    pub fn get_task(&self, task_id: &str) -> EngineResult<Option<Task>> {
        Ok(self.tasks().find(task_id)?)
    }

    /// Validates and upserts a task; returns it with managed dates applied.
    ///
    /// Laws are checked in order: name length, single `Doing`, complete
    /// definition for `Next`/`Doing`.
    pub fn save_task(&self, mut task: Task) -> EngineResult<Task> {
        if task.task_id.trim().is_empty() {
            task.task_id = generate_id();
        }

        task.validate_name()
            .map_err(|violation| reject("task_save", violation))?;

        let repo = self.tasks();
        let mut tasks = repo.load()?;

        if task.status == TaskStatus::Doing
            && tasks
                .iter()
                .any(|other| other.status == TaskStatus::Doing && other.task_id != task.task_id)
        {
            return Err(reject("task_save", ValidationError::SingleActiveTask));
        }

        task.validate_definition()
            .map_err(|violation| reject("task_save", violation))?;

        let now = self.clock.now();
        let previous = tasks.iter().find(|existing| existing.task_id == task.task_id);
        task.blocked_date = derive_blocked_date(&task, previous, now);
        task.created_date = previous
            .and_then(|existing| existing.created_date)
            .or(task.created_date)
            .or(Some(now));

        let replaced = upsert_by_id(&mut tasks, task.clone());
        repo.store_all(&tasks)?;
        info!(
            "event=task_save module=engine status=ok op={} task_id={} task_status={} has_project={}",
            upsert_op(replaced),
            task.task_id,
            task.status.as_str(),
            task.has_project()
        );
        Ok(task)
    }

    /// Deletes one task. Notes pointing at it keep their dangling id.
    pub fn delete_task(&self, task_id: &str) -> EngineResult<bool> {
        let removed = self.tasks().remove(task_id)?;
        info!("event=task_delete module=engine status=ok task_id={task_id} removed={removed}");
        Ok(removed)
    }

    // --- Notes ---

    pub fn get_notes(&self) -> EngineResult<Vec<Note>> {
        Ok(self.notes().load()?)
    }

    pub fn get_note(&self, note_id: &str) -> EngineResult<Option<Note>> {
        Ok(self.notes().find(note_id)?)
    }

    /// Upserts a note. Notes carry no laws.
    pub fn save_note(&self, mut note: Note) -> EngineResult<Note> {
        if note.note_id.trim().is_empty() {
            note.note_id = generate_id();
        }
        self.notes().upsert(note.clone())?;
        info!(
            "event=note_save module=engine status=ok note_id={}",
            note.note_id
        );
        Ok(note)
    }

    pub fn delete_note(&self, note_id: &str) -> EngineResult<bool> {
        let removed = self.notes().remove(note_id)?;
        info!("event=note_delete module=engine status=ok note_id={note_id} removed={removed}");
        Ok(removed)
    }

    // --- Settings ---

    pub fn get_settings(&self) -> EngineResult<Vec<Setting>> {
        Ok(self.settings().load()?)
    }

    pub fn get_setting(&self, key: &str) -> EngineResult<Option<String>> {
        Ok(self.settings().find(key)?.map(|setting| setting.value))
    }

    pub fn save_setting(&self, key: &str, value: &str) -> EngineResult<()> {
        self.settings().upsert(Setting::new(key, value))?;
        Ok(())
    }

    /// Focus statement chosen for `date`, if any.
    pub fn daily_focus(&self, date: NaiveDate) -> EngineResult<Option<String>> {
        self.get_setting(&daily_focus_key(date))
    }

    pub fn set_daily_focus(&self, date: NaiveDate, focus: &str) -> EngineResult<()> {
        self.save_setting(&daily_focus_key(date), focus)
    }

    // --- Search ---

    /// Ranks projects, tasks and notes against `query`.
    ///
    /// Blank queries return no hits without touching the store.
    pub fn search(&self, query: &str, context: SearchContext) -> EngineResult<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let projects = self.get_projects()?;
        let tasks = self.get_tasks()?;
        let notes = self.get_notes()?;
        Ok(rank(&projects, &tasks, &notes, query, context))
    }
}

/// Keeps `BlockedDate` only while blocked; stamps it on entering `Blocked`.
fn derive_blocked_date(
    task: &Task,
    previous: Option<&Task>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if task.status != TaskStatus::Blocked {
        return None;
    }

    match previous {
        Some(existing) if existing.status == TaskStatus::Blocked => task
            .blocked_date
            .or(existing.blocked_date)
            .or(Some(now)),
        Some(_) => Some(now),
        None => task.blocked_date.or(Some(now)),
    }
}

fn reject(event: &str, violation: ValidationError) -> EngineError {
    info!(
        "event={} module=engine status=rejected reason={}",
        event,
        violation.kind()
    );
    EngineError::Validation(violation)
}

fn upsert_op(replaced: bool) -> &'static str {
    if replaced {
        "update"
    } else {
        "insert"
    }
}
