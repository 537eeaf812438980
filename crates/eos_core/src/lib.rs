//! Rule-enforcing persistence core for Execution OS.
//! This crate is the single source of truth for the System Laws that keep
//! projects, tasks and notes consistent.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::attachment::{AttachmentError, ProjectFile, MAX_ATTACHMENT_BYTES};
pub use model::laws::{ValidationError, MAX_ACTIVE_PROJECTS, MIN_TASK_NAME_CHARS};
pub use model::note::{Note, NoteType};
pub use model::project::{Project, ProjectArea, ProjectPriority, ProjectStatus};
pub use model::setting::Setting;
pub use model::task::{Energy, EstimatedTime, Task, TaskPriority, TaskStatus};
pub use repo::collection_repo::{CollectionRepo, Record};
pub use search::ranked::{EntityKind, SearchContext, SearchHit};
pub use service::completion::{
    check_project_completion, run_completion_watcher, CompletionOffer, CompletionOutcome,
};
pub use service::engine::{CascadeReport, ConsistencyEngine, EngineError, EngineResult};
pub use store::{
    Collection, CollectionStore, SqliteCollectionStore, StoreError, StoreOptions, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
