//! Entity model for projects, tasks, notes and settings.
//!
//! # Responsibility
//! - Define the persisted record shapes and their JSON field names.
//! - Provide per-record System Law checks used by the consistency engine.
//!
//! # Invariants
//! - Every record is identified by a stable opaque string id.
//! - Cross-record references (`ProjectID`, `RelatedProjectID`,
//!   `RelatedTaskID`) are weak: plain ids that may not resolve.
//! - Serialized field names are stable and must not be renamed.

pub mod attachment;
pub mod laws;
pub mod note;
pub mod project;
pub mod setting;
pub mod task;
pub mod timestamp;

use uuid::Uuid;

/// Generates a fresh opaque record identifier.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
