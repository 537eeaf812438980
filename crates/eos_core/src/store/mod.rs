//! Store adapter: durable persistence of whole named collections.
//!
//! # Responsibility
//! - Define the four fixed collections and their storage keys.
//! - Define the raw payload contract every storage medium implements.
//! - Decode/encode typed records on top of raw payloads.
//!
//! # Invariants
//! - A collection is always replaced as a whole; no partial writes.
//! - A corrupt payload (undecodable text or JSON) loads as an empty
//!   collection and is logged, never raised past `load_records`. A medium
//!   that cannot be queried is raised as `ReadFailed`.
//! - Write failures are classified as `QuotaExceeded` or `WriteDenied`.

mod sqlite_store;

pub use sqlite_store::SqliteCollectionStore;

use crate::db::DbError;
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default cap on the total size of all collection payloads.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

pub type StoreResult<T> = Result<T, StoreError>;

/// One of the fixed persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Projects,
    Tasks,
    Notes,
    Settings,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Projects,
        Collection::Tasks,
        Collection::Notes,
        Collection::Settings,
    ];

    /// Storage key of this collection.
    pub fn key(self) -> &'static str {
        match self {
            Self::Projects => "eos_projects",
            Self::Tasks => "eos_tasks",
            Self::Notes => "eos_notes",
            Self::Settings => "eos_settings",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Storage-medium failures.
#[derive(Debug)]
pub enum StoreError {
    /// The medium rejected the write for size reasons.
    QuotaExceeded {
        collection: Collection,
        required_bytes: u64,
        limit_bytes: Option<u64>,
    },
    /// The medium rejected the write for any other reason.
    WriteDenied {
        collection: Collection,
        message: String,
    },
    /// The medium could not be read.
    ReadFailed {
        collection: Collection,
        message: String,
    },
    /// The stored payload is not readable text.
    CorruptPayload {
        collection: Collection,
        message: String,
    },
    Db(DbError),
}

impl StoreError {
    /// Stable error kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::QuotaExceeded { .. } => "QuotaExceeded",
            Self::WriteDenied { .. } => "WriteDenied",
            Self::ReadFailed { .. } => "ReadFailed",
            Self::CorruptPayload { .. } => "CorruptPayload",
            Self::Db(_) => "Db",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded {
                collection,
                required_bytes,
                limit_bytes,
            } => {
                write!(
                    f,
                    "Storage Limit Exceeded. Delete some files or projects to make space. \
                     (collection={collection} required_bytes={required_bytes}"
                )?;
                if let Some(limit) = limit_bytes {
                    write!(f, " limit_bytes={limit}")?;
                }
                write!(f, ")")
            }
            Self::WriteDenied {
                collection,
                message,
            } => write!(
                f,
                "Data Save Failed. Ensure you have storage permissions enabled. \
                 (collection={collection}: {message})"
            ),
            Self::ReadFailed {
                collection,
                message,
            } => write!(f, "failed to read collection `{collection}`: {message}"),
            Self::CorruptPayload {
                collection,
                message,
            } => write!(f, "collection `{collection}` holds a corrupt payload: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Tunables for store implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Cap on the summed payload bytes of all collections. `None` disables it.
    pub quota_bytes: Option<u64>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
        }
    }
}

impl StoreOptions {
    pub fn unlimited() -> Self {
        Self { quota_bytes: None }
    }

    pub fn with_quota_bytes(quota_bytes: u64) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
        }
    }
}

/// Raw payload persistence for named collections.
///
/// Payloads are JSON arrays. Implementations replace a collection's payload
/// atomically on `write`.
pub trait CollectionStore {
    /// Returns the stored payload, or `None` when the collection is absent.
    ///
    /// A payload that exists but is not text fails with `CorruptPayload`.
    fn read(&self, collection: Collection) -> StoreResult<Option<String>>;

    /// Replaces the stored payload of `collection`.
    fn write(&self, collection: Collection, payload: &str) -> StoreResult<()>;

    /// Returns whether the collection has ever been written.
    fn contains(&self, collection: Collection) -> StoreResult<bool> {
        Ok(self.read(collection)?.is_some())
    }
}

impl<S: CollectionStore + ?Sized> CollectionStore for &S {
    fn read(&self, collection: Collection) -> StoreResult<Option<String>> {
        (**self).read(collection)
    }

    fn write(&self, collection: Collection, payload: &str) -> StoreResult<()> {
        (**self).write(collection, payload)
    }

    fn contains(&self, collection: Collection) -> StoreResult<bool> {
        (**self).contains(collection)
    }
}

/// Loads a collection as typed records, in stored order.
///
/// Absent and corrupt payloads both load as an empty collection.
pub fn load_records<S, T>(store: &S, collection: Collection) -> StoreResult<Vec<T>>
where
    S: CollectionStore + ?Sized,
    T: DeserializeOwned,
{
    let payload = match store.read(collection) {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            debug!("event=collection_load module=store status=absent collection={collection}");
            return Ok(Vec::new());
        }
        Err(StoreError::CorruptPayload { message, .. }) => {
            warn!(
                "event=collection_load module=store status=corrupt collection={} error={}",
                collection, message
            );
            return Ok(Vec::new());
        }
        Err(err) => return Err(err),
    };

    match serde_json::from_str::<Vec<T>>(&payload) {
        Ok(records) => {
            debug!(
                "event=collection_load module=store status=ok collection={} count={}",
                collection,
                records.len()
            );
            Ok(records)
        }
        Err(err) => {
            warn!(
                "event=collection_load module=store status=corrupt collection={} bytes={} error={}",
                collection,
                payload.len(),
                err
            );
            Ok(Vec::new())
        }
    }
}

/// Replaces a collection with `records`, in the given order.
pub fn save_records<S, T>(store: &S, collection: Collection, records: &[T]) -> StoreResult<()>
where
    S: CollectionStore + ?Sized,
    T: Serialize,
{
    let payload = serde_json::to_string(records).map_err(|err| StoreError::WriteDenied {
        collection,
        message: format!("failed to encode records: {err}"),
    })?;

    match store.write(collection, &payload) {
        Ok(()) => {
            debug!(
                "event=collection_save module=store status=ok collection={} count={} bytes={}",
                collection,
                records.len(),
                payload.len()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=collection_save module=store status=error collection={} error_code={} bytes={}",
                collection,
                err.kind(),
                payload.len()
            );
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Collection, StoreOptions, DEFAULT_QUOTA_BYTES};

    #[test]
    fn collection_keys_are_distinct_and_prefixed() {
        let keys = Collection::ALL.map(Collection::key);
        assert_eq!(keys, ["eos_projects", "eos_tasks", "eos_notes", "eos_settings"]);
    }

    #[test]
    fn options_default_to_browser_sized_quota() {
        assert_eq!(StoreOptions::default().quota_bytes, Some(DEFAULT_QUOTA_BYTES));
        assert_eq!(StoreOptions::unlimited().quota_bytes, None);
    }

    #[test]
    fn options_deserialize_with_missing_fields() {
        let options: StoreOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, StoreOptions::default());

        let options: StoreOptions = serde_json::from_str(r#"{"quota_bytes":1024}"#).unwrap();
        assert_eq!(options.quota_bytes, Some(1024));
    }
}
