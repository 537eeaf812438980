//! SQLite-backed collection store.
//!
//! # Invariants
//! - One row per collection in `collections`; the row is replaced whole.
//! - The quota check and the write share one transaction.

use super::{Collection, CollectionStore, StoreError, StoreOptions, StoreResult};
use crate::db::check_schema;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

/// Collection store over a SQLite connection opened by `db`.
pub struct SqliteCollectionStore<'conn> {
    conn: &'conn Connection,
    options: StoreOptions,
}

impl<'conn> SqliteCollectionStore<'conn> {
    /// Constructs a store with default options from a connection opened by `db`.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        Self::with_options(conn, StoreOptions::default())
    }

    /// Constructs a store from a connection at `SCHEMA_VERSION`.
    ///
    /// # Errors
    /// - `Db(SchemaMismatch)` when the collections schema is not installed.
    pub fn with_options(conn: &'conn Connection, options: StoreOptions) -> StoreResult<Self> {
        check_schema(conn)?;
        Ok(Self { conn, options })
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    fn used_bytes_excluding(
        conn: &Connection,
        collection: Collection,
    ) -> rusqlite::Result<u64> {
        let used: i64 = conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(payload AS BLOB))), 0)
             FROM collections
             WHERE name != ?1;",
            [collection.key()],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(used).unwrap_or(0))
    }
}

impl CollectionStore for SqliteCollectionStore<'_> {
    fn read(&self, collection: Collection) -> StoreResult<Option<String>> {
        let stored = self
            .conn
            .query_row(
                "SELECT payload FROM collections WHERE name = ?1;",
                [collection.key()],
                |row| Ok(payload_text(row.get_ref(0)?)),
            )
            .optional()
            .map_err(|err| StoreError::ReadFailed {
                collection,
                message: err.to_string(),
            })?;

        match stored {
            None => Ok(None),
            Some(Ok(payload)) => Ok(Some(payload)),
            Some(Err(message)) => Err(StoreError::CorruptPayload {
                collection,
                message,
            }),
        }
    }

    fn write(&self, collection: Collection, payload: &str) -> StoreResult<()> {
        let payload_bytes = payload.len() as u64;
        let map_err = |err| classify_write_error(collection, payload_bytes, err);

        let tx = self.conn.unchecked_transaction().map_err(map_err)?;

        if let Some(limit) = self.options.quota_bytes {
            let required = Self::used_bytes_excluding(&tx, collection).map_err(map_err)? + payload_bytes;
            if required > limit {
                return Err(StoreError::QuotaExceeded {
                    collection,
                    required_bytes: required,
                    limit_bytes: Some(limit),
                });
            }
        }

        tx.execute(
            "INSERT INTO collections (name, payload, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(name) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![collection.key(), payload],
        )
        .map_err(map_err)?;
        tx.commit().map_err(map_err)?;

        Ok(())
    }

    fn contains(&self, collection: Collection) -> StoreResult<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM collections WHERE name = ?1);",
                [collection.key()],
                |row| row.get::<_, i64>(0),
            )
            .map(|exists| exists == 1)
            .map_err(|err| StoreError::ReadFailed {
                collection,
                message: err.to_string(),
            })
    }
}

/// Decodes a stored payload cell; anything but UTF-8 text is corrupt.
fn payload_text(value: ValueRef<'_>) -> Result<String, String> {
    match value {
        ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec())
            .map_err(|err| format!("payload is not UTF-8: {err}")),
        other => Err(format!("payload is stored as {}", other.data_type())),
    }
}

fn classify_write_error(collection: Collection, payload_bytes: u64, err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if matches!(failure.code, ErrorCode::DiskFull | ErrorCode::TooBig) =>
        {
            StoreError::QuotaExceeded {
                collection,
                required_bytes: payload_bytes,
                limit_bytes: None,
            }
        }
        _ => StoreError::WriteDenied {
            collection,
            message: err.to_string(),
        },
    }
}
