//! Collection table installation and version gate.
//!
//! Record payloads are opaque JSON, so the table shape is the only schema.
//! It is stamped into `PRAGMA user_version` when installed.

use super::{DbError, DbResult};
use rusqlite::Connection;

/// Version stamped on databases holding the `collections` table.
pub const SCHEMA_VERSION: u32 = 1;

const COLLECTIONS_TABLE: &str = include_str!("collections.sql");

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Fails with `SchemaMismatch` unless the connection is at [`SCHEMA_VERSION`].
pub fn check_schema(conn: &Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    if found != SCHEMA_VERSION {
        return Err(DbError::SchemaMismatch {
            expected: SCHEMA_VERSION,
            found,
        });
    }
    Ok(())
}

/// Installs the collections table on a blank database.
///
/// A database already at [`SCHEMA_VERSION`] is left alone; any other
/// version is rejected rather than rewritten.
pub(crate) fn install_schema(conn: &mut Connection) -> DbResult<()> {
    if schema_version(conn)? == 0 {
        let tx = conn.transaction()?;
        tx.execute_batch(COLLECTIONS_TABLE)?;
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        tx.commit()?;
    }
    check_schema(conn)
}

#[cfg(test)]
mod tests {
    use super::{check_schema, install_schema, schema_version, SCHEMA_VERSION};
    use crate::db::DbError;
    use rusqlite::Connection;

    #[test]
    fn install_stamps_version_once() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert!(matches!(
            check_schema(&conn),
            Err(DbError::SchemaMismatch { found: 0, .. })
        ));

        install_schema(&mut conn).unwrap();
        install_schema(&mut conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
        check_schema(&conn).unwrap();
    }
}
