//! The store collaborator contract and the shipped SQLite implementation.
//!
//! The core is stateless: each query or mutation reaches the store through
//! exactly one call on this trait, with the handle passed in explicitly.
//! Store-level failures are surfaced unmodified and never retried here;
//! retry policy belongs to the collaborator or the caller.

use crate::error::Result;
use crate::row::Row;
use crate::value::Value;

/// A statement rendered from a query or mutation spec: text, bound
/// parameters in placeholder order, and the output column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
    pub labels: Vec<Option<String>>,
}

/// The collaborator contract consumed from the surrounding persistence
/// layer.
pub trait Store {
    /// Run a query and return its rows, addressable by position or label.
    fn run_query(&self, stmt: &Statement) -> Result<Vec<Row>>;

    /// Run a count-projected query and return the single scalar.
    fn run_count(&self, stmt: &Statement) -> Result<u64>;

    /// Run a mutation and return the affected-row count.
    fn run_mutation(&self, stmt: &Statement) -> Result<u64>;

    /// Invalidate any in-process identity cache the collaborator keeps for
    /// `entity`. Bulk mutations bypass per-entity change tracking, so
    /// callers are responsible for invoking this afterward; the core never
    /// calls it on their behalf.
    fn invalidate_cache(&self, entity: &str) {
        let _ = entity;
    }
}

#[cfg(feature = "rusqlite")]
pub use sqlite::SqliteStore;

#[cfg(feature = "rusqlite")]
mod sqlite {
    use super::{Statement, Store};
    use crate::error::{Error, Result};
    use crate::row::Row;
    use crate::value::Value;
    use std::sync::Arc;

    /// Store collaborator over a `rusqlite` connection.
    #[derive(Debug)]
    pub struct SqliteStore {
        conn: rusqlite::Connection,
    }

    impl SqliteStore {
        pub fn new(conn: rusqlite::Connection) -> Self {
            Self { conn }
        }

        /// A store over a fresh in-memory database.
        pub fn open_in_memory() -> Result<Self> {
            Ok(Self::new(rusqlite::Connection::open_in_memory()?))
        }

        /// The underlying connection, for schema setup and seeding.
        pub fn connection(&self) -> &rusqlite::Connection {
            &self.conn
        }
    }

    impl Store for SqliteStore {
        fn run_query(&self, stmt: &Statement) -> Result<Vec<Row>> {
            let mut prepared = self.conn.prepare(&stmt.sql)?;
            let column_count = prepared.column_count();
            let labels: Arc<[Option<String>]> = stmt.labels.clone().into();

            let mut out = Vec::new();
            let mut rows = prepared.query(rusqlite::params_from_iter(stmt.params.iter()))?;
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    values.push(Value::try_from(row.get_ref(i)?)?);
                }
                out.push(Row::new(values, Arc::clone(&labels)));
            }
            tracing::trace!(rows = out.len(), "query returned");
            Ok(out)
        }

        fn run_count(&self, stmt: &Statement) -> Result<u64> {
            let mut prepared = self.conn.prepare(&stmt.sql)?;
            let count: i64 = prepared.query_row(
                rusqlite::params_from_iter(stmt.params.iter()),
                |row| row.get(0),
            )?;
            u64::try_from(count)
                .map_err(|_| Error::Mapping(format!("negative count {count}")))
        }

        fn run_mutation(&self, stmt: &Statement) -> Result<u64> {
            let affected = self
                .conn
                .execute(&stmt.sql, rusqlite::params_from_iter(stmt.params.iter()))?;
            tracing::trace!(rows = affected, "mutation applied");
            Ok(affected as u64)
        }
    }
}
