//! Database connection management
//!
//! `SqliteDatabase` owns at most one rusqlite connection, opened on first use.

use crate::config::{DatabaseConfig, IN_MEMORY};
use crate::errors::{config_error, from_rusqlite, Result};
use rowkeeper_core::{Database, Dialect, OrmError, Row};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::cell::{Cell, RefCell};
use std::path::Path;

/// A SQLite-backed [`Database`]
///
/// Not `Sync`: bookkeeping lives in `Cell`/`RefCell` so the connection can be
/// shared by reference between repositories and a transaction.
#[derive(Debug)]
pub struct SqliteDatabase {
    path: String,
    connection: RefCell<Option<Connection>>,
    query_count: Cell<u64>,
    in_transaction: Cell<bool>,
    last_query: RefCell<Option<String>>,
}

impl SqliteDatabase {
    fn unconnected(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            connection: RefCell::new(None),
            query_count: Cell::new(0),
            in_transaction: Cell::new(false),
            last_query: RefCell::new(None),
        }
    }

    /// Prepare a connection from settings without opening it
    ///
    /// # Errors
    ///
    /// `Config` for non-SQLite settings, missing database names, or a database
    /// file that does not exist.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        if config.kind != Dialect::Sqlite {
            return Err(config_error(format!(
                "{:?} connections are not supported by the sqlite store",
                config.kind
            )));
        }
        config.validate()?;

        let path = config.database.as_deref().unwrap_or(IN_MEMORY);
        if path != IN_MEMORY && !Path::new(path).is_file() {
            return Err(config_error(format!(
                "Could not read Sqlite database: {}",
                path
            )));
        }
        Ok(Self::unconnected(path))
    }

    /// Open (creating if needed) a SQLite database file
    ///
    /// # Errors
    ///
    /// `Connection` when the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let database = Self::unconnected(path.as_ref().to_string_lossy());
        database.connect()?;
        Ok(database)
    }

    /// Open an in-memory SQLite database (for testing)
    ///
    /// # Errors
    ///
    /// `Connection` when SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        let database = Self::unconnected(IN_MEMORY);
        database.connect()?;
        Ok(database)
    }

    /// Path the connection opens, or `:memory:`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Open the connection; does nothing when already open
    ///
    /// # Errors
    ///
    /// `Connection` when SQLite refuses to open the database.
    pub fn connect(&self) -> Result<()> {
        let mut slot = self.connection.borrow_mut();
        if slot.is_some() {
            return Ok(());
        }
        let conn = if self.path == IN_MEMORY {
            Connection::open_in_memory()
        } else {
            Connection::open(&self.path)
        }
        .map_err(from_rusqlite)?;
        tracing::debug!(path = %self.path, "sqlite connection opened");
        *slot = Some(conn);
        Ok(())
    }

    /// Drop the current connection and open a fresh one
    ///
    /// An in-memory database starts out empty again.
    ///
    /// # Errors
    ///
    /// `Connection` when the new connection cannot be opened.
    pub fn reconnect(&self) -> Result<()> {
        self.disconnect();
        self.connect()
    }

    /// Close the connection; an open transaction is discarded with it
    pub fn disconnect(&self) {
        self.in_transaction.set(false);
        if self.connection.borrow_mut().take().is_some() {
            tracing::debug!(path = %self.path, "sqlite connection closed");
        }
    }

    /// Run several `;`-separated statements, e.g. schema setup
    ///
    /// Not counted in [`query_count`](Self::query_count).
    ///
    /// # Errors
    ///
    /// `Connection` on the first failing statement.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.connect()?;
        let slot = self.connection.borrow();
        let conn = slot.as_ref().ok_or(OrmError::NotConnected)?;
        conn.execute_batch(sql).map_err(from_rusqlite)
    }

    /// Number of statements successfully run through [`Database::query`]
    pub fn query_count(&self) -> u64 {
        self.query_count.get()
    }

    /// Most recent statement passed to [`Database::query`], successful or not
    pub fn last_query(&self) -> Option<String> {
        self.last_query.borrow().clone()
    }
}

impl Database for SqliteDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn is_connected(&self) -> bool {
        self.connection.borrow().is_some()
    }

    fn query(&self, sql: &str) -> Result<Vec<Row>> {
        *self.last_query.borrow_mut() = Some(sql.to_string());
        self.connect()?;

        let slot = self.connection.borrow();
        let conn = slot.as_ref().ok_or(OrmError::NotConnected)?;
        let rows = run_statement(conn, sql)?;

        self.query_count.set(self.query_count.get() + 1);
        tracing::debug!(sql, rows = rows.len(), "statement executed");
        Ok(rows)
    }

    fn last_generated_key(&self) -> Result<Option<String>> {
        let slot = self.connection.borrow();
        let conn = slot.as_ref().ok_or(OrmError::NotConnected)?;
        match conn.last_insert_rowid() {
            0 => Ok(None),
            rowid => Ok(Some(rowid.to_string())),
        }
    }

    fn in_transaction(&self) -> bool {
        self.in_transaction.get()
    }

    fn set_in_transaction(&self, active: bool) {
        self.in_transaction.set(active);
    }
}

fn run_statement(conn: &Connection, sql: &str) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
    if stmt.column_count() == 0 {
        stmt.execute([]).map_err(from_rusqlite)?;
        return Ok(Vec::new());
    }

    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let mut cursor = stmt.query([]).map_err(from_rusqlite)?;
    let mut rows = Vec::new();
    while let Some(record) = cursor.next().map_err(from_rusqlite)? {
        let mut row = Row::new();
        for (index, name) in columns.iter().enumerate() {
            let value = record.get_ref(index).map_err(from_rusqlite)?;
            row.insert(name.clone(), render(value));
        }
        rows.push(row);
    }
    Ok(rows)
}

/// SQLite's own text form of a column value
fn render(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
