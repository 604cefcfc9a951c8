//! Begin/commit/rollback wrapper around a [`Database`]

use crate::database::Database;
use crate::errors::{OrmError, Result};
use crate::{log_op_end, log_op_start};
use std::time::Instant;

/// A non-reentrant transaction on one connection
///
/// At most one transaction is active per database, however many
/// `Transaction` values borrow it. Dropping an active transaction rolls it
/// back.
///
/// # Example
///
/// ```ignore
/// let mut transaction = Transaction::new(&database);
/// let saved = transaction.with_transaction(|| repository.save(&mut user))?;
/// ```
pub struct Transaction<'db> {
    database: &'db dyn Database,
    active: bool,
    started: Option<Instant>,
}

impl<'db> Transaction<'db> {
    pub fn new(database: &'db dyn Database) -> Self {
        Self {
            database,
            active: false,
            started: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// # Errors
    ///
    /// `NestedTransaction` if this or any other transaction on the same
    /// database is active, or `Connection`.
    pub fn begin(&mut self) -> Result<()> {
        if self.active || self.database.in_transaction() {
            return Err(OrmError::NestedTransaction);
        }
        log_op_start!("transaction");
        self.database
            .query(self.database.dialect().begin_transaction_sql())?;
        self.database.set_in_transaction(true);
        self.active = true;
        self.started = Some(Instant::now());
        Ok(())
    }

    /// # Errors
    ///
    /// `NoActiveTransaction` if idle, or `Connection`. A failed COMMIT
    /// leaves the transaction active.
    pub fn commit(&mut self) -> Result<()> {
        if !self.active {
            return Err(OrmError::NoActiveTransaction { op: "commit" });
        }
        self.database.query(self.database.dialect().commit_sql())?;
        self.finish("commit");
        Ok(())
    }

    /// # Errors
    ///
    /// `NoActiveTransaction` if idle, or `Connection`.
    pub fn rollback(&mut self) -> Result<()> {
        if !self.active {
            return Err(OrmError::NoActiveTransaction { op: "rollback" });
        }
        self.database.query(self.database.dialect().rollback_sql())?;
        self.finish("rollback");
        Ok(())
    }

    /// Run `action` inside a transaction
    ///
    /// Commits and returns the action's value on success. On failure rolls
    /// back and wraps the action's error in `TransactionFailed`.
    ///
    /// # Errors
    ///
    /// `TransactionFailed` from the action, or whatever `begin`, `commit`
    /// or `rollback` return.
    pub fn with_transaction<T, F, Er>(&mut self, action: F) -> Result<T>
    where
        F: FnOnce() -> std::result::Result<T, Er>,
        Er: std::error::Error + Send + Sync + 'static,
    {
        self.begin()?;
        match action() {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(err) => {
                self.rollback()?;
                Err(OrmError::TransactionFailed {
                    source: Box::new(err),
                })
            }
        }
    }

    fn finish(&mut self, outcome: &'static str) {
        self.active = false;
        self.database.set_in_transaction(false);
        let duration_ms = self
            .started
            .take()
            .map(|started| started.elapsed().as_millis() as u64)
            .unwrap_or_default();
        log_op_end!("transaction", duration_ms = duration_ms, outcome = outcome);
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        if let Err(err) = self.rollback() {
            tracing::warn!(error = %err, "rollback of abandoned transaction failed");
        }
    }
}
