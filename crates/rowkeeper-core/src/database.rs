//! Connection seam used by repositories and transactions

use crate::errors::Result;
use crate::query::Dialect;
use crate::value::Row;

/// A synchronous, single-connection database
///
/// Methods take `&self` so one connection can be shared by several
/// repositories and a transaction at the same time.
pub trait Database {
    fn dialect(&self) -> Dialect;

    fn is_connected(&self) -> bool;

    /// Run one statement
    ///
    /// Statements that produce columns return their rows; everything else
    /// returns an empty list.
    ///
    /// # Errors
    ///
    /// `Connection` on any driver failure.
    fn query(&self, sql: &str) -> Result<Vec<Row>>;

    /// Key generated by the most recent INSERT, as text
    ///
    /// # Errors
    ///
    /// `Connection` on any driver failure.
    fn last_generated_key(&self) -> Result<Option<String>>;

    /// Whether a [`Transaction`](crate::Transaction) holds this connection
    fn in_transaction(&self) -> bool;

    /// Set by [`Transaction`](crate::Transaction) on begin and on finish
    fn set_in_transaction(&self, active: bool);
}
