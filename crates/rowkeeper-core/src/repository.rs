//! Typed CRUD access to one table
//!
//! ## Logging Ownership
//!
//! The repository owns lifecycle logging for writes:
//! - `log_op_start!` at entry of save, delete and the deferred flushes
//! - `log_op_end!` on success
//!
//! Reads log at debug level only. Failures are returned, not logged.

use crate::database::Database;
use crate::entity::{AnyEntity, Entity};
use crate::errors::{OrmError, Result};
use crate::query::{Builder, Operator, OrderBy, Query, COUNT_ALIAS};
use crate::typer::PropertyTypeDeterminer;
use crate::value::{Row, Value};
use crate::value_set::{ValueSetBuilder, ValueSetMode};
use crate::{log_op_end, log_op_start};
use std::time::Instant;

/// Ordering and paging for multi-row reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub order_by: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub offset: u64,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    fn apply(&self, query: &mut Query) {
        for order in &self.order_by {
            query.order_by(order.clone());
        }
        match self.limit {
            Some(limit) => query.limit(limit, self.offset),
            None => query.offset(self.offset),
        };
    }
}

/// What a call to [`Repository::save`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    Updated,
    /// Nothing to persist, no statement was issued
    Unchanged,
}

impl SaveOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveOutcome::Inserted => "inserted",
            SaveOutcome::Updated => "updated",
            SaveOutcome::Unchanged => "unchanged",
        }
    }
}

/// Repository for entities of type `E` stored in one table
///
/// Holds no entity cache. The only state is the two deferred queues, which
/// own their entities until flushed or cleared.
pub struct Repository<'db, E: Entity> {
    database: &'db dyn Database,
    table: String,
    primary_key: String,
    value_set_builder: ValueSetBuilder,
    determiner: PropertyTypeDeterminer,
    deferred_saves: Vec<E>,
    deferred_deletes: Vec<E>,
}

impl<'db, E: Entity> Repository<'db, E> {
    /// Create a repository for `table` keyed by `primary_key`
    ///
    /// # Errors
    ///
    /// `InvalidPrimaryKey` if `E` declares no such property.
    pub fn new(
        database: &'db dyn Database,
        table: impl Into<String>,
        primary_key: impl Into<String>,
    ) -> Result<Self> {
        let primary_key = primary_key.into();
        let descriptor = E::descriptor();
        if !descriptor.has_property(&primary_key) {
            return Err(OrmError::InvalidPrimaryKey {
                entity: descriptor.name(),
                key: primary_key,
            });
        }
        Ok(Self {
            database,
            table: table.into(),
            primary_key,
            value_set_builder: ValueSetBuilder,
            determiner: PropertyTypeDeterminer::default(),
            deferred_saves: Vec::new(),
            deferred_deletes: Vec::new(),
        })
    }

    /// Replace the determiner used for hydration and generated keys
    pub fn with_determiner(mut self, determiner: PropertyTypeDeterminer) -> Self {
        self.determiner = determiner;
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn determiner(&self) -> PropertyTypeDeterminer {
        self.determiner
    }

    /// A fresh transient entity
    pub fn create_entity(&self) -> E {
        E::default()
    }

    /// Whether the entity has a key and came from (or went to) storage
    pub fn is_stored(&self, entity: &E) -> bool {
        entity.has_been_marked_as_original()
            && entity
                .get_primary_key_value(&self.primary_key)
                .map(|key| !key.is_null())
                .unwrap_or(false)
    }

    // ===== Reads =====

    /// # Errors
    ///
    /// `NotConnected`, `Connection`, or any hydration error.
    pub fn find_all(&self, options: &FindOptions) -> Result<Vec<E>> {
        self.find_by(|_| {}, options)
    }

    /// # Errors
    ///
    /// `NotConnected` or `Connection`.
    pub fn count_all(&self) -> Result<u64> {
        self.count_by(|_| {})
    }

    /// Look up one entity by primary key
    ///
    /// A key the primary key's typer rejects (e.g. `"abc"` for an integer
    /// key) cannot match a stored row and yields `None` without a query.
    ///
    /// # Errors
    ///
    /// `NotConnected`, `Connection`, or any hydration error.
    pub fn find(&self, id: impl Into<Value>) -> Result<Option<E>> {
        self.builder()?;
        let key = match self.storage_key(id.into()) {
            Ok(key) => key,
            Err(OrmError::TypeMismatch { .. }) => return Ok(None),
            Err(err) => return Err(err),
        };
        let mut query = Query::select(self.table.as_str());
        query.filter(self.primary_key.as_str(), Operator::Eq, key).limit(1, 0);
        let rows = self.fetch(&query)?;
        Ok(self.hydrate(rows)?.into_iter().next())
    }

    /// Entities matching the filters `predicate` adds
    ///
    /// # Errors
    ///
    /// `NotConnected`, `Connection`, or any hydration error.
    pub fn find_by<F>(&self, predicate: F, options: &FindOptions) -> Result<Vec<E>>
    where
        F: FnOnce(&mut Query),
    {
        let mut query = Query::select(self.table.as_str());
        predicate(&mut query);
        options.apply(&mut query);
        let rows = self.fetch(&query)?;
        self.hydrate(rows)
    }

    /// At most one entity matching `predicate`
    ///
    /// # Errors
    ///
    /// `MultipleResultsFound` if more than one row matches, otherwise as
    /// [`Repository::find_by`].
    pub fn find_unique_by<F>(&self, predicate: F) -> Result<Option<E>>
    where
        F: FnOnce(&mut Query),
    {
        let mut query = Query::select(self.table.as_str());
        predicate(&mut query);
        let rows = self.fetch(&query)?;
        if rows.len() > 1 {
            return Err(OrmError::MultipleResultsFound {
                entity: E::descriptor().name(),
                count: rows.len(),
            });
        }
        Ok(self.hydrate(rows)?.into_iter().next())
    }

    /// # Errors
    ///
    /// `NotConnected`, `Connection`, or `TypeMismatch` if the count column
    /// is not numeric.
    pub fn count_by<F>(&self, predicate: F) -> Result<u64>
    where
        F: FnOnce(&mut Query),
    {
        let mut query = Query::select(self.table.as_str());
        predicate(&mut query);
        query.count();
        let rows = self.fetch(&query)?;
        let raw = rows
            .first()
            .and_then(|row| row.get(COUNT_ALIAS))
            .and_then(|value| value.as_deref());
        match raw {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| OrmError::type_mismatch(raw, "row count")),
            None => Ok(0),
        }
    }

    // ===== Writes =====

    /// Insert a transient entity or update a stored one
    ///
    /// # Errors
    ///
    /// `NotConnected`, `Connection`, or any mapping error. On error the
    /// entity's snapshot is left as it was.
    pub fn save(&self, entity: &mut E) -> Result<SaveOutcome> {
        log_op_start!("repository_save", table = self.table.as_str());
        let start = Instant::now();

        let outcome = self.save_impl(entity)?;

        log_op_end!(
            "repository_save",
            duration_ms = start.elapsed().as_millis() as u64,
            table = self.table.as_str(),
            outcome = outcome.as_str()
        );
        Ok(outcome)
    }

    /// Save each entity in order, stopping at the first failure
    ///
    /// # Errors
    ///
    /// As [`Repository::save`].
    pub fn save_all(&self, entities: &mut [E]) -> Result<Vec<SaveOutcome>> {
        entities.iter_mut().map(|entity| self.save(entity)).collect()
    }

    /// Save through a type-erased reference
    ///
    /// # Errors
    ///
    /// `EntityTypeMismatch` if `entity` is not an `E`, otherwise as
    /// [`Repository::save`].
    pub fn save_dyn(&self, entity: &mut dyn AnyEntity) -> Result<SaveOutcome> {
        let actual = entity.entity_name();
        match entity.as_any_mut().downcast_mut::<E>() {
            Some(entity) => self.save(entity),
            None => Err(OrmError::EntityTypeMismatch {
                expected: E::descriptor().name(),
                actual,
            }),
        }
    }

    /// Queue entities for [`Repository::save_deferred`]
    pub fn defer_save<I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = E>,
    {
        self.deferred_saves.extend(entities);
    }

    pub fn deferred_saves(&self) -> &[E] {
        &self.deferred_saves
    }

    /// Flush the save queue and hand the entities back
    ///
    /// Stored entities are updated one by one. Transient ones are batched
    /// into one multi-row INSERT per distinct column list, so identically
    /// shaped entities share a single statement; they do not receive
    /// generated keys. If any statement fails the queue is left intact.
    ///
    /// # Errors
    ///
    /// `NotConnected`, `Connection`, or any mapping error.
    pub fn save_deferred(&mut self) -> Result<Vec<E>> {
        log_op_start!(
            "repository_save_deferred",
            table = self.table.as_str(),
            batch_len = self.deferred_saves.len()
        );
        let start = Instant::now();

        let mut queued = std::mem::take(&mut self.deferred_saves);
        if let Err(err) = self.flush_saves(&mut queued) {
            self.deferred_saves = queued;
            return Err(err);
        }

        log_op_end!(
            "repository_save_deferred",
            duration_ms = start.elapsed().as_millis() as u64,
            table = self.table.as_str(),
            batch_len = queued.len()
        );
        Ok(queued)
    }

    pub fn clear_deferred_saves(&mut self) {
        self.deferred_saves.clear();
    }

    /// Delete stored entities with one statement
    ///
    /// # Errors
    ///
    /// `CannotDeleteUnstored` if any entity is transient (nothing is
    /// deleted), otherwise `NotConnected` or `Connection`.
    pub fn delete(&self, entities: &[E]) -> Result<()> {
        log_op_start!("repository_delete", table = self.table.as_str());
        let start = Instant::now();

        let keys = self.storage_keys(entities.iter())?;
        let row_count = keys.len();
        self.delete_keys(keys)?;

        log_op_end!(
            "repository_delete",
            duration_ms = start.elapsed().as_millis() as u64,
            table = self.table.as_str(),
            row_count = row_count
        );
        Ok(())
    }

    /// Delete through type-erased references
    ///
    /// # Errors
    ///
    /// `EntityTypeMismatch` if any entity is not an `E`, otherwise as
    /// [`Repository::delete`].
    pub fn delete_dyn(&self, entities: &[&dyn AnyEntity]) -> Result<()> {
        let typed = entities
            .iter()
            .map(|entity| {
                entity
                    .as_any()
                    .downcast_ref::<E>()
                    .ok_or_else(|| OrmError::EntityTypeMismatch {
                        expected: E::descriptor().name(),
                        actual: entity.entity_name(),
                    })
            })
            .collect::<Result<Vec<&E>>>()?;

        log_op_start!("repository_delete", table = self.table.as_str());
        let start = Instant::now();

        let keys = self.storage_keys(typed.into_iter())?;
        let row_count = keys.len();
        self.delete_keys(keys)?;

        log_op_end!(
            "repository_delete",
            duration_ms = start.elapsed().as_millis() as u64,
            table = self.table.as_str(),
            row_count = row_count
        );
        Ok(())
    }

    /// Queue stored entities for [`Repository::delete_deferred`]
    ///
    /// # Errors
    ///
    /// `CannotDeleteUnstored` if any entity is transient; none of the
    /// given entities are queued in that case.
    pub fn defer_delete<I>(&mut self, entities: I) -> Result<()>
    where
        I: IntoIterator<Item = E>,
    {
        let entities: Vec<E> = entities.into_iter().collect();
        if entities.iter().any(|entity| !self.is_stored(entity)) {
            return Err(OrmError::CannotDeleteUnstored {
                entity: E::descriptor().name(),
            });
        }
        self.deferred_deletes.extend(entities);
        Ok(())
    }

    pub fn deferred_deletes(&self) -> &[E] {
        &self.deferred_deletes
    }

    /// Delete everything queued with one statement and hand the entities back
    ///
    /// An empty queue issues no statement. On failure the queue is kept.
    ///
    /// # Errors
    ///
    /// `NotConnected` or `Connection`.
    pub fn delete_deferred(&mut self) -> Result<Vec<E>> {
        log_op_start!(
            "repository_delete_deferred",
            table = self.table.as_str(),
            batch_len = self.deferred_deletes.len()
        );
        let start = Instant::now();

        let keys = self.storage_keys(self.deferred_deletes.iter())?;
        self.delete_keys(keys)?;
        let deleted = std::mem::take(&mut self.deferred_deletes);

        log_op_end!(
            "repository_delete_deferred",
            duration_ms = start.elapsed().as_millis() as u64,
            table = self.table.as_str(),
            batch_len = deleted.len()
        );
        Ok(deleted)
    }

    pub fn clear_deferred_deletes(&mut self) {
        self.deferred_deletes.clear();
    }

    // ===== Internals =====

    fn builder(&self) -> Result<Builder> {
        if !self.database.is_connected() {
            return Err(OrmError::NotConnected);
        }
        Ok(Builder::new(self.database.dialect()))
    }

    fn fetch(&self, query: &Query) -> Result<Vec<Row>> {
        let sql = self.builder()?.build(query)?;
        let rows = self.database.query(&sql)?;
        tracing::debug!(table = %self.table, rows = rows.len(), "statement executed");
        Ok(rows)
    }

    fn hydrate(&self, rows: Vec<Row>) -> Result<Vec<E>> {
        rows.iter()
            .map(|row| E::from_storage_row_with(&self.primary_key, row, &self.determiner))
            .collect()
    }

    /// Primary key in storage form, for filters
    fn storage_key(&self, key: Value) -> Result<Value> {
        self.determiner.untype_value::<E>(&self.primary_key, key)
    }

    fn storage_keys<'e, I>(&self, entities: I) -> Result<Vec<Value>>
    where
        I: Iterator<Item = &'e E>,
    {
        entities
            .map(|entity| {
                if !self.is_stored(entity) {
                    return Err(OrmError::CannotDeleteUnstored {
                        entity: E::descriptor().name(),
                    });
                }
                self.storage_key(entity.get_primary_key_value(&self.primary_key)?)
            })
            .collect()
    }

    fn delete_keys(&self, keys: Vec<Value>) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut query = Query::delete(self.table.as_str());
        query.filter_list(self.primary_key.as_str(), Operator::In, keys);
        self.fetch(&query)?;
        Ok(())
    }

    fn save_impl(&self, entity: &mut E) -> Result<SaveOutcome> {
        if self.is_stored(entity) {
            self.update(entity)
        } else {
            self.insert(entity)
        }
    }

    fn insert(&self, entity: &mut E) -> Result<SaveOutcome> {
        if let Some(hook) = entity.created_at_support() {
            hook.mark_created_at();
        }
        let value_set = self
            .value_set_builder
            .build(&self.primary_key, entity, ValueSetMode::Insert)?;
        if !value_set.has_values() {
            return Ok(SaveOutcome::Unchanged);
        }

        let mut query = Query::insert(self.table.as_str());
        query.add_value_set(value_set);
        self.fetch(&query)?;

        if let Some(raw) = self.database.last_generated_key()? {
            let key = self
                .determiner
                .type_value::<E>(&self.primary_key, Some(raw.as_str()))?;
            entity.set_primary_key_value(&self.primary_key, key)?;
        }
        entity.mark_as_original()?;
        Ok(SaveOutcome::Inserted)
    }

    fn update(&self, entity: &mut E) -> Result<SaveOutcome> {
        if let Some(hook) = entity.updated_at_support() {
            hook.mark_updated_at();
        }
        let value_set = self
            .value_set_builder
            .build(&self.primary_key, entity, ValueSetMode::Update)?;
        if !value_set.has_values() {
            return Ok(SaveOutcome::Unchanged);
        }

        let key = self.storage_key(entity.get_primary_key_value(&self.primary_key)?)?;
        let mut query = Query::update(self.table.as_str());
        query
            .add_value_set(value_set)
            .filter(self.primary_key.as_str(), Operator::Eq, key);
        self.fetch(&query)?;

        entity.mark_as_original()?;
        Ok(SaveOutcome::Updated)
    }

    fn flush_saves(&self, entities: &mut [E]) -> Result<()> {
        // One INSERT per distinct column list; omitted columns keep their
        // defaults.
        let mut batches: Vec<(Vec<String>, Query)> = Vec::new();
        for entity in entities.iter_mut() {
            if self.is_stored(entity) {
                self.update(entity)?;
                continue;
            }
            if let Some(hook) = entity.created_at_support() {
                hook.mark_created_at();
            }
            let value_set = self
                .value_set_builder
                .build(&self.primary_key, entity, ValueSetMode::Insert)?;
            if !value_set.has_values() {
                continue;
            }

            let columns: Vec<String> = value_set.columns().map(str::to_string).collect();
            match batches.iter_mut().find(|(batch, _)| *batch == columns) {
                Some((_, insert)) => {
                    insert.add_value_set(value_set);
                }
                None => {
                    let mut insert = Query::insert(self.table.as_str());
                    insert.add_value_set(value_set);
                    batches.push((columns, insert));
                }
            }
        }

        for (_, insert) in &batches {
            self.fetch(insert)?;
        }
        Ok(())
    }
}
