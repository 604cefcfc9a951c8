use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rowkeeper_core::entity::{current_timestamp, EntityDescriptor};
use rowkeeper_core::typer::{BooleanTyper, DateTimeTyper, DateTyper, IntegerTyper, TimeTyper};
use rowkeeper_core::{
    Database, Dialect, Entity, OriginalSnapshot, OrmError, PropertyTyper, Result, Row,
    SupportsCreatedAt, SupportsUpdatedAt, Value,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::sync::OnceLock;

// ===== Fake database =====

/// Records every statement and replays scripted result sets
///
/// INSERTs advance a key counter that `last_generated_key` reports.
#[allow(dead_code)]
pub struct RecordingDatabase {
    dialect: Dialect,
    connected: Cell<bool>,
    in_transaction: Cell<bool>,
    statements: RefCell<Vec<String>>,
    results: RefCell<VecDeque<Vec<Row>>>,
    next_key: Cell<i64>,
    last_key: Cell<Option<i64>>,
    fail_on: RefCell<Option<String>>,
}

#[allow(dead_code)]
impl RecordingDatabase {
    pub fn new() -> Self {
        Self::with_dialect(Dialect::Sqlite)
    }

    pub fn with_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            connected: Cell::new(true),
            in_transaction: Cell::new(false),
            statements: RefCell::new(Vec::new()),
            results: RefCell::new(VecDeque::new()),
            next_key: Cell::new(1),
            last_key: Cell::new(None),
            fail_on: RefCell::new(None),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.set(connected);
    }

    /// Queue the rows returned by the next SELECT
    pub fn push_result(&self, rows: Vec<Row>) {
        self.results.borrow_mut().push_back(rows);
    }

    /// Fail every statement containing `fragment`
    pub fn fail_on(&self, fragment: &str) {
        *self.fail_on.borrow_mut() = Some(fragment.to_string());
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.borrow().clone()
    }

    pub fn statement_count(&self) -> usize {
        self.statements.borrow().len()
    }

    pub fn clear(&self) {
        self.statements.borrow_mut().clear();
    }
}

impl Database for RecordingDatabase {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn query(&self, sql: &str) -> Result<Vec<Row>> {
        if let Some(fragment) = self.fail_on.borrow().as_deref() {
            if sql.contains(fragment) {
                return Err(OrmError::Connection {
                    message: format!("scripted failure for: {sql}"),
                });
            }
        }
        self.statements.borrow_mut().push(sql.to_string());

        if sql.starts_with("INSERT") {
            let key = self.next_key.get();
            self.next_key.set(key + 1);
            self.last_key.set(Some(key));
        }
        if sql.starts_with("SELECT") {
            return Ok(self.results.borrow_mut().pop_front().unwrap_or_default());
        }
        Ok(Vec::new())
    }

    fn last_generated_key(&self) -> Result<Option<String>> {
        Ok(self.last_key.get().map(|key| key.to_string()))
    }

    fn in_transaction(&self) -> bool {
        self.in_transaction.get()
    }

    fn set_in_transaction(&self, active: bool) {
        self.in_transaction.set(active);
    }
}

/// Build a storage row from literal pairs
#[allow(dead_code)]
pub fn row(entries: &[(&str, Option<&str>)]) -> Row {
    entries
        .iter()
        .map(|(column, value)| (column.to_string(), value.map(str::to_string)))
        .collect()
}

// ===== Entities =====

/// Plain entity: untyped columns, no timestamp hooks
#[derive(Debug, Default, Clone)]
pub struct Note {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub original: OriginalSnapshot,
}

impl Entity for Note {
    fn descriptor() -> &'static EntityDescriptor<Self> {
        static DESCRIPTOR: OnceLock<EntityDescriptor<Note>> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            EntityDescriptor::<Note>::builder("Note")
                .property(
                    "id",
                    |n: &Note| n.id.into(),
                    Some(|n: &mut Note, v: Value| {
                        n.id = v.into_opt()?;
                        Ok(())
                    }),
                )
                .property(
                    "title",
                    |n: &Note| n.title.clone().into(),
                    Some(|n: &mut Note, v: Value| {
                        n.title = v.into_opt()?;
                        Ok(())
                    }),
                )
                .property(
                    "body",
                    |n: &Note| n.body.clone().into(),
                    Some(|n: &mut Note, v: Value| {
                        n.body = v.into_opt()?;
                        Ok(())
                    }),
                )
                .build()
        })
    }

    fn original(&self) -> &OriginalSnapshot {
        &self.original
    }

    fn original_mut(&mut self) -> &mut OriginalSnapshot {
        &mut self.original
    }
}

#[allow(dead_code)]
impl Note {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    pub fn stored(id: i64, title: &str) -> Self {
        let mut note = Self {
            id: Some(id),
            title: Some(title.to_string()),
            ..Default::default()
        };
        note.mark_as_original().expect("snapshot");
        note
    }
}

/// Entity with typed key and both timestamp hooks
#[derive(Debug, Default, Clone)]
pub struct User {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub original: OriginalSnapshot,
}

impl Entity for User {
    fn descriptor() -> &'static EntityDescriptor<Self> {
        static DESCRIPTOR: OnceLock<EntityDescriptor<User>> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            EntityDescriptor::<User>::builder("User")
                .property(
                    "id",
                    |u: &User| u.id.into(),
                    Some(|u: &mut User, v: Value| {
                        u.id = v.into_opt()?;
                        Ok(())
                    }),
                )
                .property(
                    "name",
                    |u: &User| u.name.clone().into(),
                    Some(|u: &mut User, v: Value| {
                        u.name = v.into_opt()?;
                        Ok(())
                    }),
                )
                .property(
                    "created_at",
                    |u: &User| u.created_at.into(),
                    Some(|u: &mut User, v: Value| {
                        u.created_at = v.into_opt()?;
                        Ok(())
                    }),
                )
                .property(
                    "updated_at",
                    |u: &User| u.updated_at.into(),
                    Some(|u: &mut User, v: Value| {
                        u.updated_at = v.into_opt()?;
                        Ok(())
                    }),
                )
                .typed("id", IntegerTyper)
                .typed("created_at", DateTimeTyper)
                .typed("updated_at", DateTimeTyper)
                .build()
        })
    }

    fn original(&self) -> &OriginalSnapshot {
        &self.original
    }

    fn original_mut(&mut self) -> &mut OriginalSnapshot {
        &mut self.original
    }

    fn created_at_support(&mut self) -> Option<&mut dyn SupportsCreatedAt> {
        Some(self)
    }

    fn updated_at_support(&mut self) -> Option<&mut dyn SupportsUpdatedAt> {
        Some(self)
    }
}

impl SupportsCreatedAt for User {
    fn mark_created_at(&mut self) {
        self.created_at = Some(current_timestamp());
    }
}

impl SupportsUpdatedAt for User {
    fn mark_updated_at(&mut self) {
        self.updated_at = Some(current_timestamp());
    }
}

#[allow(dead_code)]
impl User {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }
}

/// Entity whose `name` is read-only
#[derive(Debug, Default)]
pub struct Badge {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub original: OriginalSnapshot,
}

impl Entity for Badge {
    fn descriptor() -> &'static EntityDescriptor<Self> {
        static DESCRIPTOR: OnceLock<EntityDescriptor<Badge>> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            EntityDescriptor::<Badge>::builder("Badge")
                .property(
                    "id",
                    |b: &Badge| b.id.into(),
                    Some(|b: &mut Badge, v: Value| {
                        b.id = v.into_opt()?;
                        Ok(())
                    }),
                )
                .property("name", |b: &Badge| b.name.clone().into(), None)
                .build()
        })
    }

    fn original(&self) -> &OriginalSnapshot {
        &self.original
    }

    fn original_mut(&mut self) -> &mut OriginalSnapshot {
        &mut self.original
    }
}

/// Prefixes stored text, for exercising custom typers
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixTyper;

pub const PREFIX: &str = "CUSTOMIZED/";

impl PropertyTyper for PrefixTyper {
    fn type_value(&self, raw: &str) -> Result<Value> {
        Ok(Value::Text(format!("{PREFIX}{raw}")))
    }

    fn untype_value(&self, value: &Value) -> Result<String> {
        match value {
            Value::Text(text) => text
                .strip_prefix(PREFIX)
                .map(str::to_string)
                .ok_or_else(|| OrmError::type_mismatch(text.as_str(), "prefixed text")),
            other => Err(OrmError::type_mismatch(other.to_string(), "prefixed text")),
        }
    }
}

/// Entity covering every built-in typer plus a custom one
#[derive(Debug, Default)]
pub struct Reading {
    pub id: Option<i64>,
    pub taken_on: Option<NaiveDate>,
    pub taken_at: Option<NaiveTime>,
    pub recorded: Option<NaiveDateTime>,
    pub valid: bool,
    pub label: Option<String>,
    pub original: OriginalSnapshot,
}

impl Entity for Reading {
    fn descriptor() -> &'static EntityDescriptor<Self> {
        static DESCRIPTOR: OnceLock<EntityDescriptor<Reading>> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            EntityDescriptor::<Reading>::builder("Reading")
                .property(
                    "id",
                    |r: &Reading| r.id.into(),
                    Some(|r: &mut Reading, v: Value| {
                        r.id = v.into_opt()?;
                        Ok(())
                    }),
                )
                .property(
                    "taken_on",
                    |r: &Reading| r.taken_on.into(),
                    Some(|r: &mut Reading, v: Value| {
                        r.taken_on = v.into_opt()?;
                        Ok(())
                    }),
                )
                .property(
                    "taken_at",
                    |r: &Reading| r.taken_at.into(),
                    Some(|r: &mut Reading, v: Value| {
                        r.taken_at = v.into_opt()?;
                        Ok(())
                    }),
                )
                .property(
                    "recorded",
                    |r: &Reading| r.recorded.into(),
                    Some(|r: &mut Reading, v: Value| {
                        r.recorded = v.into_opt()?;
                        Ok(())
                    }),
                )
                .property(
                    "valid",
                    |r: &Reading| r.valid.into(),
                    Some(|r: &mut Reading, v: Value| {
                        r.valid = v.try_into()?;
                        Ok(())
                    }),
                )
                .property(
                    "label",
                    |r: &Reading| r.label.clone().into(),
                    Some(|r: &mut Reading, v: Value| {
                        r.label = v.into_opt()?;
                        Ok(())
                    }),
                )
                .typed("id", IntegerTyper)
                .typed("taken_on", DateTyper)
                .typed("taken_at", TimeTyper)
                .typed("recorded", DateTimeTyper)
                .typed("valid", BooleanTyper)
                .typed("label", PrefixTyper)
                .build()
        })
    }

    fn original(&self) -> &OriginalSnapshot {
        &self.original
    }

    fn original_mut(&mut self) -> &mut OriginalSnapshot {
        &mut self.original
    }
}
