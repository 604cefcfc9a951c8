use chrono::NaiveDateTime;
use rowkeeper_core::entity::{current_timestamp, EntityDescriptor};
use rowkeeper_core::typer::{BooleanTyper, DateTimeTyper, IntegerTyper};
use rowkeeper_core::{Entity, OriginalSnapshot, SupportsCreatedAt, SupportsUpdatedAt, Value};
use rowkeeper_store::SqliteDatabase;
use std::sync::OnceLock;

pub const SCHEMA: &str = "
    CREATE TABLE accounts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL,
        active INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT
    );
    CREATE TABLE memos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        body TEXT,
        score REAL NOT NULL DEFAULT 0
    );
";

/// In-memory database with the test schema applied
#[allow(dead_code)]
pub fn setup_test_db() -> SqliteDatabase {
    let db = SqliteDatabase::open_in_memory().unwrap();
    db.execute_batch(SCHEMA).unwrap();
    db
}

/// Typed entity with both timestamp hooks
#[derive(Debug, Default, Clone)]
pub struct Account {
    pub id: Option<i64>,
    pub email: Option<String>,
    pub active: bool,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub original: OriginalSnapshot,
}

impl Entity for Account {
    fn descriptor() -> &'static EntityDescriptor<Self> {
        static DESCRIPTOR: OnceLock<EntityDescriptor<Account>> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            EntityDescriptor::<Account>::builder("Account")
                .property(
                    "id",
                    |a: &Account| a.id.into(),
                    Some(|a: &mut Account, v: Value| {
                        a.id = v.into_opt()?;
                        Ok(())
                    }),
                )
                .property(
                    "email",
                    |a: &Account| a.email.clone().into(),
                    Some(|a: &mut Account, v: Value| {
                        a.email = v.into_opt()?;
                        Ok(())
                    }),
                )
                .property(
                    "active",
                    |a: &Account| a.active.into(),
                    Some(|a: &mut Account, v: Value| {
                        a.active = v.try_into()?;
                        Ok(())
                    }),
                )
                .property(
                    "created_at",
                    |a: &Account| a.created_at.into(),
                    Some(|a: &mut Account, v: Value| {
                        a.created_at = v.into_opt()?;
                        Ok(())
                    }),
                )
                .property(
                    "updated_at",
                    |a: &Account| a.updated_at.into(),
                    Some(|a: &mut Account, v: Value| {
                        a.updated_at = v.into_opt()?;
                        Ok(())
                    }),
                )
                .typed("id", IntegerTyper)
                .typed("active", BooleanTyper)
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

impl SupportsCreatedAt for Account {
    fn mark_created_at(&mut self) {
        self.created_at = Some(current_timestamp());
    }
}

impl SupportsUpdatedAt for Account {
    fn mark_updated_at(&mut self) {
        self.updated_at = Some(current_timestamp());
    }
}

#[allow(dead_code)]
impl Account {
    pub fn with_email(email: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            ..Default::default()
        }
    }
}

/// Untyped entity; values come back as text unless casting is enabled
#[derive(Debug, Default, Clone)]
pub struct Memo {
    pub id: Option<Value>,
    pub body: Option<String>,
    pub score: Option<Value>,
    pub original: OriginalSnapshot,
}

impl Entity for Memo {
    fn descriptor() -> &'static EntityDescriptor<Self> {
        static DESCRIPTOR: OnceLock<EntityDescriptor<Memo>> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            EntityDescriptor::<Memo>::builder("Memo")
                .property(
                    "id",
                    |m: &Memo| m.id.clone().unwrap_or(Value::Null),
                    Some(|m: &mut Memo, v: Value| {
                        m.id = (!v.is_null()).then_some(v);
                        Ok(())
                    }),
                )
                .property(
                    "body",
                    |m: &Memo| m.body.clone().into(),
                    Some(|m: &mut Memo, v: Value| {
                        m.body = v.into_opt()?;
                        Ok(())
                    }),
                )
                .property(
                    "score",
                    |m: &Memo| m.score.clone().unwrap_or(Value::Null),
                    Some(|m: &mut Memo, v: Value| {
                        m.score = (!v.is_null()).then_some(v);
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
