#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{Note, RecordingDatabase};
use rowkeeper_core::{Database, Dialect, OrmError, OrmErrorKind, Repository, Transaction};
use std::error::Error as _;

#[test]
fn test_begin_commit_on_sqlite() {
    let db = RecordingDatabase::new();
    let mut transaction = Transaction::new(&db);

    transaction.begin().unwrap();
    assert!(transaction.is_active());
    transaction.commit().unwrap();
    assert!(!transaction.is_active());

    assert_eq!(db.statements(), vec!["BEGIN TRANSACTION", "COMMIT"]);
}

#[test]
fn test_begin_on_mysql_uses_start_transaction() {
    let db = RecordingDatabase::with_dialect(Dialect::MySql);
    let mut transaction = Transaction::new(&db);

    transaction.begin().unwrap();
    transaction.rollback().unwrap();

    assert_eq!(db.statements(), vec!["START TRANSACTION", "ROLLBACK"]);
}

#[test]
fn test_nested_begin_is_rejected() {
    let db = RecordingDatabase::new();
    let mut transaction = Transaction::new(&db);

    transaction.begin().unwrap();
    let err = transaction.begin().unwrap_err();

    assert_eq!(err.kind(), OrmErrorKind::NestedTransaction);
    assert_eq!(db.statements(), vec!["BEGIN TRANSACTION"]);
    transaction.rollback().unwrap();
}

#[test]
fn test_commit_and_rollback_require_active_transaction() {
    let db = RecordingDatabase::new();
    let mut transaction = Transaction::new(&db);

    assert_eq!(
        transaction.commit().unwrap_err().kind(),
        OrmErrorKind::NoActiveTransaction
    );
    assert_eq!(
        transaction.rollback().unwrap_err().kind(),
        OrmErrorKind::NoActiveTransaction
    );
    assert_eq!(db.statement_count(), 0);
}

#[test]
fn test_with_transaction_commits_and_returns_value() {
    let db = RecordingDatabase::new();
    let repo = Repository::<Note>::new(&db, "notes", "id").unwrap();
    let mut transaction = Transaction::new(&db);
    let mut note = Note::titled("a");

    let outcome = transaction
        .with_transaction(|| repo.save(&mut note))
        .unwrap();

    assert_eq!(outcome.as_str(), "inserted");
    assert_eq!(
        db.statements(),
        vec![
            "BEGIN TRANSACTION",
            "INSERT INTO `notes` (`title`) VALUES ('a')",
            "COMMIT",
        ]
    );
}

#[test]
fn test_with_transaction_rolls_back_and_wraps_failure() {
    let db = RecordingDatabase::new();
    db.fail_on("INSERT");
    let repo = Repository::<Note>::new(&db, "notes", "id").unwrap();
    let mut transaction = Transaction::new(&db);
    let mut note = Note::titled("a");

    let err = transaction
        .with_transaction(|| repo.save(&mut note))
        .unwrap_err();

    assert_eq!(err.kind(), OrmErrorKind::TransactionFailed);
    let source = err.source().expect("wrapped error");
    assert!(source.to_string().starts_with("Database error"));
    assert!(!transaction.is_active());
    assert_eq!(db.statements(), vec!["BEGIN TRANSACTION", "ROLLBACK"]);
}

#[test]
fn test_with_transaction_accepts_foreign_errors() {
    let db = RecordingDatabase::new();
    let mut transaction = Transaction::new(&db);

    let result: Result<(), OrmError> =
        transaction.with_transaction(|| "x".parse::<i32>().map(|_| ()));

    let err = result.unwrap_err();
    assert!(err.to_string().starts_with("Transaction rolled back"));
}

#[test]
fn test_with_transaction_while_active_is_nested() {
    let db = RecordingDatabase::new();
    let mut transaction = Transaction::new(&db);
    transaction.begin().unwrap();

    let err = transaction
        .with_transaction(|| Ok::<_, OrmError>(()))
        .unwrap_err();
    assert_eq!(err.kind(), OrmErrorKind::NestedTransaction);
    transaction.commit().unwrap();
}

#[test]
fn test_drop_rolls_back_active_transaction() {
    let db = RecordingDatabase::new();
    {
        let mut transaction = Transaction::new(&db);
        transaction.begin().unwrap();
    }
    assert_eq!(db.statements(), vec!["BEGIN TRANSACTION", "ROLLBACK"]);
}

#[test]
fn test_drop_of_idle_transaction_issues_nothing() {
    let db = RecordingDatabase::new();
    {
        let mut transaction = Transaction::new(&db);
        transaction.begin().unwrap();
        transaction.commit().unwrap();
    }
    assert_eq!(db.statements(), vec!["BEGIN TRANSACTION", "COMMIT"]);
}

#[test]
fn test_second_transaction_on_same_database_is_nested() {
    let db = RecordingDatabase::new();
    let mut first = Transaction::new(&db);
    let mut second = Transaction::new(&db);

    first.begin().unwrap();
    let err = second.begin().unwrap_err();

    assert_eq!(err.kind(), OrmErrorKind::NestedTransaction);
    assert!(!second.is_active());
    assert_eq!(db.statements(), vec!["BEGIN TRANSACTION"]);

    first.commit().unwrap();
    second.begin().unwrap();
    second.rollback().unwrap();
    assert_eq!(
        db.statements(),
        vec!["BEGIN TRANSACTION", "COMMIT", "BEGIN TRANSACTION", "ROLLBACK"]
    );
}

#[test]
fn test_dropping_idle_guard_keeps_other_transaction_open() {
    let db = RecordingDatabase::new();
    let mut first = Transaction::new(&db);
    first.begin().unwrap();
    {
        let mut second = Transaction::new(&db);
        assert!(second.begin().is_err());
    }

    assert!(db.in_transaction());
    first.commit().unwrap();
    assert!(!db.in_transaction());
}
