#![allow(clippy::unwrap_used)]

use std::io::Write;

use super::*;
use crate::models::{Category, CategoryKind, Expense, Limit};

fn temp_csv(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn insert_cat(db: &Database, name: &str) -> i64 {
    let cat = Category::new(
        name.into(),
        "📦".into(),
        CategoryKind::Variable,
        Limit::Unlimited,
    );
    db.insert_category(&cat).unwrap()
}

const CREATED_AT: &str = "2024-03-15T12:00:00+01:00";

// ── Import ────────────────────────────────────────────────────

#[test]
fn test_import_valid_rows() {
    let mut db = Database::open_in_memory().unwrap();
    insert_cat(&db, "Groceries");
    insert_cat(&db, "Transport");

    let file = temp_csv(
        "spent_date,amount,category,comment\n\
         2024-03-01,12.50,Groceries,weekly shop\n\
         2024-03-02,8,Transport,\n",
    );
    let outcome = import_expenses(&mut db, file.path(), CREATED_AT).unwrap();

    assert_eq!(outcome.imported, 2);
    assert!(outcome.skipped.is_empty());
    assert_eq!(db.sum_total("2024-03-01", "2024-04-01").unwrap(), 1250 + 800);

    let rows = db.get_expenses_with_category(Some("2024-03")).unwrap();
    assert_eq!(rows[0].0.comment.as_deref(), Some("weekly shop"));
    assert!(rows[1].0.comment.is_none());
}

#[test]
fn test_import_rejects_header_mismatch() {
    let mut db = Database::open_in_memory().unwrap();
    let file = temp_csv("date,amount,category,comment\n2024-03-01,1,X,\n");
    assert!(import_expenses(&mut db, file.path(), CREATED_AT).is_err());
}

#[test]
fn test_import_skips_bad_rows_with_line_numbers() {
    let mut db = Database::open_in_memory().unwrap();
    insert_cat(&db, "Groceries");

    let file = temp_csv(
        "spent_date,amount,category,comment\n\
         2024-13-01,5,Groceries,bad date\n\
         2024-03-02,abc,Groceries,bad amount\n\
         2024-03-03,0,Groceries,zero amount\n\
         2024-03-04,5,Imaginary,unknown category\n\
         2024-03-05,5,Groceries,fine\n",
    );
    let outcome = import_expenses(&mut db, file.path(), CREATED_AT).unwrap();

    assert_eq!(outcome.imported, 1);
    let lines: Vec<usize> = outcome.skipped.iter().map(|s| s.line).collect();
    assert_eq!(lines, vec![2, 3, 4, 5]);
    assert!(outcome.skipped[0].reason.contains("Bad date"));
    assert!(outcome.skipped[1].reason.contains("Bad amount"));
    assert!(outcome.skipped[2].reason.contains("Bad amount"));
    assert!(outcome.skipped[3].reason.contains("Unknown category"));

    // Only the valid row landed.
    assert_eq!(db.sum_total("2024-03-01", "2024-04-01").unwrap(), 500);
}

#[test]
fn test_import_skips_deactivated_category() {
    let mut db = Database::open_in_memory().unwrap();
    let id = insert_cat(&db, "Old");
    db.deactivate_category(id).unwrap();

    let file = temp_csv("spent_date,amount,category,comment\n2024-03-01,5,Old,\n");
    let outcome = import_expenses(&mut db, file.path(), CREATED_AT).unwrap();
    assert_eq!(outcome.imported, 0);
    assert_eq!(outcome.skipped.len(), 1);
}

// ── Export ────────────────────────────────────────────────────

#[test]
fn test_export_writes_importable_csv() {
    let mut db = Database::open_in_memory().unwrap();
    let cat = insert_cat(&db, "Groceries");
    let mut exp = Expense::new(1250, cat, "2024-03-01".into(), CREATED_AT.into());
    exp.comment = Some("weekly shop".into());
    db.insert_expense(&exp).unwrap();
    db.insert_expense(&Expense::new(800, cat, "2024-04-02".into(), CREATED_AT.into()))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.csv");
    let count = export_expenses(&db, &path, Some("2024-03")).unwrap();
    assert_eq!(count, 1);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("spent_date,amount,category,comment"));
    assert!(content.contains("2024-03-01,12.50,Groceries,weekly shop"));
    assert!(!content.contains("2024-04-02"));

    // What export writes, import accepts.
    let outcome = import_expenses(&mut db, &path, CREATED_AT).unwrap();
    assert_eq!(outcome.imported, 1);
    assert!(outcome.skipped.is_empty());
}

#[test]
fn test_export_all_months() {
    let db = Database::open_in_memory().unwrap();
    let cat = insert_cat(&db, "Groceries");
    db.insert_expense(&Expense::new(100, cat, "2024-03-01".into(), CREATED_AT.into()))
        .unwrap();
    db.insert_expense(&Expense::new(200, cat, "2024-04-01".into(), CREATED_AT.into()))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all.csv");
    assert_eq!(export_expenses(&db, &path, None).unwrap(), 2);
}
