#![allow(clippy::unwrap_used)]

use super::*;

// ── Limit ─────────────────────────────────────────────────────

#[test]
fn test_limit_from_cents() {
    assert_eq!(Limit::from_cents(Some(5000)), Limit::Amount(5000));
    assert_eq!(Limit::from_cents(None), Limit::Unlimited);
}

#[test]
fn test_limit_as_cents_round_trips() {
    assert_eq!(Limit::Amount(5000).as_cents(), Some(5000));
    assert_eq!(Limit::Unlimited.as_cents(), None);
}

#[test]
fn test_limit_zero_is_not_unlimited() {
    // Zero and unlimited are distinct states.
    assert_ne!(Limit::Amount(0), Limit::Unlimited);
    assert_ne!(Limit::Amount(0).as_cents(), Limit::Unlimited.as_cents());
}

#[test]
fn test_limit_reserved_cents() {
    assert_eq!(Limit::Amount(300_000).reserved_cents(), 300_000);
    assert_eq!(Limit::Amount(0).reserved_cents(), 0);
    assert_eq!(Limit::Amount(-100).reserved_cents(), 0);
    assert_eq!(Limit::Unlimited.reserved_cents(), 0);
}

#[test]
fn test_limit_display() {
    assert_eq!(Limit::Amount(1234).to_string(), "1234");
    assert_eq!(Limit::Unlimited.to_string(), "unlimited");
}

// ── CategoryKind ──────────────────────────────────────────────

#[test]
fn test_kind_parse() {
    assert_eq!(CategoryKind::parse("fixed"), Some(CategoryKind::Fixed));
    assert_eq!(CategoryKind::parse("variable"), Some(CategoryKind::Variable));
    assert_eq!(CategoryKind::parse("Fixed"), None);
    assert_eq!(CategoryKind::parse(""), None);
}

#[test]
fn test_kind_round_trips() {
    for kind in [CategoryKind::Fixed, CategoryKind::Variable] {
        assert_eq!(CategoryKind::parse(kind.as_str()), Some(kind));
    }
}

// ── Category ──────────────────────────────────────────────────

fn make_categories() -> Vec<Category> {
    let mut rent = Category::new(
        "Rent".into(),
        "🏠".into(),
        CategoryKind::Fixed,
        Limit::Amount(300_000),
    );
    rent.id = Some(1);
    let mut food = Category::new(
        "Groceries".into(),
        "🛒".into(),
        CategoryKind::Variable,
        Limit::Unlimited,
    );
    food.id = Some(2);
    vec![rent, food]
}

#[test]
fn test_category_display() {
    let cats = make_categories();
    assert_eq!(cats[0].to_string(), "🏠 Rent");
    assert_eq!(cats[1].to_string(), "🛒 Groceries");
}

#[test]
fn test_category_new_is_active() {
    let cat = Category::new(
        "X".into(),
        "❓".into(),
        CategoryKind::Variable,
        Limit::Unlimited,
    );
    assert!(cat.is_active);
    assert!(cat.id.is_none());
}

// ── Expense ───────────────────────────────────────────────────

#[test]
fn test_expense_new_has_no_comment() {
    let e = Expense::new(2500, 1, "2024-03-01".into(), "2024-03-01T10:00:00Z".into());
    assert!(e.comment.is_none());
    assert!(e.id.is_none());
    assert_eq!(e.amount_cents, 2500);
}
