pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    name                TEXT NOT NULL UNIQUE,
    emoji               TEXT NOT NULL DEFAULT '',
    kind                TEXT NOT NULL CHECK(kind IN ('fixed','variable')),
    default_limit_cents INTEGER,
    is_active           INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS category_limits (
    year        INTEGER NOT NULL,
    month       INTEGER NOT NULL,
    category_id INTEGER NOT NULL REFERENCES categories(id),
    limit_cents INTEGER,
    PRIMARY KEY (year, month, category_id)
);

CREATE TABLE IF NOT EXISTS expenses (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    amount_cents INTEGER NOT NULL CHECK(amount_cents > 0),
    category_id  INTEGER NOT NULL REFERENCES categories(id),
    spent_date   TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    comment      TEXT
);

CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(spent_date);
CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category_id);

CREATE TABLE IF NOT EXISTS monthly_budgets (
    year         INTEGER NOT NULL,
    month        INTEGER NOT NULL,
    budget_cents INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (year, month)
);

CREATE TABLE IF NOT EXISTS day_closures (
    spent_date TEXT NOT NULL,
    user_id    INTEGER NOT NULL,
    closed_at  TEXT NOT NULL,
    UNIQUE(spent_date, user_id)
);

CREATE TABLE IF NOT EXISTS closed_days (
    spent_date TEXT PRIMARY KEY,
    closed_at  TEXT NOT NULL
);

"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[
    // Future migrations go here:
    // (1, "ALTER TABLE expenses ADD COLUMN tag TEXT;"),
];
