mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

use crate::models::*;

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        db.seed_default_categories()?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    fn seed_default_categories(&mut self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        // Template limits in cents; None = unlimited.
        let defaults: &[(&str, &str, CategoryKind, Option<i64>)] = &[
            ("Rent", "🏠", CategoryKind::Fixed, Some(800_000)),
            ("Childcare", "👶", CategoryKind::Fixed, Some(300_000)),
            ("Taxes & accounting", "🧾", CategoryKind::Fixed, None),
            ("Investments", "📈", CategoryKind::Variable, Some(250_000)),
            ("Recurring services", "🔌", CategoryKind::Variable, Some(90_000)),
            ("Groceries", "🛒", CategoryKind::Variable, Some(350_000)),
            ("Eating out", "🍽", CategoryKind::Variable, Some(300_000)),
            ("Shopping", "👕", CategoryKind::Variable, Some(120_000)),
            ("Transport", "🚗", CategoryKind::Variable, Some(90_000)),
            ("Entertainment", "🎉", CategoryKind::Variable, Some(120_000)),
            ("Home & appliances", "🏡", CategoryKind::Variable, Some(70_000)),
            ("Buffer", "🎁", CategoryKind::Variable, Some(100_000)),
            ("Health", "💊", CategoryKind::Variable, Some(100_000)),
            ("Subscriptions", "💻", CategoryKind::Variable, Some(20_000)),
        ];

        let tx = self.conn.transaction()?;
        for (name, emoji, kind, limit) in defaults {
            tx.execute(
                "INSERT OR IGNORE INTO categories (name, emoji, kind, default_limit_cents, is_active)
                 VALUES (?1, ?2, ?3, ?4, 1)",
                params![name, emoji, kind.as_str(), limit],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn insert_category(&self, cat: &Category) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO categories (name, emoji, kind, default_limit_cents, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                cat.name,
                cat.emoji,
                cat.kind.as_str(),
                cat.default_limit.as_cents(),
                cat.is_active,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Active categories only, in id order. Deactivated categories never
    /// appear here, but their expenses stay in range aggregates.
    pub(crate) fn get_active_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, emoji, kind, default_limit_cents, is_active
             FROM categories WHERE is_active = 1 ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_category)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Fetch by id regardless of active flag, so historical expenses keep
    /// displaying under the category's last-known name and emoji.
    pub(crate) fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let result = self
            .conn
            .query_row(
                "SELECT id, name, emoji, kind, default_limit_cents, is_active
                 FROM categories WHERE id = ?1",
                params![id],
                row_to_category,
            )
            .optional()?;
        Ok(result)
    }

    pub(crate) fn find_active_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let result = self
            .conn
            .query_row(
                "SELECT id, name, emoji, kind, default_limit_cents, is_active
                 FROM categories WHERE name = ?1 AND is_active = 1",
                params![name],
                row_to_category,
            )
            .optional()?;
        Ok(result)
    }

    /// Soft delete. Categories are never removed so expense rows keep
    /// their referent.
    pub(crate) fn deactivate_category(&self, id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE categories SET is_active = 0 WHERE id = ?1 AND is_active = 1",
            params![id],
        )?;
        Ok(changed > 0)
    }

    // ── Monthly budget ────────────────────────────────────────

    /// 0 when no budget has been set; an unset budget is a defined
    /// degraded state, not an error.
    pub(crate) fn get_monthly_budget(&self, year: i32, month: u32) -> Result<i64> {
        let result: Option<i64> = self
            .conn
            .query_row(
                "SELECT budget_cents FROM monthly_budgets WHERE year = ?1 AND month = ?2",
                params![year, month],
                |row| row.get(0),
            )
            .optional()?;
        Ok(result.unwrap_or(0))
    }

    pub(crate) fn set_monthly_budget(&self, budget: &MonthlyBudget) -> Result<()> {
        self.conn.execute(
            "INSERT INTO monthly_budgets (year, month, budget_cents)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(year, month) DO UPDATE SET budget_cents = excluded.budget_cents",
            params![budget.year, budget.month, budget.budget_cents],
        )?;
        Ok(())
    }

    // ── Month category limits ─────────────────────────────────

    /// Overrides only; callers fall back to category defaults for
    /// categories absent from the map.
    pub(crate) fn get_month_limits(&self, year: i32, month: u32) -> Result<HashMap<i64, Limit>> {
        let mut stmt = self.conn.prepare(
            "SELECT category_id, limit_cents FROM category_limits
             WHERE year = ?1 AND month = ?2",
        )?;
        let rows = stmt.query_map(params![year, month], |row| {
            Ok((row.get::<_, i64>(0)?, Limit::from_cents(row.get(1)?)))
        })?;
        Ok(rows.collect::<std::result::Result<HashMap<_, _>, _>>()?)
    }

    pub(crate) fn has_month_limits(&self, year: i32, month: u32) -> Result<bool> {
        let row: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM category_limits WHERE year = ?1 AND month = ?2 LIMIT 1",
                params![year, month],
                |row| row.get(0),
            )
            .optional()?;
        Ok(row.is_some())
    }

    /// Last write wins.
    pub(crate) fn set_month_limit(
        &self,
        year: i32,
        month: u32,
        category_id: i64,
        limit: Limit,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO category_limits (year, month, category_id, limit_cents)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(year, month, category_id) DO UPDATE SET limit_cents = excluded.limit_cents",
            params![year, month, category_id, limit.as_cents()],
        )?;
        Ok(())
    }

    /// Snapshot category defaults into the month's limit rows. One atomic
    /// statement: rows already present (an earlier `set_month_limit`, or a
    /// concurrent materialization) are left untouched, never clobbered.
    pub(crate) fn materialize_default_limits(&self, year: i32, month: u32) -> Result<()> {
        self.conn.execute(
            "INSERT INTO category_limits (year, month, category_id, limit_cents)
             SELECT ?1, ?2, id, default_limit_cents FROM categories WHERE is_active = 1
             ON CONFLICT(year, month, category_id) DO NOTHING",
            params![year, month],
        )?;
        Ok(())
    }

    /// Start the month from the previous month's overrides, falling back to
    /// category defaults for categories the previous month never saw. A
    /// no-op if the target month already has limits; degrades to
    /// `materialize_default_limits` when the previous month has none.
    pub(crate) fn carry_over_limits(
        &mut self,
        year: i32,
        month: u32,
        prev_year: i32,
        prev_month: u32,
    ) -> Result<()> {
        if self.has_month_limits(year, month)? {
            return Ok(());
        }

        let prev = self.get_month_limits(prev_year, prev_month)?;
        if prev.is_empty() {
            return self.materialize_default_limits(year, month);
        }

        let cats = self.get_active_categories()?;
        let tx = self.conn.transaction()?;
        for cat in &cats {
            let Some(id) = cat.id else { continue };
            let limit = prev.get(&id).copied().unwrap_or(cat.default_limit);
            tx.execute(
                "INSERT INTO category_limits (year, month, category_id, limit_cents)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(year, month, category_id) DO NOTHING",
                params![year, month, id, limit.as_cents()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Expenses ──────────────────────────────────────────────

    pub(crate) fn insert_expense(&self, expense: &Expense) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO expenses (amount_cents, category_id, spent_date, created_at, comment)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                expense.amount_cents,
                expense.category_id,
                expense.spent_date,
                expense.created_at,
                expense.comment,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn insert_expenses_batch(&mut self, expenses: &[Expense]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for expense in expenses {
            tx.execute(
                "INSERT INTO expenses (amount_cents, category_id, spent_date, created_at, comment)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    expense.amount_cents,
                    expense.category_id,
                    expense.spent_date,
                    expense.created_at,
                    expense.comment,
                ],
            )?;
        }
        tx.commit()?;
        Ok(expenses.len())
    }

    /// A comment may be set exactly once post-hoc. Enforced in the
    /// statement itself rather than a read-then-write check; returns false
    /// when the expense is missing or already commented.
    pub(crate) fn set_expense_comment(&self, expense_id: i64, comment: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE expenses SET comment = ?1 WHERE id = ?2 AND comment IS NULL",
            params![comment, expense_id],
        )?;
        Ok(changed > 0)
    }

    /// Expenses joined with their category's last-known name, for export.
    /// `month` filters on the `YYYY-MM` prefix of `spent_date`.
    pub(crate) fn get_expenses_with_category(
        &self,
        month: Option<&str>,
    ) -> Result<Vec<(Expense, String)>> {
        let sql = "SELECT e.id, e.amount_cents, e.category_id, e.spent_date, e.created_at,
                          e.comment, c.name
                   FROM expenses e JOIN categories c ON c.id = e.category_id
                   WHERE ?1 IS NULL OR e.spent_date LIKE ?1 || '%'
                   ORDER BY e.spent_date, e.id";
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![month], |row| {
            Ok((
                Expense {
                    id: Some(row.get(0)?),
                    amount_cents: row.get(1)?,
                    category_id: row.get(2)?,
                    spent_date: row.get(3)?,
                    created_at: row.get(4)?,
                    comment: row.get(5)?,
                },
                row.get::<_, String>(6)?,
            ))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Latest expenses first, joined with category names. Feeds the entry
    /// listing users consult before attaching a comment.
    pub(crate) fn get_recent_expenses(&self, limit: u32) -> Result<Vec<(Expense, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.amount_cents, e.category_id, e.spent_date, e.created_at,
                    e.comment, c.name
             FROM expenses e JOIN categories c ON c.id = e.category_id
             ORDER BY e.id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                Expense {
                    id: Some(row.get(0)?),
                    amount_cents: row.get(1)?,
                    category_id: row.get(2)?,
                    spent_date: row.get(3)?,
                    created_at: row.get(4)?,
                    comment: row.get(5)?,
                },
                row.get::<_, String>(6)?,
            ))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Aggregates ────────────────────────────────────────────
    //
    // Month-style windows are half-open [start, end); explicit day-to-day
    // windows are inclusive. The asymmetry is part of each query's
    // contract — changing it silently corrupts monthly totals.

    /// Sum of all expenses with `start <= spent_date < end`. Includes
    /// expenses of deactivated categories.
    pub(crate) fn sum_total(&self, start: &str, end: &str) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses
             WHERE spent_date >= ?1 AND spent_date < ?2",
            params![start, end],
            |row| row.get(0),
        )?)
    }

    /// Single-date sum restricted to active categories of one kind.
    pub(crate) fn sum_on_date_by_kind(&self, date: &str, kind: CategoryKind) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(SUM(e.amount_cents), 0)
             FROM expenses e
             JOIN categories c ON c.id = e.category_id
             WHERE e.spent_date = ?1 AND c.kind = ?2 AND c.is_active = 1",
            params![date, kind.as_str()],
            |row| row.get(0),
        )?)
    }

    /// Inclusive day-range sum restricted to active categories of one kind.
    pub(crate) fn sum_range_by_kind(
        &self,
        start: &str,
        end: &str,
        kind: CategoryKind,
    ) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(SUM(e.amount_cents), 0)
             FROM expenses e
             JOIN categories c ON c.id = e.category_id
             WHERE e.spent_date >= ?1 AND e.spent_date <= ?2
               AND c.kind = ?3 AND c.is_active = 1",
            params![start, end, kind.as_str()],
            |row| row.get(0),
        )?)
    }

    /// Per-category sums over a half-open range. One row per active
    /// category, zero sums included, in id order — callers can enumerate
    /// every active category even with no spending.
    pub(crate) fn sum_by_category(&self, start: &str, end: &str) -> Result<Vec<(i64, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, COALESCE(SUM(e.amount_cents), 0)
             FROM categories c
             LEFT JOIN expenses e
               ON e.category_id = c.id AND e.spent_date >= ?1 AND e.spent_date < ?2
             WHERE c.is_active = 1
             GROUP BY c.id
             ORDER BY c.id",
        )?;
        let rows = stmt.query_map(params![start, end], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Top spenders over an inclusive day range, descending by sum, ties
    /// broken by ascending category id. At most `limit` rows; only
    /// categories with any spend appear.
    pub(crate) fn top_categories(
        &self,
        start: &str,
        end: &str,
        limit: u32,
    ) -> Result<Vec<CategorySpend>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.emoji, c.name, COALESCE(SUM(e.amount_cents), 0) AS s
             FROM expenses e
             JOIN categories c ON c.id = e.category_id
             WHERE e.spent_date >= ?1 AND e.spent_date <= ?2 AND c.is_active = 1
             GROUP BY c.id
             ORDER BY s DESC, c.id ASC
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(params![start, end, limit], |row| {
            Ok(CategorySpend {
                emoji: row.get(0)?,
                name: row.get(1)?,
                total_cents: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// One row per date with at least one expense, inclusive range.
    /// Dates with zero spend are omitted, unlike `sum_by_category`.
    pub(crate) fn daily_totals(&self, start: &str, end: &str) -> Result<Vec<(String, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT spent_date, COALESCE(SUM(amount_cents), 0)
             FROM expenses
             WHERE spent_date >= ?1 AND spent_date <= ?2
             GROUP BY spent_date
             ORDER BY spent_date",
        )?;
        let rows = stmt.query_map(params![start, end], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Day closures ──────────────────────────────────────────
    //
    // Review acknowledgements, used by scheduling collaborators to decide
    // whether to ask again. Not part of the financial computation.

    pub(crate) fn record_day_closure(
        &self,
        spent_date: &str,
        user_id: i64,
        closed_at: &str,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO day_closures (spent_date, user_id, closed_at)
             VALUES (?1, ?2, ?3)",
            params![spent_date, user_id, closed_at],
        )?;
        Ok(())
    }

    pub(crate) fn count_day_closures(&self, spent_date: &str) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM day_closures WHERE spent_date = ?1",
            params![spent_date],
            |row| row.get(0),
        )?)
    }

    pub(crate) fn is_day_closed(&self, spent_date: &str) -> Result<bool> {
        let row: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM closed_days WHERE spent_date = ?1",
                params![spent_date],
                |row| row.get(0),
            )
            .optional()?;
        Ok(row.is_some())
    }

    pub(crate) fn mark_day_closed(&self, spent_date: &str, closed_at: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO closed_days (spent_date, closed_at) VALUES (?1, ?2)",
            params![spent_date, closed_at],
        )?;
        Ok(())
    }
}

fn row_to_category(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        emoji: row.get(2)?,
        kind: CategoryKind::parse(&row.get::<_, String>(3)?).unwrap_or(CategoryKind::Variable),
        default_limit: Limit::from_cents(row.get(4)?),
        is_active: row.get(5)?,
    })
}
