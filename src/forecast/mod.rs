use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use crate::db::Database;
use crate::models::{CategoryKind, Limit};
use crate::month::{date_str, MonthWindow};

/// How much can be spent on `day` without jeopardizing the monthly budget.
///
/// Fixed-category limits are reserved at their full planned amount from day
/// one of the month, paid or not; variable spend counts on actuals. The
/// remaining discretionary budget is re-divided evenly over the remaining
/// days on every call — a receding-horizon forecast, not a stipend fixed at
/// month start. Expenses dated `day` itself never reduce `day`'s own
/// allowance.
///
/// Read-only: limit overrides are consulted as-is, with category defaults
/// as fallback; nothing is materialized here.
pub(crate) fn safe_spend_for_day(db: &Database, day: NaiveDate) -> Result<i64> {
    let window = MonthWindow::containing(day);

    let budget = db.get_monthly_budget(window.year, window.month)?;
    if budget <= 0 {
        // Unset budgets never produce a positive allowance.
        return Ok(0);
    }

    let cats = db.get_active_categories()?;
    let overrides = db.get_month_limits(window.year, window.month)?;

    let mut planned_fixed: i64 = 0;
    let mut fixed_ids: Vec<i64> = Vec::new();
    for cat in &cats {
        let Some(id) = cat.id else { continue };
        if cat.kind != CategoryKind::Fixed {
            continue;
        }
        fixed_ids.push(id);
        planned_fixed += effective_limit(&overrides, id, cat.default_limit).reserved_cents();
    }

    // Month-to-date strictly before `day`.
    let sums_before: HashMap<i64, i64> = db
        .sum_by_category(&window.start_str(), &date_str(day))?
        .into_iter()
        .collect();
    let spent_total_before = db.sum_total(&window.start_str(), &date_str(day))?;
    let spent_fixed_before: i64 = fixed_ids
        .iter()
        .map(|id| sums_before.get(id).copied().unwrap_or(0))
        .sum();
    let spent_nonfixed_before = spent_total_before - spent_fixed_before;

    // Days from `day` through month end inclusive, floored at 1 so the
    // last day still divides by 1.
    let remaining_days = (window.days_in_month() - day.day() as i64 + 1).max(1);

    let discretionary = budget - planned_fixed - spent_nonfixed_before;
    if discretionary <= 0 {
        // Already overspent; never surface a negative allowance.
        return Ok(0);
    }

    Ok(div_round_half_up(discretionary, remaining_days))
}

/// Integer division rounding half up, on a non-negative numerator.
fn div_round_half_up(numerator: i64, denominator: i64) -> i64 {
    (numerator + denominator / 2) / denominator
}

/// Convenience used by reports: a `Limit` resolved from overrides with the
/// category default as fallback.
pub(crate) fn effective_limit(
    overrides: &HashMap<i64, Limit>,
    category_id: i64,
    default_limit: Limit,
) -> Limit {
    overrides
        .get(&category_id)
        .copied()
        .unwrap_or(default_limit)
}
