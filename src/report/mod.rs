use anyhow::Result;
use chrono::{Duration, NaiveDate};

use crate::db::Database;
use crate::forecast::{effective_limit, safe_spend_for_day};
use crate::format::{bar_squares_5, day_label, money, month_name};
use crate::models::{CategoryKind, CategorySpend, Limit};
use crate::month::{date_str, week_window, MonthWindow};

// Composers are pure readers of ledger state. The monthly flow's caller is
// responsible for materializing the month's limits beforehand; nothing in
// this module writes.

fn top_lines(top: &[CategorySpend]) -> String {
    if top.is_empty() {
        return "—".into();
    }
    top.iter()
        .map(|c| format!("{} {} — {}", c.emoji, c.name, money(c.total_cents)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn plan_vs_actual(actual: i64, plan: i64) -> String {
    let delta = actual - plan;
    if delta > 0 {
        format!("🔴 {}", money(delta))
    } else {
        format!("🟢 {}", money(delta.abs()))
    }
}

/// One day: total and variable spend, safe-spend plan vs actual, tomorrow's
/// allowance (0 when tomorrow falls in the next month — the forecast never
/// crosses a month boundary), top-2 categories.
pub(crate) fn build_daily_report(db: &Database, day: NaiveDate) -> Result<String> {
    let day_iso = date_str(day);
    let next_day = day + Duration::days(1);

    let total_day = db.sum_total(&day_iso, &date_str(next_day))?;
    let var_day = db.sum_on_date_by_kind(&day_iso, CategoryKind::Variable)?;

    let plan_today = safe_spend_for_day(db, day)?;
    let tomorrow_plan = if MonthWindow::containing(day).contains(next_day) {
        safe_spend_for_day(db, next_day)?
    } else {
        0
    };

    let top2 = db.top_categories(&day_iso, &day_iso, 2)?;

    Ok(format!(
        "📊 Daily Report ({})\n\
         \n\
         Spent today: {}\n\
         Variable spend: {}\n\
         \n\
         Safe-spend:\n\
         Plan: {}\n\
         Actual: {}\n\
         Result: {}\n\
         Tomorrow: {}\n\
         \n\
         Top categories:\n\
         {}",
        day_label(day),
        money(total_day),
        money(var_day),
        money(plan_today),
        money(var_day),
        plan_vs_actual(var_day, plan_today),
        money(tomorrow_plan),
        top_lines(&top2),
    ))
}

/// The ISO Monday–Sunday week containing `today`. The weekly plan is
/// `safe_spend(monday) × 7` — a single-day snapshot, not seven independent
/// forecasts summed.
pub(crate) fn build_weekly_report(db: &Database, today: NaiveDate) -> Result<String> {
    let (monday, sunday) = week_window(today);
    let start_iso = date_str(monday);
    let end_iso = date_str(sunday);

    let total = db.sum_total(&start_iso, &date_str(sunday + Duration::days(1)))?;
    let var_total = db.sum_range_by_kind(&start_iso, &end_iso, CategoryKind::Variable)?;

    let plan_week = safe_spend_for_day(db, monday)? * 7;

    let top3 = db.top_categories(&start_iso, &end_iso, 3)?;

    let daily = db.daily_totals(&start_iso, &end_iso)?;
    let priciest = daily
        .iter()
        .fold(None::<&(String, i64)>, |best, row| match best {
            Some(b) if b.1 >= row.1 => Some(b),
            _ => Some(row),
        });
    let priciest_line = match priciest {
        Some((date, sum)) => {
            let label = crate::format::parse_date_iso(date)
                .map(day_label)
                .unwrap_or_else(|| date.clone());
            format!("{label} — {}", money(*sum))
        }
        None => "—".into(),
    };

    Ok(format!(
        "📊 Weekly Report\n\
         \n\
         Spent: {}\n\
         Variable spend: {}\n\
         \n\
         Safe-spend:\n\
         Plan: {}\n\
         Actual: {}\n\
         Result: {}\n\
         \n\
         Top categories:\n\
         {}\n\
         \n\
         Most expensive day: {}",
        money(total),
        money(var_total),
        money(plan_week),
        money(var_total),
        plan_vs_actual(var_total, plan_week),
        top_lines(&top3),
        priciest_line,
    ))
}

/// A completed or current month: total spend, budget remainder, top-5
/// categories, and every category whose effective limit was exceeded,
/// reported as a negative remainder.
pub(crate) fn build_monthly_report(db: &Database, year: i32, month: u32) -> Result<String> {
    let window = MonthWindow::of(year, month)
        .ok_or_else(|| anyhow::anyhow!("Invalid month: {year}-{month:02}"))?;
    let start = window.start_str();
    let end = window.end_str();

    let budget = db.get_monthly_budget(year, month)?;
    let total = db.sum_total(&start, &end)?;
    let remaining = budget - total;
    let rem_icon = if remaining >= 0 { "🟢" } else { "🔴" };

    let top5 = db.top_categories(&start, &date_str(window.last_day()), 5)?;

    // Limit overruns against the month's effective limits. Unlimited and
    // non-positive limits never count as exceeded.
    let cats = db.get_active_categories()?;
    let overrides = db.get_month_limits(year, month)?;
    let sums: std::collections::HashMap<i64, i64> =
        db.sum_by_category(&start, &end)?.into_iter().collect();

    let mut over_lines: Vec<String> = Vec::new();
    for cat in &cats {
        let Some(id) = cat.id else { continue };
        let limit = match effective_limit(&overrides, id, cat.default_limit) {
            Limit::Amount(c) if c > 0 => c,
            _ => continue,
        };
        let spent = sums.get(&id).copied().unwrap_or(0);
        let diff = limit - spent;
        if diff < 0 {
            over_lines.push(format!("{} {} — {} 🔴", cat.emoji, cat.name, money(diff)));
        }
    }
    let over_text = if over_lines.is_empty() {
        "—".into()
    } else {
        over_lines.join("\n")
    };

    Ok(format!(
        "📅 Monthly Report — {}\n\
         \n\
         Spent: {}\n\
         {} Remaining: {}\n\
         \n\
         Top categories:\n\
         {}\n\
         \n\
         Limit overruns:\n\
         {}",
        month_name(month),
        money(total),
        rem_icon,
        money(remaining),
        top_lines(&top5),
        over_text,
    ))
}

/// Mid-month status: every active category with spent/limit, a five-square
/// bar and the signed remainder, followed by a summary block with the
/// month's remaining budget and top spending.
pub(crate) fn build_budget_status(db: &Database, window: &MonthWindow) -> Result<String> {
    let cats = db.get_active_categories()?;
    let sums: std::collections::HashMap<i64, i64> = db
        .sum_by_category(&window.start_str(), &window.end_str())?
        .into_iter()
        .collect();
    let overrides = db.get_month_limits(window.year, window.month)?;

    let mut lines: Vec<String> = vec![
        format!("📊 {} — budget status", month_name(window.month)),
        String::new(),
    ];

    let mut exceeded = 0;
    for cat in &cats {
        let Some(id) = cat.id else { continue };
        let spent = sums.get(&id).copied().unwrap_or(0);

        lines.push(format!("{} {}", cat.emoji, cat.name));
        match effective_limit(&overrides, id, cat.default_limit) {
            Limit::Unlimited => {
                lines.push(format!("{} (no limit)", money(spent)));
            }
            Limit::Amount(limit) => {
                let remaining = limit - spent;
                if limit > 0 && spent > limit {
                    exceeded += 1;
                }
                let ratio = if limit <= 0 {
                    0.0
                } else {
                    spent as f64 / limit as f64
                };
                let status = if remaining < 0 { "🔴" } else { "🟢" };
                lines.push(format!(
                    "{} / {}  {}  {} {}",
                    money(spent),
                    money(limit),
                    bar_squares_5(ratio),
                    money(remaining),
                    status,
                ));
            }
        }
        lines.push(String::new());
    }

    let budget = db.get_monthly_budget(window.year, window.month)?;
    let spent_total = db.sum_total(&window.start_str(), &window.end_str())?;

    let top = db.top_categories(&window.start_str(), &date_str(window.last_day()), 5)?;

    lines.push(format!("📊 Summary {}", month_name(window.month)));
    lines.push(String::new());
    lines.push(format!(
        "Remaining this month: {}",
        money(budget - spent_total)
    ));
    lines.push(String::new());
    lines.push("Top spending:".into());
    if top.is_empty() {
        lines.push("— (no spending yet)".into());
    } else {
        for c in &top {
            lines.push(format!("{} {} — {}", c.emoji, c.name, money(c.total_cents)));
        }
    }
    lines.push(String::new());
    lines.push(format!("Exceeded: {exceeded} 🔴"));

    Ok(lines.join("\n").trim_end().to_string())
}
