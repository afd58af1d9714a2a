use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::path::Path;

use crate::db::Database;
use crate::format::{money, parse_amount_cents, parse_date_ddmmyyyy, parse_year_month};
use crate::models::{Category, CategoryKind, Expense, Limit, MonthlyBudget};
use crate::month::{date_str, MonthWindow};
use crate::Config;

pub(crate) fn as_cli(args: &[String], db: &mut Database, cfg: &Config) -> Result<()> {
    match args[1].as_str() {
        "add" => cli_add(&args[2..], db, cfg),
        "recent" => cli_recent(&args[2..], db),
        "comment" => cli_comment(&args[2..], db),
        "category" => cli_category(&args[2..], db, cfg),
        "budget" => cli_budget(&args[2..], db, cfg),
        "limit" => cli_limit(&args[2..], db, cfg),
        "close" => cli_close(&args[2..], db, cfg),
        "import" => cli_import(&args[2..], db, cfg),
        "export" => cli_export(&args[2..], db, cfg),
        "report" => cli_report(&args[2..], db, cfg),
        "safe-spend" => cli_safe_spend(&args[2..], db, cfg),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("safespend {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("SafeSpend — expense ledger with a daily safe-to-spend forecast");
    println!();
    println!("Usage: safespend <command>");
    println!();
    println!("Commands:");
    println!("  add <amount> <category> [--date DD.MM.YYYY] [--comment <text>]");
    println!("                                Record an expense (category by id or name)");
    println!("  recent [n]                    List the latest expenses (default 10)");
    println!("  comment <expense-id> <text>   Attach a comment to an expense (once)");
    println!("  category list                 List active categories");
    println!("  category add <name> <emoji> <fixed|variable> [limit]");
    println!("  category deactivate <id>      Soft-delete a category");
    println!("  budget set <amount> [YYYY-MM] Set the monthly budget");
    println!("  budget status                 Per-category state for the current month");
    println!("  limit set <category-id> <amount|off> [YYYY-MM]");
    println!("  limit carry [YYYY-MM]         Copy limits from the previous month");
    println!("  close [--user <id>] [DD.MM.YYYY]");
    println!("                                Mark a day as reviewed");
    println!("  import <file.csv>             Import expenses (spent_date,amount,category,comment)");
    println!("  export [path] [--month YYYY-MM]");
    println!("  report daily [DD.MM.YYYY]     Daily report");
    println!("  report weekly                 Report for the current ISO week");
    println!("  report monthly [YYYY-MM]      Monthly report (default: previous month)");
    println!("  safe-spend [DD.MM.YYYY]       Today's (or a given day's) allowance");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

fn now(cfg: &Config) -> DateTime<chrono_tz::Tz> {
    Utc::now().with_timezone(&cfg.tz)
}

fn today(cfg: &Config) -> NaiveDate {
    now(cfg).date_naive()
}

/// Optional trailing `DD.MM.YYYY` positional; today otherwise.
fn day_arg(args: &[String], cfg: &Config) -> Result<NaiveDate> {
    match args.first().filter(|a| !a.starts_with('-')) {
        Some(text) => parse_date_ddmmyyyy(text)
            .ok_or_else(|| anyhow::anyhow!("Invalid date (expected DD.MM.YYYY): {text}")),
        None => Ok(today(cfg)),
    }
}

/// Optional `YYYY-MM` positional; the current month otherwise.
fn month_arg(args: &[String], cfg: &Config) -> Result<(i32, u32)> {
    match args.first().filter(|a| !a.starts_with('-')) {
        Some(text) => parse_year_month(text)
            .ok_or_else(|| anyhow::anyhow!("Invalid month (expected YYYY-MM): {text}")),
        None => {
            let t = today(cfg);
            Ok((t.year(), t.month()))
        }
    }
}

fn resolve_category(db: &Database, text: &str) -> Result<Category> {
    let found = match text.parse::<i64>() {
        Ok(id) => db.get_category_by_id(id)?.filter(|c| c.is_active),
        Err(_) => db.find_active_category_by_name(text)?,
    };
    found.ok_or_else(|| anyhow::anyhow!("Unknown category: {text}"))
}

// ── Expenses ─────────────────────────────────────────────────

fn cli_add(args: &[String], db: &mut Database, cfg: &Config) -> Result<()> {
    if args.len() < 2 {
        anyhow::bail!("Usage: safespend add <amount> <category> [--date DD.MM.YYYY] [--comment <text>]");
    }

    let amount_cents = match parse_amount_cents(&args[0]) {
        Some(c) if c > 0 => c,
        _ => anyhow::bail!("Invalid amount: {}", args[0]),
    };
    let category = resolve_category(db, &args[1])?;
    let category_id = category
        .id
        .ok_or_else(|| anyhow::anyhow!("Category has no ID"))?;

    let spent_date = match args.windows(2).find(|w| w[0] == "--date") {
        Some(w) => parse_date_ddmmyyyy(&w[1])
            .ok_or_else(|| anyhow::anyhow!("Invalid date (expected DD.MM.YYYY): {}", w[1]))?,
        None => today(cfg),
    };
    let comment = args
        .windows(2)
        .find(|w| w[0] == "--comment")
        .map(|w| w[1].clone());

    let mut expense = Expense::new(
        amount_cents,
        category_id,
        date_str(spent_date),
        now(cfg).to_rfc3339(),
    );
    expense.comment = comment;

    let id = db.insert_expense(&expense)?;
    println!(
        "✅ Added #{id}: {} → {} {}",
        money(amount_cents),
        category.emoji,
        category.name
    );
    Ok(())
}

fn cli_recent(args: &[String], db: &mut Database) -> Result<()> {
    let limit: u32 = args.first().and_then(|a| a.parse().ok()).unwrap_or(10);
    let rows = db.get_recent_expenses(limit)?;
    if rows.is_empty() {
        println!("No expenses yet");
        return Ok(());
    }

    println!("{:<6} {:<12} {:>10}  {:<20} Comment", "ID", "Date", "Amount", "Category");
    println!("{}", "─".repeat(64));
    for (expense, category_name) in &rows {
        println!(
            "{:<6} {:<12} {:>10}  {:<20} {}",
            expense.id.unwrap_or(0),
            expense.spent_date,
            money(expense.amount_cents),
            category_name,
            expense.comment.as_deref().unwrap_or(""),
        );
    }
    Ok(())
}

fn cli_comment(args: &[String], db: &mut Database) -> Result<()> {
    if args.len() < 2 {
        anyhow::bail!("Usage: safespend comment <expense-id> <text>");
    }
    let expense_id: i64 = args[0]
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid expense id: {}", args[0]))?;
    let text = args[1..].join(" ");

    if db.set_expense_comment(expense_id, &text)? {
        println!("💬 Comment added");
    } else {
        println!("Expense #{expense_id} not found or already commented");
    }
    Ok(())
}

// ── Categories ───────────────────────────────────────────────

fn cli_category(args: &[String], db: &mut Database, cfg: &Config) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("list") => {
            let cats = db.get_active_categories()?;
            println!("{:<4} {:<24} {:<9} Limit", "ID", "Name", "Kind");
            println!("{}", "─".repeat(50));
            for cat in &cats {
                let limit = match cat.default_limit {
                    Limit::Amount(c) => money(c),
                    Limit::Unlimited => "unlimited".into(),
                };
                println!(
                    "{:<4} {:<24} {:<9} {}",
                    cat.id.unwrap_or(0),
                    format!("{} {}", cat.emoji, cat.name),
                    cat.kind,
                    limit,
                );
            }
            Ok(())
        }
        Some("add") => {
            if args.len() < 4 {
                anyhow::bail!("Usage: safespend category add <name> <emoji> <fixed|variable> [limit]");
            }
            let kind = CategoryKind::parse(&args[3])
                .ok_or_else(|| anyhow::anyhow!("Kind must be 'fixed' or 'variable'"))?;
            let limit = match args.get(4) {
                Some(text) => match parse_amount_cents(text) {
                    Some(0) => Limit::Unlimited,
                    Some(c) => Limit::Amount(c),
                    None => anyhow::bail!("Invalid limit: {text}"),
                },
                None => Limit::Unlimited,
            };

            let cat = Category::new(args[1].clone(), args[2].clone(), kind, limit);
            let id = db.insert_category(&cat)?;

            // The new category's limit also applies to the month in flight.
            let window = MonthWindow::for_instant(now(cfg));
            db.set_month_limit(window.year, window.month, id, limit)?;

            println!("✅ Added category #{id}: {} {}", cat.emoji, cat.name);
            Ok(())
        }
        Some("deactivate") => {
            let id: i64 = args
                .get(1)
                .and_then(|a| a.parse().ok())
                .ok_or_else(|| anyhow::anyhow!("Usage: safespend category deactivate <id>"))?;
            if db.deactivate_category(id)? {
                println!("✅ Category #{id} deactivated (history kept)");
            } else {
                println!("Category #{id} not found or already inactive");
            }
            Ok(())
        }
        _ => anyhow::bail!("Usage: safespend category <list|add|deactivate>"),
    }
}

// ── Budget & limits ──────────────────────────────────────────

fn cli_budget(args: &[String], db: &mut Database, cfg: &Config) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("set") => {
            let amount = args
                .get(1)
                .and_then(|a| parse_amount_cents(a))
                .ok_or_else(|| anyhow::anyhow!("Usage: safespend budget set <amount> [YYYY-MM]"))?;
            let (year, month) = month_arg(&args[2..], cfg)?;
            db.set_monthly_budget(&MonthlyBudget::new(year, month, amount))?;
            println!("✅ Budget for {year}-{month:02} set to {}", money(amount));
            Ok(())
        }
        Some("status") => {
            let window = MonthWindow::for_instant(now(cfg));
            // First touch of a month snapshots category defaults.
            db.materialize_default_limits(window.year, window.month)?;
            println!("{}", crate::report::build_budget_status(db, &window)?);
            Ok(())
        }
        _ => anyhow::bail!("Usage: safespend budget <set|status>"),
    }
}

fn cli_limit(args: &[String], db: &mut Database, cfg: &Config) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("set") => {
            if args.len() < 3 {
                anyhow::bail!("Usage: safespend limit set <category-id> <amount|off> [YYYY-MM]");
            }
            let category = resolve_category(db, &args[1])?;
            let category_id = category
                .id
                .ok_or_else(|| anyhow::anyhow!("Category has no ID"))?;
            let limit = if args[2] == "off" {
                Limit::Unlimited
            } else {
                match parse_amount_cents(&args[2]) {
                    Some(0) => Limit::Unlimited,
                    Some(c) => Limit::Amount(c),
                    None => anyhow::bail!("Invalid limit: {}", args[2]),
                }
            };
            let (year, month) = month_arg(&args[3..], cfg)?;

            db.materialize_default_limits(year, month)?;
            db.set_month_limit(year, month, category_id, limit)?;
            println!(
                "✅ Limit for {} {} in {year}-{month:02}: {limit_text}",
                category.emoji,
                category.name,
                limit_text = match limit {
                    Limit::Amount(c) => money(c),
                    Limit::Unlimited => "unlimited".into(),
                },
            );
            Ok(())
        }
        Some("carry") => {
            let (year, month) = month_arg(&args[1..], cfg)?;
            let window = MonthWindow::of(year, month)
                .ok_or_else(|| anyhow::anyhow!("Invalid month: {year}-{month:02}"))?;
            let (prev_year, prev_month) = window.prev();
            db.carry_over_limits(year, month, prev_year, prev_month)?;
            println!("✅ Limits for {year}-{month:02} carried over from {prev_year}-{prev_month:02}");
            Ok(())
        }
        _ => anyhow::bail!("Usage: safespend limit <set|carry>"),
    }
}

// ── Day closures ─────────────────────────────────────────────

fn cli_close(args: &[String], db: &mut Database, cfg: &Config) -> Result<()> {
    let user_id = match args.windows(2).find(|w| w[0] == "--user") {
        Some(w) => w[1]
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("Invalid user id: {}", w[1]))?,
        None => cfg.users.first().copied().unwrap_or(0),
    };
    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--user" {
            i += 2;
            continue;
        }
        positional.push(args[i].clone());
        i += 1;
    }
    let day = day_arg(&positional, cfg)?;
    let day_iso = date_str(day);

    db.record_day_closure(&day_iso, user_id, &now(cfg).to_rfc3339())?;

    // The day is closed for good once every configured user has closed it.
    let closures = db.count_day_closures(&day_iso)?;
    if !cfg.users.is_empty() && closures >= cfg.users.len() as i64 {
        db.mark_day_closed(&day_iso, &now(cfg).to_rfc3339())?;
    }

    if db.is_day_closed(&day_iso)? {
        println!("✅ {day_iso} closed");
    } else {
        println!("✅ Accepted ({closures} closed so far)");
    }
    Ok(())
}

// ── Import / export ──────────────────────────────────────────

fn cli_import(args: &[String], db: &mut Database, cfg: &Config) -> Result<()> {
    let Some(file_path) = args.first() else {
        anyhow::bail!("Usage: safespend import <file.csv>");
    };
    let path = Path::new(file_path);
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }

    let outcome = crate::import::import_expenses(db, path, &now(cfg).to_rfc3339())?;
    println!("Imported: {}", outcome.imported);
    println!("Skipped:  {}", outcome.skipped.len());
    if !outcome.skipped.is_empty() {
        println!();
        println!("Skipped rows (line, reason):");
        for row in &outcome.skipped {
            println!("  - {}: {}", row.line, row.reason);
        }
    }
    Ok(())
}

fn cli_export(args: &[String], db: &mut Database, cfg: &Config) -> Result<()> {
    let month = args
        .windows(2)
        .find(|w| w[0] == "--month")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| now(cfg).format("%Y-%m").to_string());

    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/safespend-export-{month}.csv")
        });

    let count = crate::import::export_expenses(db, Path::new(&output_path), Some(&month))?;
    if count == 0 {
        println!("No expenses for {month}");
    } else {
        println!("Exported {count} expenses to {output_path}");
    }
    Ok(())
}

// ── Reports & forecast ───────────────────────────────────────

fn cli_report(args: &[String], db: &mut Database, cfg: &Config) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("daily") => {
            let day = day_arg(&args[1..], cfg)?;
            println!("{}", crate::report::build_daily_report(db, day)?);
            Ok(())
        }
        Some("weekly") => {
            println!("{}", crate::report::build_weekly_report(db, today(cfg))?);
            Ok(())
        }
        Some("monthly") => {
            let (year, month) = match args.get(1).filter(|a| !a.starts_with('-')) {
                Some(text) => parse_year_month(text)
                    .ok_or_else(|| anyhow::anyhow!("Invalid month (expected YYYY-MM): {text}"))?,
                // Default to the month just finished, as sent on the 1st.
                None => MonthWindow::containing(today(cfg)).prev(),
            };
            // Materialized here so overruns see the month's limits; the
            // composer itself never writes.
            db.materialize_default_limits(year, month)?;
            println!("{}", crate::report::build_monthly_report(db, year, month)?);
            Ok(())
        }
        _ => anyhow::bail!("Usage: safespend report <daily|weekly|monthly>"),
    }
}

fn cli_safe_spend(args: &[String], db: &mut Database, cfg: &Config) -> Result<()> {
    let day = day_arg(args, cfg)?;
    let allowance = crate::forecast::safe_spend_for_day(db, day)?;
    println!("Safe to spend on {}: {}", date_str(day), money(allowance));
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
