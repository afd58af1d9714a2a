use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Render cents as whole currency units with space-grouped thousands.
/// e.g. `123456789` → `"1 234 567 zł"`. Floors toward negative infinity so a
/// negative remainder reads as an overrun, matching report output.
pub(crate) fn money(cents: i64) -> String {
    let units = cents.div_euclid(100);
    format!("{} zł", group_thousands(units))
}

fn group_thousands(n: i64) -> String {
    let digits = n.abs().to_string();
    let grouped: String = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" ");
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Five-square progress bar for spent-to-limit ratios.
/// Ratios above 1.0 saturate at five filled squares.
pub(crate) fn bar_squares_5(ratio: f64) -> String {
    let ratio = ratio.max(0.0);
    let filled = ((ratio * 5.0).round() as usize).min(5);
    "🟩".repeat(filled) + &"⬜".repeat(5 - filled)
}

/// Parse money text into cents. Accepts `"123"`, `"123.45"`, `"123,45"`;
/// at most two fraction digits; rejects signs, currency symbols, and
/// anything else. Malformed text is rejected here, before it can reach the
/// ledger.
pub(crate) fn parse_amount_cents(text: &str) -> Option<i64> {
    let t = text.trim().replace(',', ".");
    let valid = Regex::new(r"^\d+(\.\d{1,2})?$").ok()?;
    if !valid.is_match(&t) {
        return None;
    }
    let amount = Decimal::from_str(&t).ok()?;
    (amount * Decimal::from(100)).trunc().to_i64()
}

/// `DD.MM.YYYY` → calendar date. Real calendar validation, so `31.02.2024`
/// is rejected, not normalized.
pub(crate) fn parse_date_ddmmyyyy(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%d.%m.%Y").ok()
}

/// `YYYY-MM-DD`, the storage-canonical form.
pub(crate) fn parse_date_iso(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// `YYYY-MM` → (year, month).
pub(crate) fn parse_year_month(text: &str) -> Option<(i32, u32)> {
    let t = text.trim();
    let (y, m) = t.split_once('-')?;
    if y.len() != 4 {
        return None;
    }
    let year: i32 = y.parse().ok()?;
    let month: u32 = m.parse().ok()?;
    if (1..=12).contains(&month) {
        Some((year, month))
    } else {
        None
    }
}

/// `DD.MM` day label used in report lines.
pub(crate) fn day_label(date: NaiveDate) -> String {
    date.format("%d.%m").to_string()
}

pub(crate) fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "?",
    }
}
