//! Display formatting for resolved values.
//!
//! Money values travel in minor units (cents); rates and percentages
//! travel as decimals.

use crate::types::{DataFormat, ValueUnit};

/// Rounds a minor-unit value to whole cents, half away from zero.
pub fn cents_from_value(value: f64) -> i64 {
    value.round() as i64
}

/// Formats cents as US currency: `245000` → `"$2,450.00"`.
pub fn format_money_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", group_thousands(abs / 100), abs % 100)
}

/// Formats a rate with three decimals, trimming a trailing third zero.
pub fn format_rate(value: f64) -> String {
    let fixed = format!("{value:.3}");
    match fixed.strip_suffix('0') {
        Some(trimmed) => trimmed.to_string(),
        None => fixed,
    }
}

/// Formats a decimal fraction as a percentage: `0.05` → `"5.00%"`.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Formats a plain number with thousands separators.
pub fn format_plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        let sign = if value < 0.0 { "-" } else { "" };
        format!("{sign}{}", group_thousands(value.abs() as u64))
    } else {
        let cents = (value * 100.0).round() as i64;
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();
        format!("{sign}{}.{:02}", group_thousands(abs / 100), abs % 100)
    }
}

/// Produces the display string for a value in its native format.
///
/// Money is interpreted as minor units.
pub fn display_value(value: f64, format: DataFormat) -> String {
    match format {
        DataFormat::Money => format_money_cents(cents_from_value(value)),
        DataFormat::Rate => format_rate(value),
        DataFormat::Percent => format_percent(value),
        DataFormat::Plain => format_plain(value),
    }
}

/// Produces the display string for a value under a caller-declared unit.
pub fn display_with_unit(value: f64, format: DataFormat, unit: ValueUnit) -> String {
    match (format, unit) {
        (DataFormat::Money, ValueUnit::Minor) => display_value(value, DataFormat::Money),
        (DataFormat::Money, ValueUnit::Whole) => display_value(value * 100.0, DataFormat::Money),
        (other, ValueUnit::Minor) => display_value(value / 100.0, other),
        (other, ValueUnit::Whole) => display_value(value, other),
    }
}

/// Parses a money display string back to cents.
///
/// Strips the currency symbol and separators; returns `None` when the
/// remainder is not a two-decimal amount.
pub fn parse_money_cents(display: &str) -> Option<i64> {
    let trimmed = display.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let cleaned: String = body.chars().filter(|c| *c != '$' && *c != ',').collect();
    let (whole, frac) = cleaned.split_once('.')?;
    if frac.len() != 2 || whole.is_empty() {
        return None;
    }
    let whole: i64 = whole.parse().ok()?;
    let frac: i64 = frac.parse().ok()?;
    let cents = whole.checked_mul(100)?.checked_add(frac)?;
    Some(if negative { -cents } else { cents })
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
