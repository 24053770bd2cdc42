//! Relative date phrases ("in 1 month", "next friday", "march 3").
//!
//! Phrases are resolved against a base date and prefer the future: a bare
//! month name that already passed this year means next year's, a bare
//! weekday means the next one on or after the base.
//!
//! | Phrase | Result |
//! |---|---|
//! | `today`, `now` | base |
//! | `tomorrow`, `yesterday` | base ± 1 day |
//! | `2025-02-01` | that date |
//! | `in N <unit>`, `N <unit> from now`, `N <unit> later` | base + N units |
//! | `N <unit> ago` | base − N units |
//! | `next <unit>` | base + 1 unit |
//! | `<month> [day]`, `[day] <month>` | that day in the base year, else next year |
//! | `<weekday>` / `next <weekday>` | next occurrence, on or strictly after base |
//!
//! Units are `day`, `week`, `fortnight`, `month`, `year` (plurals allowed).
//! `N` is a positive integer, `a`/`an`, or a number word up to `twelve`.
//! Month arithmetic clamps to the end of shorter months.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("Unrecognized date phrase: {0:?}")]
    Unrecognized(String),
    #[error("Date phrase {0:?} resolves outside the supported range")]
    OutOfRange(String),
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// English month name for `month` in 1..=12.
pub fn month_name(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some(next.signed_duration_since(first).num_days() as u32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Day,
    Week,
    Fortnight,
    Month,
    Year,
}

fn parse_unit(token: &str) -> Option<Unit> {
    let singular = token.strip_suffix('s').unwrap_or(token);
    match singular {
        "day" => Some(Unit::Day),
        "week" => Some(Unit::Week),
        "fortnight" => Some(Unit::Fortnight),
        "month" => Some(Unit::Month),
        "year" => Some(Unit::Year),
        _ => None,
    }
}

fn parse_count(token: &str) -> Option<u32> {
    let n = match token {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => token.parse().ok()?,
    };
    (n > 0).then_some(n)
}

fn parse_month(token: &str) -> Option<u32> {
    if token.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|name| {
            let name = name.to_ascii_lowercase();
            name == token || (token.len() <= 4 && name.starts_with(token))
        })
        .map(|i| i as u32 + 1)
}

fn parse_weekday(token: &str) -> Option<Weekday> {
    const NAMES: [(&str, Weekday); 7] = [
        ("monday", Weekday::Mon),
        ("tuesday", Weekday::Tue),
        ("wednesday", Weekday::Wed),
        ("thursday", Weekday::Thu),
        ("friday", Weekday::Fri),
        ("saturday", Weekday::Sat),
        ("sunday", Weekday::Sun),
    ];
    NAMES
        .iter()
        .find(|(name, _)| *name == token || (token.len() == 3 && name.starts_with(token)))
        .map(|(_, day)| *day)
}

/// Day of month, with an optional ordinal suffix ("3", "3rd").
fn parse_day(token: &str) -> Option<u32> {
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| token.strip_suffix(suffix))
        .unwrap_or(token);
    let day: u32 = digits.parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

fn shift(base: NaiveDate, count: u32, unit: Unit, forward: bool) -> Option<NaiveDate> {
    let days = |n: u64| {
        if forward {
            base.checked_add_days(Days::new(n))
        } else {
            base.checked_sub_days(Days::new(n))
        }
    };
    let months = |n: u32| {
        if forward {
            base.checked_add_months(Months::new(n))
        } else {
            base.checked_sub_months(Months::new(n))
        }
    };
    let count64 = u64::from(count);
    match unit {
        Unit::Day => days(count64),
        Unit::Week => days(count64 * 7),
        Unit::Fortnight => days(count64 * 14),
        Unit::Month => months(count),
        Unit::Year => months(count.checked_mul(12)?),
    }
}

fn next_weekday(base: NaiveDate, target: Weekday, strictly_after: bool) -> Option<NaiveDate> {
    let from = base.weekday().num_days_from_monday();
    let to = target.num_days_from_monday();
    let mut ahead = (to + 7 - from) % 7;
    if ahead == 0 && strictly_after {
        ahead = 7;
    }
    base.checked_add_days(Days::new(u64::from(ahead)))
}

/// The next `month`/`day` on or after `base`.
fn upcoming(base: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(base.year(), month, day);
    match this_year {
        Some(date) if date >= base => Some(date),
        _ => NaiveDate::from_ymd_opt(base.year().checked_add(1)?, month, day),
    }
}

enum Resolved {
    Date(Option<NaiveDate>),
    NoMatch,
}

fn resolve(tokens: &[&str], base: NaiveDate) -> Resolved {
    use Resolved::{Date, NoMatch};

    match tokens {
        ["today"] | ["now"] => Date(Some(base)),
        ["tomorrow"] => Date(base.succ_opt()),
        ["yesterday"] => Date(base.pred_opt()),
        [iso] if NaiveDate::parse_from_str(iso, "%Y-%m-%d").is_ok() => {
            Date(NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok())
        }
        ["in", n, unit] | [n, unit, "from", "now"] | [n, unit, "later"] => {
            match (parse_count(n), parse_unit(unit)) {
                (Some(n), Some(unit)) => Date(shift(base, n, unit, true)),
                _ => NoMatch,
            }
        }
        [n, unit, "ago"] => match (parse_count(n), parse_unit(unit)) {
            (Some(n), Some(unit)) => Date(shift(base, n, unit, false)),
            _ => NoMatch,
        },
        ["next", word] => {
            if let Some(unit) = parse_unit(word) {
                Date(shift(base, 1, unit, true))
            } else if let Some(day) = parse_weekday(word) {
                Date(next_weekday(base, day, true))
            } else {
                NoMatch
            }
        }
        [word] => {
            if let Some(day) = parse_weekday(word) {
                Date(next_weekday(base, day, false))
            } else if let Some(month) = parse_month(word) {
                Date(upcoming(base, month, 1))
            } else {
                NoMatch
            }
        }
        [a, b] => match (parse_month(a), parse_day(b), parse_day(a), parse_month(b)) {
            (Some(month), Some(day), _, _) | (_, _, Some(day), Some(month)) => {
                Date(upcoming(base, month, day))
            }
            _ => NoMatch,
        },
        _ => NoMatch,
    }
}

/// Resolve `phrase` relative to `base`. See the [module docs](self).
pub fn parse_relative(phrase: &str, base: NaiveDate) -> Result<NaiveDate, DateParseError> {
    let normalized = phrase.to_lowercase().replace(',', " ");
    let tokens: Vec<&str> = normalized.split_whitespace().collect();

    match resolve(&tokens, base) {
        Resolved::Date(Some(date)) => Ok(date),
        Resolved::Date(None) => Err(DateParseError::OutOfRange(phrase.to_string())),
        Resolved::NoMatch => Err(DateParseError::Unrecognized(phrase.to_string())),
    }
}
