use chrono::{NaiveDate, Utc};
use tracing::debug;

const OPEN_ENDED: &[&str] = &["current", "present", "now", "ongoing", ""];

const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sep", 9),
    ("sept", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

/// Parses one side of a date range. Formats are tried in order and the first
/// that yields a valid calendar date wins:
///
/// 1. `DD.MM.YYYY`
/// 2. `MM/DD/YYYY` when the first group is ≤ 12, otherwise `DD/MM/YYYY`
/// 3. `YYYY-MM-DD`
/// 4. `Month YYYY` (full or abbreviated English month name)
/// 5. bare `YYYY` in 1900–2100
///
/// Rule 2 is ambiguous for days ≤ 12 (`03/04/2020` is always March 4th).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    parse_dotted(s)
        .or_else(|| parse_slashed(s))
        .or_else(|| parse_iso(s))
        .or_else(|| parse_month_year(s))
        .or_else(|| parse_year(s))
}

fn numeric_parts(s: &str, sep: char) -> Option<(i32, i32, i32)> {
    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() < 3 {
        return None;
    }
    let a = parts[0].trim().parse().ok()?;
    let b = parts[1].trim().parse().ok()?;
    let c = parts[2].trim().parse().ok()?;
    Some((a, b, c))
}

fn ymd(year: i32, month: i32, day: i32) -> Option<NaiveDate> {
    let month = u32::try_from(month).ok()?;
    let day = u32::try_from(day).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_dotted(s: &str) -> Option<NaiveDate> {
    let (day, month, year) = numeric_parts(s, '.')?;
    ymd(year, month, day)
}

fn parse_slashed(s: &str) -> Option<NaiveDate> {
    let (first, second, year) = numeric_parts(s, '/')?;
    if first <= 12 {
        ymd(year, first, second)
    } else {
        ymd(year, second, first)
    }
}

fn parse_iso(s: &str) -> Option<NaiveDate> {
    if s.split('-').next().map(str::len) != Some(4) {
        return None;
    }
    let (year, month, day) = numeric_parts(s, '-')?;
    ymd(year, month, day)
}

fn parse_month_year(s: &str) -> Option<NaiveDate> {
    let lower = s.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    if words.len() < 2 {
        return None;
    }
    let month = MONTHS
        .iter()
        .find(|(name, _)| *name == words[0])
        .map(|(_, m)| *m)?;
    let year: i32 = words[words.len() - 1].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn parse_year(s: &str) -> Option<NaiveDate> {
    let year: i32 = s.parse().ok()?;
    if (1900..=2100).contains(&year) {
        NaiveDate::from_ymd_opt(year, 1, 1)
    } else {
        None
    }
}

/// Splits `start - end`. The spaced separator is preferred so ISO dates keep
/// their own hyphens; a bare hyphen is accepted only when it is the sole one.
fn split_range(range: &str) -> Option<(&str, &str)> {
    if let Some((start, end)) = range.split_once(" - ") {
        if !end.contains(" - ") {
            return Some((start.trim(), end.trim()));
        }
        return None;
    }
    if range.matches('-').count() == 1 {
        return range.split_once('-').map(|(s, e)| (s.trim(), e.trim()));
    }
    None
}

/// True when the range has a start and an open end (`current`, `present`, ...).
pub fn is_open_ended(range: &str) -> bool {
    match split_range(range.trim()) {
        Some((start, end)) => !start.is_empty() && OPEN_ENDED.contains(&end.to_lowercase().as_str()),
        None => false,
    }
}

/// Years elapsed for a `start - end` range, as of today.
pub fn tenure_years(range: &str) -> f64 {
    tenure_years_at(range, Utc::now().date_naive())
}

/// Years elapsed for a `start - end` range, measured against `today` for open
/// or unparsable ends. Never negative; malformed input yields 0.
pub fn tenure_years_at(range: &str, today: NaiveDate) -> f64 {
    let range = range.trim();
    if range.is_empty() {
        return 0.0;
    }
    let Some((start, end)) = split_range(range) else {
        debug!(range, "Unrecognized date range, tenure is zero");
        return 0.0;
    };
    let Some(start) = parse_date(start) else {
        debug!(range, "Unparsable start date, tenure is zero");
        return 0.0;
    };

    let end = if OPEN_ENDED.contains(&end.to_lowercase().as_str()) {
        today
    } else {
        parse_date(end).unwrap_or_else(|| {
            debug!(range, "Unparsable end date, treating as ongoing");
            today
        })
    };

    let days = (end - start).num_days() as f64;
    (days / 365.25).max(0.0)
}
