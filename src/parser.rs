//! # Time Expression Parser
//!
//! Converts the raw argument text of the `in` and `at` commands into an
//! exact delivery target plus the message to deliver.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Hand-written scanners with tagged result types instead of
//!   positional capture groups
//! - 1.0.0: Initial grammar for relative durations and absolute instants
//!
//! Two independent grammars, selected by the command that invoked them:
//!
//! - [`parse_in`] accepts a duration (`1d 2h 3m 4s`, components optional
//!   below the first, strictly descending) followed by a message;
//! - [`parse_at`] accepts `YYYY-MM-DD HH:MM[:SS]`, `HH:MM[:SS] YYYY-MM-DD`,
//!   `HH:MM[:SS]`, or `YYYY-MM-DD`, followed by a message, resolved against
//!   a reference "now" already localized in the requester's timezone.
//!
//! In both grammars the trailing message is mandatory. When the greedy read
//! of an optional component leaves no message behind, the component is given
//! back and re-read as message text, so `"2m 5s"` is two minutes with the
//! message `"5s"` while `"2m "` is an error.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike};
use chrono_tz::Tz;

use crate::error::ParseError;

// ============================================================================
// Relative ("in") grammar
// ============================================================================

/// A parsed relative duration, one field per grammar component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DurationSpec {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl DurationSpec {
    pub fn total_seconds(&self) -> i64 {
        i64::from(self.days) * 86_400
            + i64::from(self.hours) * 3_600
            + i64::from(self.minutes) * 60
            + i64::from(self.seconds)
    }
}

/// Duration component units, most significant first. Components must appear
/// in strictly descending significance, so the first unit selects the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Unit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl Unit {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'd' => Some(Unit::Days),
            'h' => Some(Unit::Hours),
            'm' => Some(Unit::Minutes),
            's' => Some(Unit::Seconds),
            _ => None,
        }
    }
}

/// Parse the `in` command arguments: a duration followed by a message.
///
/// Returns the duration and the message tail, or a [`ParseError`] when the
/// input matches no shape or carries no message.
pub fn parse_in(args: &str) -> Result<(DurationSpec, &str), ParseError> {
    let unrecognized = || ParseError::UnrecognizedExpression(args.to_string());

    // the first component is mandatory and selects the shape
    let (first_unit, first_value, mut pos) = scan_component(args, 0).ok_or_else(unrecognized)?;
    let mut components = vec![(first_unit, first_value, 0usize)];

    // collect the optional trailing components greedily: strictly descending
    // units, separated by at most one whitespace character
    loop {
        let sep_start = pos;
        let mut lookahead = pos;
        if let Some(c) = args[lookahead..].chars().next() {
            if c.is_whitespace() {
                lookahead += c.len_utf8();
            }
        }
        let last_unit = match components.last() {
            Some(&(unit, _, _)) => unit,
            None => break,
        };
        match scan_component(args, lookahead) {
            Some((unit, value, next)) if unit > last_unit => {
                components.push((unit, value, sep_start));
                pos = next;
            }
            _ => break,
        }
    }

    // the message is whatever follows at least one whitespace character;
    // give back trailing optional components until one is found
    loop {
        if let Some(message) = split_message(&args[pos..]) {
            let mut spec = DurationSpec::default();
            for (unit, value, _) in components {
                match unit {
                    Unit::Days => spec.days = value,
                    Unit::Hours => spec.hours = value,
                    Unit::Minutes => spec.minutes = value,
                    Unit::Seconds => spec.seconds = value,
                }
            }
            return Ok((spec, message));
        }
        match components.pop() {
            Some((_, _, sep_start)) if !components.is_empty() => pos = sep_start,
            _ => return Err(unrecognized()),
        }
    }
}

/// Scan one `<digits><unit>` component at `pos`.
fn scan_component(s: &str, pos: usize) -> Option<(Unit, u32, usize)> {
    let rest = s.get(pos..)?;
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let value: u32 = rest[..digits_end].parse().ok()?;
    let unit = Unit::from_char(rest[digits_end..].chars().next()?)?;
    Some((unit, value, pos + digits_end + 1))
}

/// Split off the mandatory message: one or more whitespace characters, then
/// non-empty text (kept verbatim, trailing whitespace included).
fn split_message(rest: &str) -> Option<&str> {
    let first = rest.chars().next()?;
    if !first.is_whitespace() {
        return None;
    }
    let message = rest.trim_start();
    (!message.is_empty()).then_some(message)
}

// ============================================================================
// Absolute ("at") grammar
// ============================================================================

/// Unvalidated date fields as written by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawDate {
    year: i32,
    month: u32,
    day: u32,
}

impl From<NaiveDate> for RawDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

/// Unvalidated time fields as written by the user. Missing seconds are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawTime {
    hour: u32,
    minute: u32,
    second: u32,
}

impl From<NaiveTime> for RawTime {
    fn from(time: NaiveTime) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
            second: time.second(),
        }
    }
}

/// Shape of an absolute expression. Shape exclusivity is explicit in the
/// type rather than implicit in pattern alternation order; only the
/// time-only shape may roll forward to the next day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AtExpr {
    DateAndTime { date: RawDate, time: RawTime },
    TimeOnly(RawTime),
    DateOnly(RawDate),
}

/// Parse the `at` command arguments against a reference instant already
/// localized in the requester's timezone.
///
/// A time-only expression at or before `now` means the next occurrence of
/// that time, exactly one day later. Any other expression at or before `now`
/// is an error: past instants are never auto-corrected.
pub fn parse_at<'a>(
    args: &'a str,
    now: DateTime<Tz>,
) -> Result<(DateTime<Tz>, &'a str), ParseError> {
    let (expr, message) = try_date_and_time(args)
        .or_else(|| try_time_then_date(args))
        .or_else(|| try_time_only(args))
        .or_else(|| try_date_only(args))
        .ok_or_else(|| ParseError::UnrecognizedExpression(args.to_string()))?;

    let time_only = matches!(expr, AtExpr::TimeOnly(_));
    let (raw_date, raw_time) = match expr {
        AtExpr::DateAndTime { date, time } => (date, time),
        // time only: combine with today's date in the reference timezone
        AtExpr::TimeOnly(time) => (RawDate::from(now.date_naive()), time),
        // date only: combine with the reference instant's time of day
        AtExpr::DateOnly(date) => (date, RawTime::from(now.time())),
    };

    let invalid = || ParseError::InvalidCalendar {
        date: format!(
            "{:04}-{:02}-{:02}",
            raw_date.year, raw_date.month, raw_date.day
        ),
        time: format!(
            "{:02}:{:02}:{:02}",
            raw_time.hour, raw_time.minute, raw_time.second
        ),
    };

    let date =
        NaiveDate::from_ymd_opt(raw_date.year, raw_date.month, raw_date.day).ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_opt(raw_time.hour, raw_time.minute, raw_time.second)
        .ok_or_else(invalid)?;
    let requested = now
        .timezone()
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .ok_or_else(invalid)?;

    if requested <= now {
        if time_only {
            // next occurrence of that time of day
            return Ok((requested + Duration::days(1), message));
        }
        return Err(ParseError::NotInFuture);
    }

    Ok((requested, message))
}

/// `YYYY-MM-DD HH:MM[:SS] <message>`
fn try_date_and_time(args: &str) -> Option<(AtExpr, &str)> {
    let (date, pos) = scan_date(args, 0)?;
    let pos = expect_char(args, pos, ' ')?;
    // seconds are read greedily, then given back if no message follows
    for with_seconds in [true, false] {
        if let Some((time, end)) = scan_time(args, pos, with_seconds) {
            if let Some(message) = split_message(&args[end..]) {
                return Some((AtExpr::DateAndTime { date, time }, message));
            }
        }
    }
    None
}

/// `HH:MM[:SS] YYYY-MM-DD <message>`
fn try_time_then_date(args: &str) -> Option<(AtExpr, &str)> {
    for with_seconds in [true, false] {
        if let Some((time, pos)) = scan_time(args, 0, with_seconds) {
            if let Some(pos) = expect_char(args, pos, ' ') {
                if let Some((date, end)) = scan_date(args, pos) {
                    if let Some(message) = split_message(&args[end..]) {
                        return Some((AtExpr::DateAndTime { date, time }, message));
                    }
                }
            }
        }
    }
    None
}

/// `HH:MM[:SS] <message>`
fn try_time_only(args: &str) -> Option<(AtExpr, &str)> {
    for with_seconds in [true, false] {
        if let Some((time, end)) = scan_time(args, 0, with_seconds) {
            if let Some(message) = split_message(&args[end..]) {
                return Some((AtExpr::TimeOnly(time), message));
            }
        }
    }
    None
}

/// `YYYY-MM-DD <message>`
fn try_date_only(args: &str) -> Option<(AtExpr, &str)> {
    let (date, end) = scan_date(args, 0)?;
    let message = split_message(&args[end..])?;
    Some((AtExpr::DateOnly(date), message))
}

/// Scan exactly `count` ASCII digits at `pos`.
fn scan_digits(s: &str, pos: usize, count: usize) -> Option<(u32, usize)> {
    let end = pos.checked_add(count)?;
    let digits = s.get(pos..end)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((digits.parse().ok()?, end))
}

fn expect_char(s: &str, pos: usize, expected: char) -> Option<usize> {
    let c = s.get(pos..)?.chars().next()?;
    (c == expected).then(|| pos + expected.len_utf8())
}

/// Scan `HH:MM:SS` (when `with_seconds`) or `HH:MM` at `pos`. Two digits per
/// field, no more, no fewer.
fn scan_time(s: &str, pos: usize, with_seconds: bool) -> Option<(RawTime, usize)> {
    let (hour, pos) = scan_digits(s, pos, 2)?;
    let pos = expect_char(s, pos, ':')?;
    let (minute, pos) = scan_digits(s, pos, 2)?;
    if !with_seconds {
        return Some((RawTime { hour, minute, second: 0 }, pos));
    }
    let pos = expect_char(s, pos, ':')?;
    let (second, pos) = scan_digits(s, pos, 2)?;
    Some((RawTime { hour, minute, second }, pos))
}

/// Scan `YYYY-MM-DD` at `pos`. Syntactic only; calendar validity is checked
/// at resolution time.
fn scan_date(s: &str, pos: usize) -> Option<(RawDate, usize)> {
    let (year, pos) = scan_digits(s, pos, 4)?;
    let pos = expect_char(s, pos, '-')?;
    let (month, pos) = scan_digits(s, pos, 2)?;
    let pos = expect_char(s, pos, '-')?;
    let (day, pos) = scan_digits(s, pos, 2)?;
    Some((
        RawDate {
            year: year as i32,
            month,
            day,
        },
        pos,
    ))
}
