//! Parse relative and absolute time phrases into timestamps
//!
//! Recognized forms:
//! - `in <N> <unit>` with unit second/minute/hour (optional trailing `s`)
//! - `at HH:MM` (24h) or `at H[:MM] am|pm`, resolved to the next occurrence
//! - `tomorrow`, `tonight`, `today`, each optionally followed by `at <clock>`
//!
//! Parsing is split from resolution so the same grammar can locate a time
//! phrase inside a longer command before the current time is known.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::character::complete::{char, digit1, multispace0, multispace1};
use nom::combinator::{all_consuming, map_res, opt, value};
use nom::error::{Error as NomError, ErrorKind};
use nom::sequence::{delimited, preceded, terminated};
use nom::{IResult, Parser};

use crate::core::error::{HeraldError, Result};
use crate::core::types::Timestamp;

/// Suggested phrasing shown when a time expression can't be understood
pub const TIME_EXPRESSION_HINT: &str =
    "Try: 'in 5 minutes', 'at 15:30', 'at 3pm', or 'tomorrow at 9:00'";

const DEFAULT_TODAY_HOUR: u32 = 17;
const DEFAULT_TONIGHT_HOUR: u32 = 20;
const DEFAULT_TOMORROW_HOUR: u32 = 9;

/// Words that can open a time phrase inside a reminder command
const TIME_MARKERS: [&str; 5] = ["in", "at", "tomorrow", "tonight", "today"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
}

impl TimeUnit {
    pub fn seconds(self) -> u64 {
        match self {
            TimeUnit::Second => 1,
            TimeUnit::Minute => 60,
            TimeUnit::Hour => 3600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayMarker {
    Today,
    Tonight,
    Tomorrow,
}

/// Clock time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

/// A syntactically valid time phrase, not yet anchored to a date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeExpression {
    /// Seconds from now
    Relative(u64),
    /// Next occurrence of a clock time
    At(ClockTime),
    /// Named day with an optional explicit clock time
    Day(DayMarker, Option<ClockTime>),
}

fn number(input: &str) -> IResult<&str, u64> {
    map_res(digit1, |digits: &str| digits.parse::<u64>()).parse(input)
}

fn unit(input: &str) -> IResult<&str, TimeUnit> {
    terminated(
        alt((
            value(TimeUnit::Second, alt((tag_no_case("second"), tag_no_case("sec")))),
            value(TimeUnit::Minute, alt((tag_no_case("minute"), tag_no_case("min")))),
            value(TimeUnit::Hour, alt((tag_no_case("hour"), tag_no_case("hr")))),
        )),
        opt(tag_no_case("s")),
    )
    .parse(input)
}

/// `<N> <unit>` as a number of seconds
fn amount(input: &str) -> IResult<&str, u64> {
    let (rest, (count, _, unit)) = (number, multispace0, unit).parse(input)?;
    Ok((rest, count.saturating_mul(unit.seconds())))
}

fn meridiem(input: &str) -> IResult<&str, Meridiem> {
    alt((
        value(
            Meridiem::Am,
            alt((tag_no_case("a.m."), tag_no_case("a.m"), tag_no_case("am"))),
        ),
        value(
            Meridiem::Pm,
            alt((tag_no_case("p.m."), tag_no_case("p.m"), tag_no_case("pm"))),
        ),
    ))
    .parse(input)
}

fn clock(input: &str) -> IResult<&str, ClockTime> {
    let (rest, hour) = number(input)?;
    let (rest, minute) = opt(preceded(char(':'), number)).parse(rest)?;
    let (rest, half) = opt(preceded(multispace0, meridiem)).parse(rest)?;

    let minute = minute.unwrap_or(0);
    let hour = match half {
        Some(_) if !(1..=12).contains(&hour) => None,
        Some(Meridiem::Am) => Some(hour % 12),
        Some(Meridiem::Pm) => Some(hour % 12 + 12),
        None if hour < 24 => Some(hour),
        None => None,
    };

    match hour {
        Some(hour) if minute < 60 => Ok((
            rest,
            ClockTime {
                hour: hour as u32,
                minute: minute as u32,
            },
        )),
        _ => Err(nom::Err::Error(NomError::new(input, ErrorKind::Verify))),
    }
}

fn relative(input: &str) -> IResult<&str, TimeExpression> {
    let (rest, secs) = preceded((tag_no_case("in"), multispace1), amount).parse(input)?;
    Ok((rest, TimeExpression::Relative(secs)))
}

fn absolute(input: &str) -> IResult<&str, TimeExpression> {
    let (rest, at) = preceded((tag_no_case("at"), multispace1), clock).parse(input)?;
    Ok((rest, TimeExpression::At(at)))
}

fn day(input: &str) -> IResult<&str, TimeExpression> {
    let (rest, marker) = alt((
        value(DayMarker::Tomorrow, tag_no_case("tomorrow")),
        value(DayMarker::Tonight, tag_no_case("tonight")),
        value(DayMarker::Today, tag_no_case("today")),
    ))
    .parse(input)?;
    let (rest, at) =
        opt(preceded((multispace1, tag_no_case("at"), multispace1), clock)).parse(rest)?;
    Ok((rest, TimeExpression::Day(marker, at)))
}

/// Parse a complete time phrase without resolving it
pub fn parse_expression(expr: &str) -> Result<TimeExpression> {
    let trimmed = expr.trim().trim_end_matches(['.', '!', '?']);
    all_consuming(delimited(multispace0, alt((relative, absolute, day)), multispace0))
        .parse(trimmed)
        .map(|(_, parsed)| parsed)
        .map_err(|_| {
            HeraldError::Parse(format!(
                "I couldn't understand the time '{}'. {}",
                expr.trim(),
                TIME_EXPRESSION_HINT
            ))
        })
}

/// Resolve a time phrase to an absolute timestamp relative to `now`
pub fn parse_time_expression(expr: &str, now: Timestamp) -> Result<Timestamp> {
    resolve(parse_expression(expr)?, now)
}

/// Anchor a parsed expression to a concrete instant
pub fn resolve(expression: TimeExpression, now: Timestamp) -> Result<Timestamp> {
    let today = now.date_naive();
    match expression {
        TimeExpression::Relative(secs) => i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|delta| now.checked_add_signed(delta))
            .ok_or_else(|| HeraldError::Parse("That duration is too long to schedule.".into())),
        TimeExpression::At(at) => {
            let candidate = local_instant(today, at)?;
            if candidate > now {
                Ok(candidate)
            } else {
                local_instant(next_day(today)?, at)
            }
        }
        TimeExpression::Day(marker, at) => {
            let (date, default_hour) = match marker {
                DayMarker::Today => (today, DEFAULT_TODAY_HOUR),
                DayMarker::Tonight => (today, DEFAULT_TONIGHT_HOUR),
                DayMarker::Tomorrow => (next_day(today)?, DEFAULT_TOMORROW_HOUR),
            };
            let at = at.unwrap_or(ClockTime {
                hour: default_hour,
                minute: 0,
            });
            local_instant(date, at)
        }
    }
}

fn next_day(date: NaiveDate) -> Result<NaiveDate> {
    date.succ_opt()
        .ok_or_else(|| HeraldError::Parse("Date is out of range.".into()))
}

fn local_instant(date: NaiveDate, at: ClockTime) -> Result<Timestamp> {
    let naive: NaiveDateTime = date
        .and_hms_opt(at.hour, at.minute, 0)
        .ok_or_else(|| HeraldError::Parse(format!("{}:{:02} is not a valid time.", at.hour, at.minute)))?;
    Local.from_local_datetime(&naive).earliest().ok_or_else(|| {
        HeraldError::Parse(format!(
            "{} does not exist in the local time zone.",
            naive.format("%Y-%m-%d %H:%M")
        ))
    })
}

/// Find a `<N> <unit>` duration anywhere in a command, in seconds
pub fn parse_duration(text: &str) -> Option<u64> {
    let mut previous: Option<char> = None;
    for (idx, ch) in text.char_indices() {
        let starts_number = ch.is_ascii_digit() && !previous.is_some_and(|p| p.is_alphanumeric());
        previous = Some(ch);
        if !starts_number {
            continue;
        }
        if let Ok((rest, secs)) = amount(&text[idx..]) {
            if !rest.starts_with(|c: char| c.is_alphanumeric()) {
                return Some(secs);
            }
        }
    }
    None
}

/// Split "call mom in 10 minutes" into ("call mom", "in 10 minutes")
///
/// Candidates are tried left to right; the first whose tail parses wins.
/// When a marker is present but no tail parses, the first marker split is
/// returned so the caller can report the unparseable phrase.
pub fn split_time_phrase(text: &str) -> Option<(String, String)> {
    let lower = text.to_ascii_lowercase();
    let mut candidates: Vec<usize> = TIME_MARKERS
        .iter()
        .flat_map(|marker| word_positions(&lower, marker))
        .collect();
    candidates.sort_unstable();
    candidates.dedup();

    let split_at = |pos: usize| {
        (
            text[..pos].trim().to_string(),
            text[pos..].trim().to_string(),
        )
    };

    candidates
        .iter()
        .copied()
        .find(|&pos| parse_expression(&text[pos..]).is_ok())
        .or_else(|| candidates.first().copied())
        .map(split_at)
}

/// Byte offsets where `word` occurs as a whole word in ASCII-lowercased text
fn word_positions(lower: &str, word: &str) -> Vec<usize> {
    lower
        .match_indices(word)
        .filter(|(pos, _)| {
            let before_ok = lower[..*pos]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            let after_ok = lower[pos + word.len()..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());
            before_ok && after_ok
        })
        .map(|(pos, _)| pos)
        .collect()
}
