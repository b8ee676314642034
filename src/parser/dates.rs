use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};

use crate::error::DateParseError;

const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

#[derive(Debug, Clone, Copy)]
enum Shape {
    Iso,
    MonthDayYear,
    DayMonthYear,
    Numeric,
}

/// Explicit shapes, in priority order for matches starting at the same offset.
static EXPLICIT: LazyLock<Vec<(Shape, Regex)>> = LazyLock::new(|| {
    vec![
        (Shape::Iso, Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})(?:T|\b)").unwrap()),
        (
            Shape::MonthDayYear,
            Regex::new(&format!(r"(?i)\b{MONTH}\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})\b")).unwrap(),
        ),
        (
            Shape::DayMonthYear,
            Regex::new(&format!(r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+{MONTH}\.?,?\s+(\d{{4}})\b")).unwrap(),
        ),
        (Shape::Numeric, Regex::new(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{4})\b").unwrap()),
    ]
});

static TWO_DIGIT_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2}\b").unwrap());
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\s,]*T?(?:at\s+|@\s*)?(\d{1,2})(?::(\d{2}))?(?::(\d{2}))?\s*(?:([ap])\.?\s?m\b\.?)?").unwrap()
});
static LEADING_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\w]*(?:[A-Za-z][A-Za-z ]{0,30}:)?\s*").unwrap());

/// Formats tried by the permissive fallback, against leading word prefixes.
const FALLBACK_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%b-%d-%Y",
    "%Y %B %d",
    "%Y %b %d",
    "%A %B %d %Y",
    "%a %b %d %Y",
];
const FALLBACK_MAX_WORDS: usize = 6;
const PLAUSIBLE_YEARS: std::ops::RangeInclusive<i32> = 1900..=2100;

/// Which end of a window a date marks. Decides the time used when the source
/// text carries none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Open,
    Close,
}

impl Boundary {
    fn default_time(self) -> NaiveTime {
        match self {
            Boundary::Open => NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            Boundary::Close => NaiveTime::from_hms_opt(23, 59, 59).unwrap(),
        }
    }
}

/// Parse the first date found in `candidate`.
pub fn normalize(candidate: &str, boundary: Boundary) -> Result<NaiveDateTime, DateParseError> {
    if let Some((date, end)) = find_explicit(candidate) {
        let date = date?;
        let time = time_after(&candidate[end..]).unwrap_or_else(|| boundary.default_time());
        return Ok(date.and_time(time));
    }
    if TWO_DIGIT_YEAR_RE.is_match(candidate) {
        return Err(DateParseError::TwoDigitYear(candidate.trim().to_string()));
    }
    permissive(candidate).map(|date| date.and_time(boundary.default_time()))
}

/// Earliest explicit match in the candidate, with the byte offset where it ends.
fn find_explicit(candidate: &str) -> Option<(Result<NaiveDate, DateParseError>, usize)> {
    let mut best: Option<(usize, Shape, Captures)> = None;
    for (shape, re) in EXPLICIT.iter() {
        if let Some(caps) = re.captures(candidate) {
            let start = caps.get(0).map(|m| m.start()).unwrap_or(usize::MAX);
            if best.as_ref().map_or(true, |(s, _, _)| start < *s) {
                best = Some((start, *shape, caps));
            }
        }
    }

    let (_, shape, caps) = best?;
    let whole = caps.get(0)?;
    let raw = whole.as_str();
    let date = ymd(shape, &caps)
        .and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .filter(|d| PLAUSIBLE_YEARS.contains(&d.year()))
        .ok_or_else(|| DateParseError::Invalid(raw.to_string()));
    Some((date, whole.end()))
}

fn ymd(shape: Shape, caps: &Captures) -> Option<(i32, u32, u32)> {
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    match shape {
        Shape::Iso => Some((num(1)? as i32, num(2)?, num(3)?)),
        Shape::MonthDayYear => Some((num(3)? as i32, month_number(&caps[1])?, num(2)?)),
        Shape::DayMonthYear => Some((num(3)? as i32, month_number(&caps[2])?, num(1)?)),
        Shape::Numeric => Some((num(3)? as i32, num(1)?, num(2)?)),
    }
}

fn month_number(name: &str) -> Option<u32> {
    const ABBR: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun",
        "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let lower = name.to_ascii_lowercase();
    let prefix = lower.get(..3)?;
    ABBR.iter().position(|m| *m == prefix).map(|i| i as u32 + 1)
}

/// Time of day directly after a date, e.g. ", 5:00 PM", " at 17:30" or the
/// `T10:00:00` of an ISO date-time.
fn time_after(rest: &str) -> Option<NaiveTime> {
    let caps = TIME_RE.captures(rest)?;
    let minutes = caps.get(2);
    let meridiem = caps.get(4).map(|m| m.as_str().to_ascii_lowercase());
    if minutes.is_none() && meridiem.is_none() {
        return None;
    }

    let mut hour: u32 = caps[1].parse().ok()?;
    let min: u32 = minutes.map_or(Some(0), |m| m.as_str().parse().ok())?;
    let sec: u32 = caps.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?;
    match meridiem.as_deref() {
        Some("p") if hour < 12 => hour += 12,
        Some("a") if hour == 12 => hour = 0,
        Some(_) if hour > 12 => return None,
        _ => {}
    }
    NaiveTime::from_hms_opt(hour, min, sec)
}

fn permissive(candidate: &str) -> Result<NaiveDate, DateParseError> {
    let stripped = LEADING_LABEL_RE.replace(candidate, "");
    let words: Vec<&str> = stripped
        .split_whitespace()
        .take(FALLBACK_MAX_WORDS)
        .map(|w| w.trim_end_matches([',', ';', '.']))
        .collect();

    for n in (1..=words.len()).rev() {
        let phrase = words[..n].join(" ");
        for fmt in FALLBACK_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(&phrase, fmt) {
                if PLAUSIBLE_YEARS.contains(&date.year()) {
                    return Ok(date);
                }
                return Err(DateParseError::Invalid(phrase));
            }
        }
    }
    Err(DateParseError::NoMatch(candidate.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn month_name_open_date_starts_the_day() {
        let dt = normalize("Posted: January 15, 2024", Boundary::Open).unwrap();
        assert_eq!(dt, at("2024-01-15T00:00:00"));
    }

    #[test]
    fn numeric_close_date_ends_the_day() {
        let dt = normalize("Deadline: 12/31/2024", Boundary::Close).unwrap();
        assert_eq!(dt, at("2024-12-31T23:59:59"));
    }

    #[test]
    fn iso_date() {
        let dt = normalize(" 2024-03-05 (estimated)", Boundary::Open).unwrap();
        assert_eq!(dt, at("2024-03-05T00:00:00"));
    }

    #[test]
    fn day_month_year() {
        let dt = normalize("due 2nd Sept. 2024", Boundary::Close).unwrap();
        assert_eq!(dt, at("2024-09-02T23:59:59"));
    }

    #[test]
    fn abbreviated_month_with_period() {
        let dt = normalize("Close Date: Dec. 31, 2024", Boundary::Close).unwrap();
        assert_eq!(dt, at("2024-12-31T23:59:59"));
    }

    #[test]
    fn explicit_time_is_kept() {
        let dt = normalize("Deadline: March 1, 2025, 5:00 PM ET", Boundary::Close).unwrap();
        assert_eq!(dt, at("2025-03-01T17:00:00"));

        let dt = normalize("Opens 2025-02-01 at 09:30", Boundary::Open).unwrap();
        assert_eq!(dt, at("2025-02-01T09:30:00"));
    }

    #[test]
    fn iso_date_time() {
        let dt = normalize("Posted: 2024-01-15T10:00:00", Boundary::Open).unwrap();
        assert_eq!(dt, at("2024-01-15T10:00:00"));

        let dt = normalize("2024-12-31T17:30:00Z", Boundary::Close).unwrap();
        assert_eq!(dt, at("2024-12-31T17:30:00"));

        let dt = normalize("2024-01-15 10:00", Boundary::Open).unwrap();
        assert_eq!(dt, at("2024-01-15T10:00:00"));
    }

    #[test]
    fn earliest_explicit_match_wins() {
        let dt = normalize("01/15/2024 (archived 2024-06-01)", Boundary::Open).unwrap();
        assert_eq!(dt, at("2024-01-15T00:00:00"));
    }

    #[test]
    fn two_digit_year_rejected() {
        let err = normalize("Due: 12/31/24", Boundary::Close).unwrap_err();
        assert!(matches!(err, DateParseError::TwoDigitYear(_)));
    }

    #[test]
    fn impossible_calendar_date_rejected() {
        let err = normalize("02/30/2024", Boundary::Close).unwrap_err();
        assert!(matches!(err, DateParseError::Invalid(_)));
    }

    #[test]
    fn fallback_formats() {
        let dt = normalize("Release: 2024/07/04", Boundary::Open).unwrap();
        assert_eq!(dt, at("2024-07-04T00:00:00"));

        let dt = normalize(": 15-Jan-2024 noon", Boundary::Open).unwrap();
        assert_eq!(dt, at("2024-01-15T00:00:00"));
    }

    #[test]
    fn no_date_at_all() {
        let err = normalize("Posted: to be announced", Boundary::Open).unwrap_err();
        assert!(matches!(err, DateParseError::NoMatch(_)));
    }
}
