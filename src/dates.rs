//! Reporting windows, date parsing, and time segmentation.
//!
//! Every preset takes the reference day as an argument instead of reading the
//! clock, so range arithmetic stays testable; only the binary passes
//! `Local::now()` in.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::constants::dates::{LAST_30_DAYS_SPAN, SUPPORTED_DATE_FORMATS};
use crate::errors::ReportError;

/// Granularity of the time bucket column, one per `segments.*` field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSegment {
    /// Daily buckets, `YYYY-MM-DD`.
    #[default]
    Date,
    /// Weekly buckets, keyed by the Monday of the week.
    Week,
    /// Monthly buckets, keyed by the first of the month.
    Month,
    /// Quarterly buckets, keyed by the first day of the quarter.
    Quarter,
    /// Yearly buckets, plain year numbers.
    Year,
}

impl TimeSegment {
    /// Canonical lowercase name, as shown in prompts and review output.
    pub fn label(self) -> &'static str {
        match self {
            TimeSegment::Date => "date",
            TimeSegment::Week => "week",
            TimeSegment::Month => "month",
            TimeSegment::Quarter => "quarter",
            TimeSegment::Year => "year",
        }
    }

    /// Source field selected for this granularity.
    pub fn field_path(self) -> &'static str {
        match self {
            TimeSegment::Date => "segments.date",
            TimeSegment::Week => "segments.week",
            TimeSegment::Month => "segments.month",
            TimeSegment::Quarter => "segments.quarter",
            TimeSegment::Year => "segments.year",
        }
    }

    /// Resolve a user-supplied segmentation alias.
    ///
    /// # Examples
    ///
    /// ```
    /// use adreport::dates::TimeSegment;
    ///
    /// assert_eq!(TimeSegment::from_alias("daily"), Some(TimeSegment::Date));
    /// assert_eq!(TimeSegment::from_alias("QUARTERLY"), Some(TimeSegment::Quarter));
    /// assert_eq!(TimeSegment::from_alias("fortnight"), None);
    /// ```
    pub fn from_alias(alias: &str) -> Option<TimeSegment> {
        match alias.trim().to_ascii_lowercase().as_str() {
            "day" | "date" | "daily" => Some(TimeSegment::Date),
            "week" | "weekly" => Some(TimeSegment::Week),
            "month" | "monthly" => Some(TimeSegment::Month),
            "quarter" | "quarterly" => Some(TimeSegment::Quarter),
            "year" | "yearly" => Some(TimeSegment::Year),
            _ => None,
        }
    }
}

impl fmt::Display for TimeSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive reporting window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    /// First reported day.
    pub start: NaiveDate,
    /// Last reported day.
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if start > end {
            return Err(ReportError::InvalidArgument(format!(
                "start date {start} is later than end date {end}"
            )));
        }
        Ok(DateRange { start, end })
    }

    /// One-day window.
    pub fn single(day: NaiveDate) -> Self {
        DateRange {
            start: day,
            end: day,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Parse a date in any supported input format.
///
/// # Examples
///
/// ```
/// use adreport::dates::parse_supported_date;
///
/// let a = parse_supported_date("2025-03-14").unwrap();
/// let b = parse_supported_date("20250314").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn parse_supported_date(input: &str) -> Result<NaiveDate, ReportError> {
    let trimmed = input.trim();
    for format in SUPPORTED_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    Err(ReportError::InvalidDate {
        input: input.to_string(),
    })
}

/// Rolling window of the trailing thirty days, ending yesterday.
pub fn last_30_days(today: NaiveDate) -> (DateRange, TimeSegment) {
    let range = DateRange {
        start: today - Duration::days(LAST_30_DAYS_SPAN),
        end: today - Duration::days(1),
    };
    (range, TimeSegment::Date)
}

/// The previous calendar month, at month granularity.
pub fn last_calendar_month(today: NaiveDate) -> Result<(DateRange, TimeSegment), ReportError> {
    let first_of_this_month = first_of_month(today.year(), today.month())?;
    let end = first_of_this_month - Duration::days(1);
    let start = first_of_month(end.year(), end.month())?;
    Ok((DateRange { start, end }, TimeSegment::Month))
}

/// Calendar bounds of a `(year, quarter)` pair; `quarter` runs 1 through 4.
pub fn quarter_bounds(year: i32, quarter: u32) -> Result<DateRange, ReportError> {
    let (start_month, end_month, end_day) = match quarter {
        1 => (1, 3, 31),
        2 => (4, 6, 30),
        3 => (7, 9, 30),
        4 => (10, 12, 31),
        other => {
            return Err(ReportError::InvalidArgument(format!(
                "quarter must be between 1 and 4, got {other}"
            )))
        }
    };
    Ok(DateRange {
        start: calendar_date(year, start_month, 1)?,
        end: calendar_date(year, end_month, end_day)?,
    })
}

/// The running quarter, from its first day through yesterday.
///
/// Errors on the first day of a quarter, when no completed day exists yet.
pub fn current_quarter_to_date(today: NaiveDate) -> Result<(DateRange, TimeSegment), ReportError> {
    let quarter = today.month0() / 3 + 1;
    let bounds = quarter_bounds(today.year(), quarter)?;
    let range = DateRange::new(bounds.start, today - Duration::days(1))?;
    Ok((range, TimeSegment::Quarter))
}

/// The most recently completed calendar quarter.
pub fn previous_calendar_quarter(
    today: NaiveDate,
) -> Result<(DateRange, TimeSegment), ReportError> {
    let current = today.month0() / 3 + 1;
    let (year, quarter) = if current == 1 {
        (today.year() - 1, 4)
    } else {
        (today.year(), current - 1)
    };
    Ok((quarter_bounds(year, quarter)?, TimeSegment::Quarter))
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, ReportError> {
    calendar_date(year, month, 1)
}

fn calendar_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, ReportError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ReportError::InvalidArgument(format!("no calendar date {year}-{month:02}-{day:02}"))
    })
}
