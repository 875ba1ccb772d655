//! Time-range selection and its mapping to gateway query parameters.
//!
//! Presets resolve to concrete dates relative to a caller-supplied "today",
//! so the mapping stays deterministic under test.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::CoreError;

/// Date format used by every date-valued query parameter.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Separator accepted between the two dates of a custom range string.
const CUSTOM_SEPARATOR: &str = "..";

/// An inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// `startDate` / `endDate` query parameters.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("startDate", self.start.format(DATE_FORMAT).to_string()),
            ("endDate", self.end.format(DATE_FORMAT).to_string()),
        ]
    }
}

/// The reviewer's time-range selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeRange {
    #[default]
    Daily,
    Yesterday,
    Weekly,
    Monthly,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl TimeRange {
    /// Build a custom range. Both ends are inclusive and `start <= end`.
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::Validation(format!(
                "Start date {} is after end date {}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            )));
        }
        Ok(Self::Custom { start, end })
    }

    /// Value of the `timeRange` query parameter.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Yesterday => "yesterday",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Custom { .. } => "custom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Today",
            Self::Yesterday => "Yesterday",
            Self::Weekly => "This Week",
            Self::Monthly => "This Month",
            Self::Custom { .. } => "Select Range",
        }
    }

    /// Resolve to concrete dates. Weeks start on Monday.
    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        match *self {
            Self::Daily => DateRange {
                start: today,
                end: today,
            },
            Self::Yesterday => {
                let yesterday = today - Duration::days(1);
                DateRange {
                    start: yesterday,
                    end: yesterday,
                }
            }
            Self::Weekly => DateRange {
                start: today - Duration::days(i64::from(today.weekday().num_days_from_monday())),
                end: today,
            },
            Self::Monthly => DateRange {
                start: today.with_day(1).unwrap_or(today),
                end: today,
            },
            Self::Custom { start, end } => DateRange { start, end },
        }
    }

    /// Query parameters for the dashboard overview endpoint.
    ///
    /// Presets send only `timeRange`; the server resolves the window.
    /// Custom ranges also send `startDate` and `endDate`.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("timeRange", self.key().to_string())];
        if let Self::Custom { start, end } = *self {
            params.extend(DateRange { start, end }.query_params());
        }
        params
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { start, end } => write!(
                f,
                "{}{CUSTOM_SEPARATOR}{}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            ),
            other => f.write_str(other.key()),
        }
    }
}

/// Parses a preset key (`daily`, `yesterday`, `weekly`, `monthly`) or a
/// custom range written as `YYYY-MM-DD..YYYY-MM-DD`.
impl FromStr for TimeRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "daily" | "today" => Ok(Self::Daily),
            "yesterday" => Ok(Self::Yesterday),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => {
                let (start, end) = other.split_once(CUSTOM_SEPARATOR).ok_or_else(|| {
                    CoreError::Validation(format!(
                        "Invalid time range '{other}'. Must be one of: daily, yesterday, \
                         weekly, monthly, or START..END"
                    ))
                })?;
                Self::custom(parse_date(start)?, parse_date(end)?)
            }
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        CoreError::Validation(format!("Invalid date '{value}'. Expected YYYY-MM-DD"))
    })
}
