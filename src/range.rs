//! Optional history range attached to the display preferences.

use chrono::{DateTime, NaiveDate, Utc};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Optional start/end instants a user picked for history views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn label(&self) -> String {
        match (self.start, self.end) {
            (None, None) => "all".to_string(),
            (Some(start), None) => format!("since {}", start.format(DAY_FORMAT)),
            (None, Some(end)) => format!("until {}", end.format(DAY_FORMAT)),
            (Some(start), Some(end)) => {
                format!("{} to {}", start.format(DAY_FORMAT), end.format(DAY_FORMAT))
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RangeError {
    #[error("invalid instant {0:?}; expected RFC 3339 or YYYY-MM-DD")]
    InvalidInstant(String),
    #[error("range start must not be after range end")]
    Inverted,
}

/// Parse an RFC 3339 timestamp, or a bare date taken as midnight UTC.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, RangeError> {
    let trimmed = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, DAY_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| RangeError::InvalidInstant(raw.to_string()))
}

pub fn validate_range(range: DateRange) -> Result<DateRange, RangeError> {
    if let (Some(start), Some(end)) = (range.start, range.end) {
        if start > end {
            return Err(RangeError::Inverted);
        }
    }
    Ok(range)
}

pub fn build_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange, RangeError> {
    let range = DateRange {
        start: start.map(parse_instant).transpose()?,
        end: end.map(parse_instant).transpose()?,
    };
    validate_range(range)
}
