// Copyright (c) 2025 - Cowboy AI, Inc.
//! Date/Time Specification
//!
//! Maximum-future horizons are configured either as an absolute instant or
//! relative to a reference instant (usually the scheduler's minimum
//! date/time), e.g. "four months ahead". Relative specifications use the
//! ISO-8601 period subset `P[nY][nM][nW][nD][T[nH][nM][nS]]`.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Date/time specification parse error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateTimeSpecificationError {
    #[error("Empty date/time specification")]
    Empty,

    #[error("Invalid period '{0}'")]
    InvalidPeriod(String),

    #[error("Invalid date/time '{0}'")]
    InvalidDateTime(String),
}

/// Absolute or relative point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DateTimeSpecification {
    /// Fixed instant
    Absolute(DateTime<Utc>),
    /// Calendar months plus an exact duration added to the reference instant
    Relative { months: u32, duration: Duration },
}

impl DateTimeSpecification {
    /// Relative specification of whole months
    pub fn months(months: u32) -> Self {
        Self::Relative {
            months,
            duration: Duration::zero(),
        }
    }

    /// Relative specification of an exact duration
    pub fn after(duration: Duration) -> Self {
        Self::Relative {
            months: 0,
            duration,
        }
    }

    /// Resolve the specification against `reference`
    ///
    /// Relative specifications that overflow the calendar resolve to the
    /// latest representable instant.
    pub fn earliest(&self, reference: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Absolute(date_time) => *date_time,
            Self::Relative { months, duration } => reference
                .checked_add_months(Months::new(*months))
                .and_then(|date_time| date_time.checked_add_signed(*duration))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    fn parse_period(text: &str) -> Result<Self, DateTimeSpecificationError> {
        let invalid = || DateTimeSpecificationError::InvalidPeriod(text.to_string());
        let body = text.strip_prefix('P').ok_or_else(invalid)?;
        if body.is_empty() {
            return Err(invalid());
        }

        let mut months: u32 = 0;
        let mut duration = Duration::zero();
        let mut in_time = false;
        let mut number = String::new();
        for ch in body.chars() {
            if ch == 'T' {
                if in_time || !number.is_empty() {
                    return Err(invalid());
                }
                in_time = true;
                continue;
            }
            if ch.is_ascii_digit() {
                number.push(ch);
                continue;
            }
            let value: i64 = number.parse().map_err(|_| invalid())?;
            number.clear();
            let component = match (in_time, ch) {
                (false, 'Y') => {
                    let years = u32::try_from(value).map_err(|_| invalid())?;
                    months = months
                        .checked_add(years.checked_mul(12).ok_or_else(invalid)?)
                        .ok_or_else(invalid)?;
                    continue;
                }
                (false, 'M') => {
                    months = months
                        .checked_add(u32::try_from(value).map_err(|_| invalid())?)
                        .ok_or_else(invalid)?;
                    continue;
                }
                (false, 'W') => Duration::try_weeks(value),
                (false, 'D') => Duration::try_days(value),
                (true, 'H') => Duration::try_hours(value),
                (true, 'M') => Duration::try_minutes(value),
                (true, 'S') => Duration::try_seconds(value),
                _ => return Err(invalid()),
            };
            duration = component
                .and_then(|component| duration.checked_add(&component))
                .ok_or_else(invalid)?;
        }
        if !number.is_empty() {
            return Err(invalid());
        }
        Ok(Self::Relative { months, duration })
    }
}

impl FromStr for DateTimeSpecification {
    type Err = DateTimeSpecificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(DateTimeSpecificationError::Empty);
        }
        if text.starts_with('P') {
            return Self::parse_period(text);
        }
        DateTime::parse_from_rfc3339(text)
            .map(|date_time| Self::Absolute(date_time.with_timezone(&Utc)))
            .map_err(|_| DateTimeSpecificationError::InvalidDateTime(text.to_string()))
    }
}

impl TryFrom<String> for DateTimeSpecification {
    type Error = DateTimeSpecificationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateTimeSpecification> for String {
    fn from(value: DateTimeSpecification) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DateTimeSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(date_time) => write!(f, "{}", date_time.to_rfc3339()),
            Self::Relative { months, duration } => {
                write!(f, "P")?;
                if *months > 0 {
                    write!(f, "{}M", months)?;
                }
                let days = duration.num_days();
                if days != 0 {
                    write!(f, "{}D", days)?;
                }
                let seconds = (*duration - Duration::days(days)).num_seconds();
                if seconds != 0 {
                    write!(f, "T{}S", seconds)?;
                }
                if *months == 0 && days == 0 && seconds == 0 {
                    write!(f, "0D")?;
                }
                Ok(())
            }
        }
    }
}
