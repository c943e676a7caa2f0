// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Canonical timestamps.
//!
//! Entries carry a point in time normalized to UTC with millisecond precision and
//! rendered as ISO-8601, e.g. `2018-01-01T00:00:00.000Z`. Inputs may be epoch
//! milliseconds, a readable date string or a native date value ([`TimestampInput`]).

use crate::LedgerError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

/// Largest distance from the epoch, in milliseconds, that a timestamp may have.
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

/// Date-time layouts without an offset, read as UTC.
const NAIVE_LAYOUTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// A UTC point in time with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current time, truncated to milliseconds.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Truncates a native date value to millisecond precision.
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime.trunc_subsecs(3))
    }

    /// Interprets `millis` as milliseconds since the Unix epoch.
    ///
    /// Fractional milliseconds are truncated toward zero.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidTimestamp`] if `millis` is NaN, infinite, or
    /// further than 8.64e15 ms from the epoch.
    pub fn from_millis(millis: f64) -> Result<Self, LedgerError> {
        if !millis.is_finite() || millis.abs() > MAX_EPOCH_MILLIS {
            return Err(LedgerError::InvalidTimestamp(millis.to_string()));
        }
        DateTime::from_timestamp_millis(millis.trunc() as i64)
            .map(Self)
            .ok_or_else(|| LedgerError::InvalidTimestamp(millis.to_string()))
    }

    /// Parses a date string.
    ///
    /// Accepts RFC 3339, RFC 2822, ISO-8601 date-times without an offset (read as
    /// UTC) and plain `YYYY-MM-DD` dates (midnight UTC).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidTimestamp`] if no layout matches.
    pub fn parse(text: &str) -> Result<Self, LedgerError> {
        let trimmed = text.trim();

        if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::from_datetime(datetime.with_timezone(&Utc)));
        }
        if let Ok(datetime) = DateTime::parse_from_rfc2822(trimmed) {
            return Ok(Self::from_datetime(datetime.with_timezone(&Utc)));
        }
        for layout in NAIVE_LAYOUTS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, layout) {
                return Ok(Self::from_datetime(datetime.and_utc()));
            }
        }
        if let Some(datetime) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Ok(Self::from_datetime(datetime.and_utc()));
        }

        Err(LedgerError::InvalidTimestamp(text.to_string()))
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl FromStr for Timestamp {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::from_datetime(datetime)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TimestampVisitor)
    }
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a date string or epoch milliseconds")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Timestamp, E> {
        Timestamp::from_millis(value as f64).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Timestamp, E> {
        Timestamp::from_millis(value as f64).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Timestamp, E> {
        Timestamp::from_millis(value).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Timestamp, E> {
        Timestamp::parse(value).map_err(E::custom)
    }
}

/// Any accepted form of timestamp input.
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampInput {
    /// Milliseconds since the Unix epoch.
    Millis(f64),
    /// A readable date string.
    Text(String),
    /// A native date value.
    Date(DateTime<Utc>),
}

impl TimestampInput {
    /// Normalizes the input into a [`Timestamp`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidTimestamp`] if the input is not a valid point in time.
    pub fn resolve(&self) -> Result<Timestamp, LedgerError> {
        match self {
            Self::Millis(millis) => Timestamp::from_millis(*millis),
            Self::Text(text) => Timestamp::parse(text),
            Self::Date(datetime) => Ok(Timestamp::from_datetime(*datetime)),
        }
    }
}

impl TryFrom<TimestampInput> for Timestamp {
    type Error = LedgerError;

    fn try_from(input: TimestampInput) -> Result<Self, Self::Error> {
        input.resolve()
    }
}

impl From<i64> for TimestampInput {
    fn from(millis: i64) -> Self {
        Self::Millis(millis as f64)
    }
}

impl From<f64> for TimestampInput {
    fn from(millis: f64) -> Self {
        Self::Millis(millis)
    }
}

impl From<&str> for TimestampInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TimestampInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<DateTime<Utc>> for TimestampInput {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::Date(datetime)
    }
}

impl From<DateTime<FixedOffset>> for TimestampInput {
    fn from(datetime: DateTime<FixedOffset>) -> Self {
        Self::Date(datetime.with_timezone(&Utc))
    }
}

impl From<SystemTime> for TimestampInput {
    fn from(time: SystemTime) -> Self {
        Self::Date(DateTime::<Utc>::from(time))
    }
}

impl From<Timestamp> for TimestampInput {
    fn from(timestamp: Timestamp) -> Self {
        Self::Date(timestamp.0)
    }
}

impl From<&Timestamp> for TimestampInput {
    fn from(timestamp: &Timestamp) -> Self {
        Self::Date(timestamp.0)
    }
}
