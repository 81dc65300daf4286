// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the implementation of `DateTime`.

use std::{
    cmp::Ordering,
    fmt,
    ops::{Add, Sub},
    str::FromStr,
};

use chrono::{Duration, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    codec::{DecodeStream, EncodeStream},
    types::encoding::*,
};

const NANOS_PER_TICK: i64 = 100;
const TICKS_PER_SECOND: i64 = 1_000_000_000 / NANOS_PER_TICK;

/// Seconds between the OPC UA epoch, 1601-01-01T00:00:00Z, and the Unix epoch
const EPOCH_UNIX_SECONDS: i64 = -11_644_473_600;
/// Seconds between the Unix epoch and 9999-12-31T23:59:59Z, after which times encode as the maximum
/// tick value
const ENDTIMES_UNIX_SECONDS: i64 = 253_402_300_799;

pub type DateTimeUtc = chrono::DateTime<Utc>;

/// A date/time value. This is a wrapper around the chrono type with extra functionality
/// for obtaining ticks in OPC UA measurements, endtimes, epoch etc.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub struct DateTime {
    date_time: DateTimeUtc,
}

impl Serialize for DateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.checked_ticks().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DateTime {
    fn deserialize<D>(deserializer: D) -> Result<DateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ticks = i64::deserialize(deserializer)?;
        Ok(DateTime::from(ticks))
    }
}

/// DateTime encoded as 64-bit signed int
impl BinaryEncoder<DateTime> for DateTime {
    fn encode(&self, stream: &mut EncodeStream<'_>) -> EncodingResult<usize> {
        write_i64(stream, self.checked_ticks())
    }

    fn decode(stream: &mut DecodeStream<'_>) -> EncodingResult<Self> {
        let ticks = read_i64(stream)?;
        Ok(DateTime::from(ticks))
    }
}

crate::impl_scalar!(DateTime);

impl Default for DateTime {
    fn default() -> Self {
        DateTime::epoch()
    }
}

impl Add<Duration> for DateTime {
    type Output = Self;

    fn add(self, duration: Duration) -> Self {
        DateTime::from(self.date_time + duration)
    }
}

impl Sub<DateTime> for DateTime {
    type Output = Duration;

    fn sub(self, other: Self) -> Duration {
        self.date_time - other.date_time
    }
}

impl Sub<Duration> for DateTime {
    type Output = Self;

    fn sub(self, duration: Duration) -> Self {
        DateTime::from(self.date_time - duration)
    }
}

impl PartialOrd for DateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date_time.cmp(&other.date_time)
    }
}

impl From<DateTimeUtc> for DateTime {
    fn from(date_time: DateTimeUtc) -> Self {
        // OPC UA times are in 100ns ticks so anything finer is truncated
        let nanos = date_time.timestamp_subsec_nanos();
        let truncated = nanos - nanos % NANOS_PER_TICK as u32;
        DateTime {
            date_time: date_time - Duration::nanoseconds((nanos - truncated) as i64),
        }
    }
}

impl From<i64> for DateTime {
    fn from(ticks: i64) -> Self {
        if ticks == i64::MAX {
            // Max signifies end times
            return Self::endtimes();
        }
        let secs = ticks.div_euclid(TICKS_PER_SECOND) + EPOCH_UNIX_SECONDS;
        let nanos = (ticks.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK) as u32;
        DateTime {
            date_time: unix_time(secs, nanos),
        }
    }
}

impl From<DateTime> for i64 {
    fn from(value: DateTime) -> Self {
        value.checked_ticks()
    }
}

impl From<DateTime> for DateTimeUtc {
    fn from(value: DateTime) -> Self {
        value.as_chrono()
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date_time.to_rfc3339())
    }
}

impl FromStr for DateTime {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateTimeUtc::from_str(s).map(DateTime::from).map_err(|e| {
            error!("Cannot parse date {}, error = {}", s, e);
        })
    }
}

fn unix_time(secs: i64, nanos: u32) -> DateTimeUtc {
    // Every i64 tick count lies well inside the chrono range
    Utc.timestamp_opt(secs, nanos)
        .single()
        .unwrap_or(DateTimeUtc::MIN_UTC)
}

impl DateTime {
    /// Constructs from the current time
    pub fn now() -> DateTime {
        DateTime::from(Utc::now())
    }

    /// Creates a null date time (i.e. the epoch)
    pub fn null() -> DateTime {
        // The epoch is 0, so effectively null
        DateTime::epoch()
    }

    /// Tests if the date time is null (i.e. equal to epoch)
    pub fn is_null(&self) -> bool {
        self.ticks() == 0
    }

    /// Constructs a date time for the epoch
    pub fn epoch() -> DateTime {
        DateTime {
            date_time: unix_time(EPOCH_UNIX_SECONDS, 0),
        }
    }

    /// Constructs a date time for the endtimes
    pub fn endtimes() -> DateTime {
        DateTime {
            date_time: unix_time(ENDTIMES_UNIX_SECONDS, 0),
        }
    }

    /// Returns the maximum tick value, corresponding to the end of time
    pub fn endtimes_ticks() -> i64 {
        (ENDTIMES_UNIX_SECONDS - EPOCH_UNIX_SECONDS) * TICKS_PER_SECOND
    }

    /// Constructs from a year, month, day, hour, minute, second and nanosecond. Returns `None` if
    /// any component is out of range.
    pub fn ymd_hms_nano(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        nanos: u32,
    ) -> Option<DateTime> {
        let date_time = Utc
            .with_ymd_and_hms(year, month, day, hour, minute, second)
            .single()?;
        if nanos >= 1_000_000_000 {
            return None;
        }
        Some(DateTime::from(date_time + Duration::nanoseconds(nanos as i64)))
    }

    /// Constructs from a year, month, day, hour, minute and second. Returns `None` if any component
    /// is out of range.
    pub fn ymd_hms(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<DateTime> {
        Self::ymd_hms_nano(year, month, day, hour, minute, second, 0)
    }

    /// Returns the time in ticks, of 100 nanosecond intervals, since the epoch. Times before the
    /// epoch are negative.
    pub fn ticks(&self) -> i64 {
        let secs = self.date_time.timestamp() - EPOCH_UNIX_SECONDS;
        let sub_ticks = self.date_time.timestamp_subsec_nanos() as i64 / NANOS_PER_TICK;
        secs.checked_mul(TICKS_PER_SECOND)
            .and_then(|ticks| ticks.checked_add(sub_ticks))
            .unwrap_or(if secs < 0 { i64::MIN } else { i64::MAX })
    }

    /// The ticks written to the wire. Times before the epoch are 0, the endtimes and anything
    /// after are `i64::MAX`.
    pub fn checked_ticks(&self) -> i64 {
        let ticks = self.ticks();
        if ticks < 0 {
            0
        } else if ticks >= Self::endtimes_ticks() {
            i64::MAX
        } else {
            ticks
        }
    }

    /// Time as chrono
    pub fn as_chrono(&self) -> DateTimeUtc {
        self.date_time
    }
}
