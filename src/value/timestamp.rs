//! Store-native timestamps

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{ValueError, ValueResult};

const NANOS_PER_SECOND: i32 = 1_000_000_000;

/// Timestamp as the store represents it: seconds since the Unix epoch plus
/// a non-negative nanosecond offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl Timestamp {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// Convert to a universal date-time.
    pub fn to_datetime(&self) -> ValueResult<DateTime<Utc>> {
        let out_of_range = || ValueError::TimestampOutOfRange {
            seconds: self.seconds,
            nanos: self.nanos,
        };

        if !(0..NANOS_PER_SECOND).contains(&self.nanos) {
            return Err(out_of_range());
        }

        Utc.timestamp_opt(self.seconds, self.nanos as u32)
            .single()
            .ok_or_else(out_of_range)
    }

    /// Leap-second nanos (one second or more) carry into the seconds field.
    pub fn from_datetime(datetime: &DateTime<Utc>) -> Self {
        let subsec = i64::from(datetime.timestamp_subsec_nanos());
        Self {
            seconds: datetime.timestamp() + subsec / NANOS_PER_SECOND as i64,
            nanos: (subsec % NANOS_PER_SECOND as i64) as i32,
        }
    }

    pub fn now() -> Self {
        Self::from_datetime(&Utc::now())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::from_datetime(&datetime)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Ok(dt) => write!(f, "{}", dt.to_rfc3339()),
            Err(_) => write!(f, "Timestamp({}, {})", self.seconds, self.nanos),
        }
    }
}
