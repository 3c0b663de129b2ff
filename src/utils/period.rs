//! Time bucketing for the period rollups.

use chrono::{DateTime, Utc};

/// Granularity of a time-bucketed rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Hour,
    Day,
    Week,
}

impl Period {
    /// Length of one bucket in seconds.
    pub const fn seconds(self) -> u64 {
        match self {
            Period::Hour => 3_600,
            Period::Day => 86_400,
            Period::Week => 604_800,
        }
    }

    /// Bucket index of a unix timestamp: `floor(timestamp / length)`.
    #[inline]
    pub const fn index(self, timestamp: u64) -> u64 {
        timestamp / self.seconds()
    }

    /// Unix timestamp of the first second of bucket `index`.
    #[inline]
    pub const fn start_timestamp(self, index: u64) -> u64 {
        index * self.seconds()
    }

    /// Start of bucket `index` as a UTC datetime.
    pub fn start(self, index: u64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.start_timestamp(index) as i64, 0).unwrap_or_default()
    }

    pub const fn label(self) -> &'static str {
        match self {
            Period::Hour => "hourly",
            Period::Day => "daily",
            Period::Week => "weekly",
        }
    }
}
