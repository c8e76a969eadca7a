//! Freshness token encoding.
//!
//! `token = seconds + 60 * minutes + 3600 * (hour / 4)`
//!
//! Hours collapse into 4-hour buckets, so the token ranges over
//! `0..=21599` and repeats six times a day. The receiver compares it against
//! its own clock with a tolerance window; nothing on this side checks it.

/// Tolerance the receiver applies when comparing tokens (seconds).
pub const MAX_TIME_DIFF_SECS: u16 = 10;

/// Largest token the encoder can produce.
pub const MAX_TOKEN: u16 = 59 + 60 * 59 + 3600 * (23 / 4);

/// Broken-down UTC time of day. Fields are always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    hour: u8,
    minute: u8,
    second: u8,
}

impl WallTime {
    /// `None` unless `hour < 24`, `minute < 60` and `second < 60`.
    pub const fn new(hour: u8, minute: u8, second: u8) -> Option<Self> {
        if hour < 24 && minute < 60 && second < 60 {
            Some(Self { hour, minute, second })
        } else {
            None
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// Time of day from seconds since the Unix epoch (UTC, no leap seconds).
    pub fn from_unix_secs(secs: u64) -> Self {
        let day_secs = secs % 86_400;
        Self {
            hour: (day_secs / 3600) as u8,
            minute: ((day_secs % 3600) / 60) as u8,
            second: (day_secs % 60) as u8,
        }
    }
}

/// Quantise a wall-clock reading into a freshness token.
pub fn encode_time(t: WallTime) -> u16 {
    u16::from(t.second) + 60 * u16::from(t.minute) + 3600 * (u16::from(t.hour) / 4)
}

/// Stateful encoder that falls back to the last good token.
///
/// When the clock cannot be read the previous token is reused (0 before the
/// first good reading), which yields a stale but well-formed packet.
#[derive(Debug, Default)]
pub struct FreshnessEncoder {
    last: u16,
}

impl FreshnessEncoder {
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Returns `(token, fresh)`; `fresh` is false when the fallback was used.
    pub fn encode(&mut self, now: Option<WallTime>) -> (u16, bool) {
        match now {
            Some(t) => {
                self.last = encode_time(t);
                (self.last, true)
            }
            None => (self.last, false),
        }
    }
}
