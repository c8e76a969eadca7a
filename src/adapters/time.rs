//! Wall-clock and delay adapters.
//!
//! - **`target_os = "espidf"`**: reads the RTC through `gettimeofday()`,
//!   which SNTP keeps in step once synchronised.
//! - **`not(target_os = "espidf")`**: uses `std::time::SystemTime` for
//!   host-side testing and simulation.
//!
//! All times are UTC; the controller never applies a zone offset.

use crate::app::ports::ClockPort;
use crate::protocol::WallTime;

/// Unix time of 2020-01-01T00:00:00Z. Earlier readings mean the RTC still
/// runs from its power-on epoch.
pub const EPOCH_2020: u64 = 1_577_836_800;

/// System wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }

    /// Seconds since the Unix epoch, if the clock can be read.
    #[cfg(target_os = "espidf")]
    pub fn unix_secs(&self) -> Option<u64> {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: tv is a valid out-pointer; a null timezone is permitted.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return None;
        }
        u64::try_from(tv.tv_sec).ok()
    }

    /// Seconds since the Unix epoch, if the clock can be read.
    #[cfg(not(target_os = "espidf"))]
    pub fn unix_secs(&self) -> Option<u64> {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs())
    }

    /// Whether the clock reads a plausible calendar date.
    pub fn looks_synced(&self) -> bool {
        self.unix_secs().is_some_and(|s| s >= EPOCH_2020)
    }
}

impl ClockPort for SystemClock {
    fn now_utc(&self) -> Option<WallTime> {
        self.unix_secs().map(WallTime::from_unix_secs)
    }
}

/// Blocking delay backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl embedded_hal::delay::DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
