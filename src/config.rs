//! Controller configuration parameters
//!
//! All tunable parameters for the Doorlink controller. Defaults match the
//! deployed installation; values can be overridden via NVS.
//!
//! WiFi credentials default to the build-time environment variables
//! `DOORLINK_WIFI_SSID` / `DOORLINK_WIFI_PASS` when set.

use serde::{Deserialize, Serialize};

/// Receiver address of the deployed installation.
pub const DEFAULT_REMOTE_HOST: &str = "10.1.0.29";
/// Receiver TCP port of the deployed installation.
pub const DEFAULT_REMOTE_PORT: u16 = 10001;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Endpoint ---
    /// Receiver host (IPv4/IPv6 literal or DNS name)
    pub remote_host: heapless::String<64>,
    /// Receiver TCP port
    pub remote_port: u16,

    // --- Delivery ---
    /// Send attempts per packet (1 = fire-and-forget, no retry)
    pub transmit_attempts: u8,
    /// TCP connect timeout (milliseconds)
    pub connect_timeout_ms: u32,
    /// Socket write timeout (milliseconds)
    pub write_timeout_ms: u32,

    // --- Main loop ---
    /// Pause after each dispatch before re-polling (milliseconds)
    pub dispatch_delay_ms: u32,
    /// Pause between polls while idle (milliseconds)
    pub idle_poll_ms: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,

    // --- Startup ---
    /// Give up waiting for network association after this long (milliseconds)
    pub network_join_timeout_ms: u32,
    /// Interval between association status checks (milliseconds)
    pub network_poll_interval_ms: u32,
    /// Give up waiting for SNTP after this long (milliseconds)
    pub clock_sync_timeout_ms: u32,

    // --- WiFi ---
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
}

impl ControllerConfig {
    /// Longest a single dispatch can block the loop: every attempt running
    /// into both socket timeouts, then the post-dispatch pause.
    pub fn worst_case_dispatch_ms(&self) -> u64 {
        u64::from(self.transmit_attempts)
            * (u64::from(self.connect_timeout_ms) + u64::from(self.write_timeout_ms))
            + u64::from(self.dispatch_delay_ms)
    }
}

pub(crate) fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // Endpoint
            remote_host: bounded(DEFAULT_REMOTE_HOST),
            remote_port: DEFAULT_REMOTE_PORT,

            // Delivery
            transmit_attempts: 1,
            connect_timeout_ms: 2_000,
            write_timeout_ms: 1_000,

            // Main loop
            dispatch_delay_ms: 500,
            idle_poll_ms: 10,
            watchdog_timeout_ms: 10_000,

            // Startup
            network_join_timeout_ms: 30_000,
            network_poll_interval_ms: 500,
            clock_sync_timeout_ms: 15_000,

            // WiFi
            wifi_ssid: bounded(option_env!("DOORLINK_WIFI_SSID").unwrap_or("")),
            wifi_password: bounded(option_env!("DOORLINK_WIFI_PASS").unwrap_or("")),
        }
    }
}
