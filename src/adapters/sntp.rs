//! SNTP clock-sync adapter.
//!
//! Implements [`ClockSyncPort`].
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::sntp::EspSntp` with the
//!   default pool servers. The service keeps running for the process
//!   lifetime and re-syncs in the background.
//! - **all other targets**: reports synced as soon as the host clock reads a
//!   plausible date.

use log::info;

use crate::adapters::time::SystemClock;
use crate::app::ports::{ClockSyncError, ClockSyncPort};

pub struct SntpAdapter {
    #[cfg(target_os = "espidf")]
    sntp: Option<esp_idf_svc::sntp::EspSntp<'static>>,
    #[cfg(not(target_os = "espidf"))]
    started: bool,
}

impl Default for SntpAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SntpAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            sntp: None,
            #[cfg(not(target_os = "espidf"))]
            started: false,
        }
    }
}

impl ClockSyncPort for SntpAdapter {
    #[cfg(target_os = "espidf")]
    fn start(&mut self) -> Result<(), ClockSyncError> {
        if self.sntp.is_some() {
            return Ok(());
        }
        let sntp = esp_idf_svc::sntp::EspSntp::new_default().map_err(|e| {
            log::error!("SNTP: start failed ({})", e);
            ClockSyncError::Unavailable
        })?;
        self.sntp = Some(sntp);
        info!("SNTP: started");
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn start(&mut self) -> Result<(), ClockSyncError> {
        self.started = true;
        info!("SNTP(sim): using host clock");
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn is_synced(&self) -> bool {
        use esp_idf_svc::sntp::SyncStatus;
        self.sntp
            .as_ref()
            .is_some_and(|s| s.get_sync_status() == SyncStatus::Completed)
            && SystemClock::new().looks_synced()
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_synced(&self) -> bool {
        self.started && SystemClock::new().looks_synced()
    }
}
