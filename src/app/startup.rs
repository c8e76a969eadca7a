//! Boot preconditions: network association and wall-clock sync.
//!
//! Both waits are bounded. A network timeout is fatal (the caller restarts
//! the chip); a clock-sync failure is reported and boot continues, since
//! packets are still well-formed with a stale freshness token.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use crate::config::ControllerConfig;
use crate::error::StartupError;

use super::events::AppEvent;
use super::ports::{ClockSyncPort, ConnectivityError, ConnectivityPort, EventSink};

/// Poll `done` every `poll_ms` until it holds or `timeout_ms` elapses.
///
/// Returns the time spent waiting on success.
fn wait_until(
    delay: &mut impl DelayNs,
    timeout_ms: u32,
    poll_ms: u32,
    mut done: impl FnMut() -> bool,
) -> Result<u32, u32> {
    let poll_ms = poll_ms.max(1);
    let mut waited = 0u32;
    loop {
        if done() {
            return Ok(waited);
        }
        if waited >= timeout_ms {
            return Err(waited);
        }
        delay.delay_ms(poll_ms);
        waited = waited.saturating_add(poll_ms);
    }
}

/// Join the network and block until it reports connected, or time out.
pub fn await_network(
    net: &mut impl ConnectivityPort,
    delay: &mut impl DelayNs,
    timeout_ms: u32,
    poll_ms: u32,
) -> Result<(), StartupError> {
    if !net.is_connected() {
        match net.connect() {
            Ok(()) | Err(ConnectivityError::AlreadyConnected) => {}
            // Transient: the adapter keeps retrying from poll().
            Err(ConnectivityError::ConnectionFailed) => {
                warn!("startup: first association attempt failed, retrying");
            }
            Err(e) => {
                error!("startup: network unusable: {}", e);
                return Err(StartupError::NetworkUnavailable);
            }
        }
    }

    wait_until(delay, timeout_ms, poll_ms, || {
        if net.is_connected() {
            return true;
        }
        net.poll();
        false
    })
    .map(|waited| info!("startup: network up after {} ms", waited))
    .map_err(|waited| StartupError::NetworkTimeout(Duration::from_millis(u64::from(waited))))
}

/// Start wall-clock sync and wait for the first completed sync, or time out.
pub fn await_clock_sync(
    sync: &mut impl ClockSyncPort,
    delay: &mut impl DelayNs,
    timeout_ms: u32,
    poll_ms: u32,
) -> Result<(), StartupError> {
    sync.start().map_err(|e| {
        error!("startup: {}", e);
        StartupError::ClockSyncUnavailable
    })?;

    wait_until(delay, timeout_ms, poll_ms, || sync.is_synced())
        .map(|waited| info!("startup: clock synced after {} ms", waited))
        .map_err(|waited| StartupError::ClockSyncTimeout(Duration::from_millis(u64::from(waited))))
}

/// Run every boot precondition in order.
///
/// Only a network failure is returned as an error; clock-sync problems are
/// emitted as [`AppEvent::StartupFailed`] and boot carries on.
pub fn bring_up(
    config: &ControllerConfig,
    net: &mut impl ConnectivityPort,
    sync: &mut impl ClockSyncPort,
    delay: &mut impl DelayNs,
    sink: &mut impl EventSink,
) -> Result<(), StartupError> {
    if let Err(e) = await_network(
        net,
        delay,
        config.network_join_timeout_ms,
        config.network_poll_interval_ms,
    ) {
        sink.emit(&AppEvent::StartupFailed(e));
        return Err(e);
    }

    if let Err(e) = await_clock_sync(
        sync,
        delay,
        config.clock_sync_timeout_ms,
        config.network_poll_interval_ms,
    ) {
        warn!("startup: continuing without synced clock ({})", e);
        sink.emit(&AppEvent::StartupFailed(e));
    }
    Ok(())
}
