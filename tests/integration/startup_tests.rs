//! Boot preconditions: bounded network and clock waits.

use core::time::Duration;

use doorlink::app::events::AppEvent;
use doorlink::app::ports::ConnectivityError;
use doorlink::app::startup::{await_network, bring_up};
use doorlink::config::ControllerConfig;
use doorlink::error::StartupError;

use super::mock_hw::{MockNet, MockSync, RecordingDelay, RecordingSink};

#[test]
fn network_that_comes_up_is_awaited_in_poll_steps() {
    let mut net = MockNet::up_after(3);
    let mut delay = RecordingDelay::default();

    assert_eq!(await_network(&mut net, &mut delay, 30_000, 500), Ok(()));
    assert_eq!(net.connect_calls, 1);
    assert_eq!(delay.pauses_ms, vec![500, 500, 500]);
}

#[test]
fn network_wait_is_bounded() {
    let mut net = MockNet::never_up();
    let mut delay = RecordingDelay::default();

    let err = await_network(&mut net, &mut delay, 2_000, 500).unwrap_err();
    assert_eq!(err, StartupError::NetworkTimeout(Duration::from_millis(2_000)));
    assert_eq!(delay.total_ms(), 2_000);
}

#[test]
fn failed_first_association_is_retried_until_timeout() {
    let mut net = MockNet::rejecting(ConnectivityError::ConnectionFailed);
    let mut delay = RecordingDelay::default();

    let err = await_network(&mut net, &mut delay, 1_000, 250).unwrap_err();
    assert!(matches!(err, StartupError::NetworkTimeout(_)));
    assert!(net.polls > 0);
}

#[test]
fn missing_credentials_fail_fast() {
    let mut net = MockNet::rejecting(ConnectivityError::NoCredentials);
    let mut delay = RecordingDelay::default();

    assert_eq!(
        await_network(&mut net, &mut delay, 30_000, 500),
        Err(StartupError::NetworkUnavailable)
    );
    assert!(delay.pauses_ms.is_empty());
}

#[test]
fn bring_up_happy_path_emits_nothing() {
    let config = ControllerConfig::default();
    let mut net = MockNet::up_after(1);
    let mut sync = MockSync::synced_after(2);
    let mut delay = RecordingDelay::default();
    let mut sink = RecordingSink::default();

    assert_eq!(bring_up(&config, &mut net, &mut sync, &mut delay, &mut sink), Ok(()));
    assert!(sync.started);
    assert!(sink.events.is_empty());
}

#[test]
fn network_timeout_is_fatal_and_skips_clock_sync() {
    let mut config = ControllerConfig::default();
    config.network_join_timeout_ms = 1_000;
    let mut net = MockNet::never_up();
    let mut sync = MockSync::synced_after(0);
    let mut delay = RecordingDelay::default();
    let mut sink = RecordingSink::default();

    let err = bring_up(&config, &mut net, &mut sync, &mut delay, &mut sink).unwrap_err();
    assert!(matches!(err, StartupError::NetworkTimeout(_)));
    assert!(!sync.started);
    assert_eq!(sink.events, vec![AppEvent::StartupFailed(err)]);
}

#[test]
fn clock_sync_timeout_degrades_but_boots() {
    let mut config = ControllerConfig::default();
    config.clock_sync_timeout_ms = 1_500;
    let mut net = MockNet::up_after(0);
    let mut sync = MockSync::never_synced();
    let mut delay = RecordingDelay::default();
    let mut sink = RecordingSink::default();

    assert_eq!(bring_up(&config, &mut net, &mut sync, &mut delay, &mut sink), Ok(()));
    assert_eq!(
        sink.events,
        vec![AppEvent::StartupFailed(StartupError::ClockSyncTimeout(
            Duration::from_millis(1_500)
        ))]
    );
}

#[test]
fn unavailable_clock_service_degrades_but_boots() {
    let config = ControllerConfig::default();
    let mut net = MockNet::up_after(0);
    let mut sync = MockSync::broken();
    let mut delay = RecordingDelay::default();
    let mut sink = RecordingSink::default();

    assert_eq!(bring_up(&config, &mut net, &mut sync, &mut delay, &mut sink), Ok(()));
    assert_eq!(
        sink.events,
        vec![AppEvent::StartupFailed(StartupError::ClockSyncUnavailable)]
    );
}
