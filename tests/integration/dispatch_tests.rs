//! DoorController end-to-end: trigger edge → signed bytes on the wire.

use std::sync::Arc;

use doorlink::app::events::{AppEvent, DeliveryOutcome};
use doorlink::app::service::{DoorController, LoopState};
use doorlink::config::ControllerConfig;
use doorlink::drivers::trigger::TriggerInputs;
use doorlink::events::PendingAction;
use doorlink::keys::{SecretKey, load_key};
use doorlink::pins;
use doorlink::protocol::{CommandPacket, DoorAction, PacketBuilder, Signer};

use super::mock_hw::{MockClock, MockKeyStore, MockTransmitter, RecordingDelay, RecordingSink};

const FIXTURE_WIRE: [u8; 39] = [
    0x27, 0x00, 0x64, 0x00, 0x01, 0x00, 0x01, // header
    0x12, 0x2d, 0x5c, 0x87, 0xe8, 0x6d, 0x37, 0x4c, 0xb2, 0xdb, 0x1e, 0xd0, 0x6a, 0xa0, 0x40,
    0x67, 0x97, 0xf0, 0xe8, 0x19, 0xa0, 0x9b, 0x78, 0xf1, 0x71, 0x2e, 0x1a, 0x4b, 0xc5, 0x77,
    0xa3, 0x0d,
];

fn zero_key_controller(config: &ControllerConfig) -> (DoorController, Arc<PendingAction>) {
    let pending = Arc::new(PendingAction::new());
    let signer = Signer::new(SecretKey::from_bytes([0; 32]));
    (DoorController::new(config, signer, Arc::clone(&pending)), pending)
}

/// 00:01:40 UTC encodes to token 100.
fn clock_at_100() -> MockClock {
    MockClock::fixed(0, 1, 40)
}

// ── Wire format ───────────────────────────────────────────────

#[test]
fn first_open_matches_reference_capture() {
    let (mut ctl, pending) = zero_key_controller(&ControllerConfig::default());
    let mut tx = MockTransmitter::new();
    let mut sink = RecordingSink::default();

    pending.signal(DoorAction::Open);
    let report = ctl.poll(&clock_at_100(), &mut tx, &mut sink).unwrap();

    assert_eq!(report.seq, 1);
    assert_eq!(report.time, 100);
    assert_eq!(tx.sent, vec![FIXTURE_WIRE.to_vec()]);
}

#[test]
fn key_loaded_from_store_signs_like_reference() {
    let store = MockKeyStore::with_key([0; 32]);
    let signer = Signer::new(load_key(&store).unwrap());
    let pending = Arc::new(PendingAction::new());
    let mut ctl = DoorController::new(&ControllerConfig::default(), signer, Arc::clone(&pending));
    let mut tx = MockTransmitter::new();

    pending.signal(DoorAction::Open);
    ctl.poll(&clock_at_100(), &mut tx, &mut RecordingSink::default());

    let packet = CommandPacket::from_bytes(&tx.sent[0]).unwrap();
    assert!(Signer::new(SecretKey::from_bytes([0; 32])).verify(&packet));
    assert!(!Signer::new(SecretKey::from_bytes([1; 32])).verify(&packet));
}

// ── Sequencing and coalescing ─────────────────────────────────

#[test]
fn burst_of_opens_sends_one_packet() {
    let (mut ctl, pending) = zero_key_controller(&ControllerConfig::default());
    let mut tx = MockTransmitter::new();
    let mut sink = RecordingSink::default();

    assert!(pending.signal(DoorAction::Open));
    assert!(!pending.signal(DoorAction::Open));
    ctl.poll(&clock_at_100(), &mut tx, &mut sink);
    assert!(ctl.poll(&clock_at_100(), &mut tx, &mut sink).is_none());

    assert_eq!(tx.sent.len(), 1);
    assert_eq!(ctl.sequence(), 1);
    assert_eq!(ctl.dispatched(), 1);
    assert_eq!(pending.coalesced(), 1);
}

#[test]
fn open_then_close_use_consecutive_sequence_numbers() {
    let (mut ctl, pending) = zero_key_controller(&ControllerConfig::default());
    let mut tx = MockTransmitter::new();
    let mut sink = RecordingSink::default();
    let clock = clock_at_100();

    pending.signal(DoorAction::Open);
    ctl.poll(&clock, &mut tx, &mut sink);
    pending.signal(DoorAction::Close);
    ctl.poll(&clock, &mut tx, &mut sink);

    let a = CommandPacket::from_bytes(&tx.sent[0]).unwrap();
    let b = CommandPacket::from_bytes(&tx.sent[1]).unwrap();
    assert_eq!((a.seq, a.action), (1, DoorAction::Open));
    assert_eq!((b.seq, b.action), (2, DoorAction::Close));
}

#[test]
fn sequence_wraps_after_u16_max() {
    let pending = Arc::new(PendingAction::new());
    let signer = Signer::new(SecretKey::from_bytes([0; 32]));
    let mut ctl = DoorController::new(&ControllerConfig::default(), signer, Arc::clone(&pending))
        .with_builder(PacketBuilder::with_sequence(u16::MAX));
    let mut tx = MockTransmitter::new();

    pending.signal(DoorAction::Close);
    let report = ctl.poll(&clock_at_100(), &mut tx, &mut RecordingSink::default()).unwrap();
    assert_eq!(report.seq, 0);
}

#[test]
fn edges_from_trigger_inputs_reach_the_wire() {
    let (mut ctl, pending) = zero_key_controller(&ControllerConfig::default());
    let mut inputs = TriggerInputs::new(&pending);
    let mut tx = MockTransmitter::new();
    let mut delay = RecordingDelay::default();
    let mut sink = RecordingSink::default();
    let clock = clock_at_100();

    inputs.fire(pins::DOOR_CLOSE_GPIO);
    ctl.run_once(&clock, &mut tx, &mut delay, &mut sink);
    inputs.rearm();
    inputs.fire(pins::DOOR_OPEN_GPIO);
    ctl.run_once(&clock, &mut tx, &mut delay, &mut sink);

    let actions: Vec<_> = tx
        .sent
        .iter()
        .map(|b| CommandPacket::from_bytes(b).unwrap().action)
        .collect();
    assert_eq!(actions, vec![DoorAction::Close, DoorAction::Open]);
}

// ── Failure handling ──────────────────────────────────────────

#[test]
fn refused_connection_drops_command_and_returns_to_idle() {
    let (mut ctl, pending) = zero_key_controller(&ControllerConfig::default());
    let mut tx = MockTransmitter::refusing(1);
    let mut sink = RecordingSink::default();
    let clock = clock_at_100();

    pending.signal(DoorAction::Open);
    let report = ctl.poll(&clock, &mut tx, &mut sink).unwrap();
    assert!(!report.outcome.is_delivered());
    assert_eq!(report.attempts, 1);
    assert_eq!(ctl.state(), LoopState::Idle);
    assert!(!pending.is_pending());
    assert!(tx.sent.is_empty());

    // Next command is not affected by the failure, and seq moved by one only.
    pending.signal(DoorAction::Open);
    let report = ctl.poll(&clock, &mut tx, &mut sink).unwrap();
    assert_eq!(report.outcome, DeliveryOutcome::Delivered);
    assert_eq!(report.seq, 2);
}

#[test]
fn retries_resend_identical_bytes() {
    let mut config = ControllerConfig::default();
    config.transmit_attempts = 3;
    let (mut ctl, pending) = zero_key_controller(&config);
    let mut tx = MockTransmitter::refusing(2);

    pending.signal(DoorAction::Open);
    let report = ctl
        .poll(&clock_at_100(), &mut tx, &mut RecordingSink::default())
        .unwrap();

    assert_eq!(report.attempts, 3);
    assert!(report.outcome.is_delivered());
    assert_eq!(tx.sent, vec![FIXTURE_WIRE.to_vec()]);
    assert_eq!(ctl.sequence(), 1);
}

#[test]
fn exhausted_retries_report_last_error() {
    let mut config = ControllerConfig::default();
    config.transmit_attempts = 2;
    let (mut ctl, pending) = zero_key_controller(&config);
    let mut tx = MockTransmitter::always_refusing();

    pending.signal(DoorAction::Close);
    let report = ctl
        .poll(&clock_at_100(), &mut tx, &mut RecordingSink::default())
        .unwrap();
    assert_eq!(tx.attempts, 2);
    assert!(matches!(report.outcome, DeliveryOutcome::Dropped(_)));
}

#[test]
fn unreadable_clock_reuses_last_token_and_reports_it() {
    let (mut ctl, pending) = zero_key_controller(&ControllerConfig::default());
    let clock = MockClock::script(vec![
        doorlink::protocol::WallTime::new(0, 1, 40),
        None,
    ]);
    let mut tx = MockTransmitter::new();
    let mut sink = RecordingSink::default();

    pending.signal(DoorAction::Open);
    ctl.poll(&clock, &mut tx, &mut sink);
    pending.signal(DoorAction::Open);
    let report = ctl.poll(&clock, &mut tx, &mut sink).unwrap();

    assert_eq!(report.time, 100);
    assert!(sink.events.contains(&AppEvent::ClockUnavailable { token: 100 }));
}

// ── Loop pacing ───────────────────────────────────────────────

#[test]
fn dispatch_is_followed_by_dispatch_delay_and_idle_by_poll_interval() {
    let (mut ctl, pending) = zero_key_controller(&ControllerConfig::default());
    let mut tx = MockTransmitter::new();
    let mut delay = RecordingDelay::default();
    let mut sink = RecordingSink::default();
    let clock = clock_at_100();

    ctl.run_once(&clock, &mut tx, &mut delay, &mut sink);
    pending.signal(DoorAction::Open);
    ctl.run_once(&clock, &mut tx, &mut delay, &mut sink);

    assert_eq!(delay.pauses_ms, vec![10, 500]);
}

#[test]
fn events_trace_a_full_cycle() {
    let (mut ctl, pending) = zero_key_controller(&ControllerConfig::default());
    let mut tx = MockTransmitter::new();
    let mut sink = RecordingSink::default();

    ctl.start(&mut sink);
    pending.signal(DoorAction::Open);
    ctl.poll(&clock_at_100(), &mut tx, &mut sink);

    assert_eq!(sink.events.len(), 2);
    assert_eq!(sink.events[0], AppEvent::Started { next_seq: 1 });
    match &sink.events[1] {
        AppEvent::Dispatched(r) => {
            assert_eq!(r.seq, 1);
            assert_eq!(r.action, DoorAction::Open);
        }
        other => panic!("unexpected event {:?}", other),
    }
}
