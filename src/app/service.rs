//! Dispatch service, the hexagonal core.
//!
//! [`DoorController`] owns the signer, the sequence counter and the consumer
//! side of the pending-action cell. All I/O flows through port traits
//! passed in at call sites, so the whole pipeline runs against mocks on the
//! host.
//!
//! ```text
//!  PendingAction ──▶ ┌────────────────────────────┐ ──▶ TransmitPort
//!                    │       DoorController       │
//!      ClockPort ──▶ │ build · sign · deliver     │ ──▶ EventSink
//!                    └────────────────────────────┘
//! ```
//!
//! State machine:
//!
//! ```text
//!   Idle ──(slot taken)──▶ Dispatching ──(after send, ok or not)──▶ Idle
//! ```

use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::events::PendingAction;
use crate::protocol::{FreshnessEncoder, PacketBuilder, Signer};

use super::events::{AppEvent, DeliveryOutcome, DispatchReport};
use super::ports::{ClockPort, EventSink, TransmitPort};

/// Main-loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Dispatching,
}

/// Consumes pending actions and turns each into one signed packet.
pub struct DoorController {
    signer: Signer,
    builder: PacketBuilder,
    freshness: FreshnessEncoder,
    pending: Arc<PendingAction>,
    state: LoopState,
    transmit_attempts: u8,
    dispatch_delay_ms: u32,
    idle_poll_ms: u32,
    dispatched: u32,
}

impl DoorController {
    pub fn new(config: &ControllerConfig, signer: Signer, pending: Arc<PendingAction>) -> Self {
        Self {
            signer,
            builder: PacketBuilder::new(),
            freshness: FreshnessEncoder::new(),
            pending,
            state: LoopState::Idle,
            transmit_attempts: config.transmit_attempts.max(1),
            dispatch_delay_ms: config.dispatch_delay_ms,
            idle_poll_ms: config.idle_poll_ms,
            dispatched: 0,
        }
    }

    /// Replace the packet builder, e.g. to resume from a known counter value.
    pub fn with_builder(mut self, builder: PacketBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Sequence number of the last built packet (0 before the first).
    pub fn sequence(&self) -> u16 {
        self.builder.sequence()
    }

    /// Number of dispatch cycles completed since boot.
    pub fn dispatched(&self) -> u32 {
        self.dispatched
    }

    /// The producer-side handle to give to trigger handlers.
    pub fn pending_handle(&self) -> Arc<PendingAction> {
        Arc::clone(&self.pending)
    }

    pub fn start(&mut self, sink: &mut impl EventSink) {
        let next_seq = self.builder.sequence().wrapping_add(1);
        sink.emit(&AppEvent::Started { next_seq });
        info!("DoorController started (next seq {})", next_seq);
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Dispatch the pending action, if there is one.
    ///
    /// Runs the whole Idle → Dispatching → Idle cycle synchronously and
    /// returns the report, or `None` when the slot was empty.
    pub fn poll(
        &mut self,
        clock: &impl ClockPort,
        tx: &mut impl TransmitPort,
        sink: &mut impl EventSink,
    ) -> Option<DispatchReport> {
        let action = self.pending.pending()?;
        self.state = LoopState::Dispatching;

        // 1. Freshness token
        let (time, fresh) = self.freshness.encode(clock.now_utc());
        if !fresh {
            warn!("clock unavailable, reusing stale token {}", time);
            sink.emit(&AppEvent::ClockUnavailable { token: time });
        }

        // 2. Build (advances seq exactly once) and sign
        let mut packet = self.builder.build(action, time);
        self.signer.sign(&mut packet);
        let bytes = packet.to_bytes();

        // 3. Deliver; retries resend the same signed bytes
        let (attempts, outcome) = self.deliver(&bytes, tx);

        // 4. Release the slot and return to Idle regardless of outcome
        self.pending.clear();
        self.state = LoopState::Idle;
        self.dispatched = self.dispatched.wrapping_add(1);

        let report = DispatchReport {
            seq: packet.seq,
            action,
            time,
            attempts,
            outcome,
            coalesced_edges: self.pending.coalesced(),
        };
        sink.emit(&AppEvent::Dispatched(report));
        Some(report)
    }

    /// [`poll`](Self::poll) followed by the configured pause: the
    /// post-dispatch delay after a dispatch, the idle poll interval otherwise.
    pub fn run_once(
        &mut self,
        clock: &impl ClockPort,
        tx: &mut impl TransmitPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> Option<DispatchReport> {
        let report = self.poll(clock, tx, sink);
        if report.is_some() {
            delay.delay_ms(self.dispatch_delay_ms);
        } else {
            delay.delay_ms(self.idle_poll_ms);
        }
        report
    }

    fn deliver(&self, bytes: &[u8], tx: &mut impl TransmitPort) -> (u8, DeliveryOutcome) {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match tx.send(bytes) {
                Ok(()) => return (attempt, DeliveryOutcome::Delivered),
                Err(e) if attempt >= self.transmit_attempts => {
                    return (attempt, DeliveryOutcome::Dropped(e));
                }
                Err(e) => debug!("send attempt {} failed: {}", attempt, e),
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
