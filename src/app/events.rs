//! Outbound application events.
//!
//! The [`DoorController`](super::service::DoorController) and the startup
//! helpers emit these through the [`EventSink`](super::ports::EventSink)
//! port. Adapters on the other side decide what to do with them.

use crate::error::{StartupError, TransmitError};
use crate::protocol::DoorAction;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The controller is ready and polling for trigger edges.
    Started { next_seq: u16 },

    /// A boot precondition failed. Fatal for network, degraded for clock.
    StartupFailed(StartupError),

    /// One pending action was built, signed and handed to the transmitter.
    Dispatched(DispatchReport),

    /// The wall clock could not be read; `token` is the reused stale value.
    ClockUnavailable { token: u16 },
}

/// Result of a single transmission attempt sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Bytes were written and flushed. Says nothing about the receiver.
    Delivered,
    /// Every attempt failed; the command is gone.
    Dropped(TransmitError),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Summary of one dispatch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub seq: u16,
    pub action: DoorAction,
    pub time: u16,
    pub attempts: u8,
    pub outcome: DeliveryOutcome,
    /// Total edges coalesced since boot, sampled at dispatch time.
    pub coalesced_edges: u32,
}
