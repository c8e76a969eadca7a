//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{error, info, warn};

use crate::app::events::{AppEvent, DeliveryOutcome};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { next_seq } => {
                info!("START | listening for triggers, next_seq={}", next_seq);
            }
            AppEvent::StartupFailed(e) => {
                error!("BOOT  | {}", e);
            }
            AppEvent::Dispatched(r) => match r.outcome {
                DeliveryOutcome::Delivered => {
                    info!(
                        "TX    | seq={} action={} time={} attempts={} coalesced={}",
                        r.seq, r.action, r.time, r.attempts, r.coalesced_edges,
                    );
                }
                DeliveryOutcome::Dropped(e) => {
                    warn!(
                        "DROP  | seq={} action={} time={} attempts={} | {}",
                        r.seq, r.action, r.time, r.attempts, e,
                    );
                }
            },
            AppEvent::ClockUnavailable { token } => {
                warn!("CLOCK | unreadable, reusing token {}", token);
            }
        }
    }
}
