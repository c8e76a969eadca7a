//! Interrupt-to-main-loop edge capture.
//!
//! Trigger ISRs publish a door action; the main loop consumes it. The slot
//! holds at most one action, so a burst of edges collapses into a single
//! command.
//!
//! ```text
//! ┌─────────────┐
//! │ open ISR    │──┐   ┌──────────────────┐     ┌──────────────┐
//! │             │  ├──▶│  PendingAction   │────▶│  Main Loop   │
//! │ close ISR   │──┘   │  (1 slot, CAS)   │     │  (consumer)  │
//! └─────────────┘      └──────────────────┘     └──────────────┘
//! ```
//!
//! The slot is one atomic byte: `0` means empty, any other value is the
//! action's wire code. Claiming and publishing is a single compare-exchange,
//! so the consumer can never see the slot taken without also seeing the
//! action. The first edge of a burst wins; later edges are counted and
//! dropped until the main loop clears the slot.

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crate::protocol::DoorAction;

const EMPTY: u8 = 0;

/// Single-slot, lock-free pending-action cell.
#[derive(Debug)]
pub struct PendingAction {
    slot: AtomicU8,
    coalesced: AtomicU32,
}

impl Default for PendingAction {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingAction {
    pub const fn new() -> Self {
        Self {
            slot: AtomicU8::new(EMPTY),
            coalesced: AtomicU32::new(0),
        }
    }

    /// Record `action` if the slot is empty.
    ///
    /// Safe to call from ISR context: no locks, no allocation, bounded time.
    /// Returns `false` when the edge was coalesced into an already pending
    /// action.
    pub fn signal(&self, action: DoorAction) -> bool {
        let code = action.code() as u8;
        match self
            .slot
            .compare_exchange(EMPTY, code, Ordering::Release, Ordering::Relaxed)
        {
            Ok(_) => true,
            Err(_) => {
                self.coalesced.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// The action waiting for dispatch, if any. Does not consume it.
    pub fn pending(&self) -> Option<DoorAction> {
        match self.slot.load(Ordering::Acquire) {
            EMPTY => None,
            code => DoorAction::from_code(code as i8),
        }
    }

    /// Release the slot once the pending action has been transmitted.
    pub fn clear(&self) {
        self.slot.store(EMPTY, Ordering::Release);
    }

    pub fn is_pending(&self) -> bool {
        self.slot.load(Ordering::Acquire) != EMPTY
    }

    /// Edges dropped because an action was already pending.
    pub fn coalesced(&self) -> u32 {
        self.coalesced.load(Ordering::Relaxed)
    }
}
