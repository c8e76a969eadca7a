//! Door trigger inputs.
//!
//! ## Hardware
//!
//! Two active-low request lines with internal pull-up: open (GPIO 27) and
//! close (GPIO 26). Each falling edge records its action into the shared
//! [`PendingAction`] cell from interrupt context.
//!
//! ESP-IDF disables a GPIO interrupt after every notification, so the main
//! loop calls [`TriggerInputs::rearm`] once per iteration. Edges arriving
//! while a dispatch is in flight are either coalesced (slot occupied) or
//! never seen (interrupt disarmed). Either way they are lost.

use std::sync::Arc;

use crate::events::PendingAction;
use crate::pins;
use crate::protocol::DoorAction;

#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::gpio::{AnyInputPin, Input, InterruptType, PinDriver, Pull};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::EspError;

/// Binding of one GPIO to the action its edge requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerLine {
    gpio: i32,
    action: DoorAction,
}

impl TriggerLine {
    pub const OPEN: Self = Self::new(pins::DOOR_OPEN_GPIO, DoorAction::Open);
    pub const CLOSE: Self = Self::new(pins::DOOR_CLOSE_GPIO, DoorAction::Close);

    pub const fn new(gpio: i32, action: DoorAction) -> Self {
        Self { gpio, action }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    pub fn action(&self) -> DoorAction {
        self.action
    }

    /// Edge handler body. Lock-free, non-blocking, ISR-safe.
    #[inline]
    pub fn on_edge(&self, pending: &PendingAction) -> bool {
        pending.signal(self.action)
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct TriggerInputs {
    open: PinDriver<'static, AnyInputPin, Input>,
    close: PinDriver<'static, AnyInputPin, Input>,
}

#[cfg(target_os = "espidf")]
impl TriggerInputs {
    /// Configure both lines (input, pull-up, falling edge) and subscribe
    /// their ISR callbacks to `pending`.
    pub fn new(
        open_pin: AnyInputPin,
        close_pin: AnyInputPin,
        pending: &Arc<PendingAction>,
    ) -> Result<Self, EspError> {
        let open = Self::bind(open_pin, TriggerLine::OPEN, Arc::clone(pending))?;
        let close = Self::bind(close_pin, TriggerLine::CLOSE, Arc::clone(pending))?;
        log::info!(
            "Triggers: open=GPIO{} close=GPIO{} (pull-up, falling edge)",
            TriggerLine::OPEN.gpio(),
            TriggerLine::CLOSE.gpio()
        );
        Ok(Self { open, close })
    }

    fn bind(
        pin: AnyInputPin,
        line: TriggerLine,
        pending: Arc<PendingAction>,
    ) -> Result<PinDriver<'static, AnyInputPin, Input>, EspError> {
        let mut driver = PinDriver::input(pin)?;
        driver.set_pull(Pull::Up)?;
        driver.set_interrupt_type(InterruptType::NegEdge)?;
        // SAFETY: the callback only performs a compare-and-swap and an
        // atomic increment on a cell it co-owns; no allocation, no locks.
        unsafe {
            driver.subscribe(move || {
                line.on_edge(&pending);
            })?;
        }
        driver.enable_interrupt()?;
        Ok(driver)
    }

    /// Re-enable both interrupts. Idempotent.
    pub fn rearm(&mut self) {
        for (driver, line) in [
            (&mut self.open, TriggerLine::OPEN),
            (&mut self.close, TriggerLine::CLOSE),
        ] {
            if let Err(e) = driver.enable_interrupt() {
                log::warn!("Triggers: re-arm GPIO{} failed ({})", line.gpio(), e);
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation
// ───────────────────────────────────────────────────────────────

/// Host stand-in: edges are injected by calling [`fire`](Self::fire).
#[cfg(not(target_os = "espidf"))]
pub struct TriggerInputs {
    pending: Arc<PendingAction>,
    armed: [bool; 2],
}

#[cfg(not(target_os = "espidf"))]
impl TriggerInputs {
    pub fn new(pending: &Arc<PendingAction>) -> Self {
        Self {
            pending: Arc::clone(pending),
            armed: [true; 2],
        }
    }

    /// Simulate a falling edge on `gpio`. Returns `true` if the edge was
    /// recorded. Mirrors the hardware: a fired line stays disarmed until
    /// [`rearm`](Self::rearm).
    pub fn fire(&mut self, gpio: i32) -> bool {
        let Some(idx) = Self::index(gpio) else {
            return false;
        };
        if !self.armed[idx] {
            return false;
        }
        self.armed[idx] = false;
        let line = [TriggerLine::OPEN, TriggerLine::CLOSE][idx];
        line.on_edge(&self.pending)
    }

    pub fn rearm(&mut self) {
        self.armed = [true; 2];
    }

    fn index(gpio: i32) -> Option<usize> {
        match gpio {
            g if g == TriggerLine::OPEN.gpio() => Some(0),
            g if g == TriggerLine::CLOSE.gpio() => Some(1),
            _ => None,
        }
    }
}
