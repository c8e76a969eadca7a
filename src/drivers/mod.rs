//! Trigger inputs and the task watchdog.

pub mod trigger;
pub mod watchdog;
