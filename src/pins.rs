//! GPIO pin assignments for the Doorlink transmitter board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Trigger inputs (active-low with internal pull-up, falling edge)
// ---------------------------------------------------------------------------

/// "Open door" request line.
pub const DOOR_OPEN_GPIO: i32 = 27;
/// "Close door" request line.
pub const DOOR_CLOSE_GPIO: i32 = 26;
