//! Door command wire protocol.
//!
//! ```text
//!  DoorAction ──▶ PacketBuilder ──▶ Signer ──▶ 39-byte record ──▶ TransmitPort
//!                    ▲
//!  WallTime ──▶ encode_time
//! ```
//!
//! Everything in here is pure logic: no I/O, no clocks, no allocation.

pub mod freshness;
pub mod packet;
pub mod signer;

pub use freshness::{FreshnessEncoder, WallTime, encode_time};
pub use packet::{CommandPacket, PacketBuilder, PacketError};
pub use signer::Signer;

use core::fmt;

/// Command carried in the `action` field of a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum DoorAction {
    Open = 1,
    Close = -1,
    /// Reserved on the receiver side; no trigger line produces it.
    Trunk = 3,
}

impl DoorAction {
    /// Wire encoding of the action.
    pub const fn code(self) -> i8 {
        self as i8
    }

    /// Decode a wire action code. Unknown codes yield `None`.
    pub const fn from_code(code: i8) -> Option<Self> {
        match code {
            1 => Some(Self::Open),
            -1 => Some(Self::Close),
            3 => Some(Self::Trunk),
            _ => None,
        }
    }
}

impl fmt::Display for DoorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Close => write!(f, "close"),
            Self::Trunk => write!(f, "trunk"),
        }
    }
}
