//! Fixed-layout command packet.
//!
//! Wire format (little-endian, no padding):
//! ```text
//! ┌────────┬────────┬────────┬────────┬─────────────────────┐
//! │ length │ time   │ seq    │ action │ signature           │
//! │ u16    │ u16    │ u16    │ i8     │ [u8; 32]            │
//! └────────┴────────┴────────┴────────┴─────────────────────┘
//!   0        2        4        6        7                  39
//! ```
//!
//! The receiver reads `length` first and then the remainder of the record.
//! The signature covers bytes `0..7`.

use core::fmt;

use super::DoorAction;

/// Signature field size (SHA-256 output).
pub const SIGNATURE_LEN: usize = 32;

/// Bytes covered by the signature: length + time + seq + action.
pub const HEADER_LEN: usize = 3 * core::mem::size_of::<u16>() + core::mem::size_of::<i8>();

/// Total encoded size. Written into every packet's `length` field.
pub const PACKET_LEN: usize = HEADER_LEN + SIGNATURE_LEN;

/// Decode failures for a captured packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    /// Input is not exactly [`PACKET_LEN`] bytes.
    WrongSize(usize),
    /// Embedded `length` field disagrees with the fixed layout.
    LengthMismatch(u16),
    /// `action` byte is not a known [`DoorAction`] code.
    UnknownAction(i8),
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongSize(n) => write!(f, "expected {PACKET_LEN} bytes, got {n}"),
            Self::LengthMismatch(n) => write!(f, "length field {n} != {PACKET_LEN}"),
            Self::UnknownAction(c) => write!(f, "unknown action code {c}"),
        }
    }
}

/// One command record as it travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandPacket {
    pub length: u16,
    pub time: u16,
    pub seq: u16,
    pub action: DoorAction,
    pub signature: [u8; SIGNATURE_LEN],
}

impl CommandPacket {
    /// The bytes the signature is computed over.
    pub fn header_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..2].copy_from_slice(&self.length.to_le_bytes());
        out[2..4].copy_from_slice(&self.time.to_le_bytes());
        out[4..6].copy_from_slice(&self.seq.to_le_bytes());
        out[6] = self.action.code() as u8;
        out
    }

    /// Full wire encoding.
    pub fn to_bytes(&self) -> [u8; PACKET_LEN] {
        let mut out = [0u8; PACKET_LEN];
        out[..HEADER_LEN].copy_from_slice(&self.header_bytes());
        out[HEADER_LEN..].copy_from_slice(&self.signature);
        out
    }

    /// Parse a captured record.
    pub fn from_bytes(data: &[u8]) -> Result<Self, PacketError> {
        if data.len() != PACKET_LEN {
            return Err(PacketError::WrongSize(data.len()));
        }
        let length = u16::from_le_bytes([data[0], data[1]]);
        if length as usize != PACKET_LEN {
            return Err(PacketError::LengthMismatch(length));
        }
        let code = data[6] as i8;
        let action = DoorAction::from_code(code).ok_or(PacketError::UnknownAction(code))?;

        let mut signature = [0u8; SIGNATURE_LEN];
        signature.copy_from_slice(&data[HEADER_LEN..]);

        Ok(Self {
            length,
            time: u16::from_le_bytes([data[2], data[3]]),
            seq: u16::from_le_bytes([data[4], data[5]]),
            action,
            signature,
        })
    }
}

/// Owns the sequence counter and stamps out unsigned packets.
///
/// The counter lives for the whole process and is only touched from the
/// main loop.
#[derive(Debug)]
pub struct PacketBuilder {
    length: u16,
    seq: u16,
}

impl Default for PacketBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketBuilder {
    /// Start with `seq = 0`; the first built packet carries `seq = 1`.
    pub const fn new() -> Self {
        Self::with_sequence(0)
    }

    /// Start from an arbitrary counter value. The next packet carries `seq + 1`.
    pub const fn with_sequence(seq: u16) -> Self {
        Self {
            length: PACKET_LEN as u16,
            seq,
        }
    }

    /// Sequence number of the most recently built packet.
    pub fn sequence(&self) -> u16 {
        self.seq
    }

    /// Advance the counter and return an unsigned packet.
    pub fn build(&mut self, action: DoorAction, time: u16) -> CommandPacket {
        self.seq = self.seq.wrapping_add(1);
        CommandPacket {
            length: self.length,
            time,
            seq: self.seq,
            action,
            signature: [0; SIGNATURE_LEN],
        }
    }
}
