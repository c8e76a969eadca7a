//! Unified error types for the Doorlink firmware.
//!
//! `Error` covers the failures that abort boot. Transmit failures never
//! abort; a [`TransmitError`] travels inside an
//! [`AppEvent`](crate::app::events::AppEvent) instead. All types here are
//! `Copy`.

use core::fmt;
use core::time::Duration;
use std::io::ErrorKind;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A boot precondition never became true.
    Startup(StartupError),
    /// The shared key could not be loaded.
    Key(KeyError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Startup(e) => write!(f, "startup: {e}"),
            Self::Key(e) => write!(f, "key: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Startup errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupError {
    /// Network association did not complete within the configured window.
    NetworkTimeout(Duration),
    /// Wall-clock synchronisation did not complete within the configured window.
    ClockSyncTimeout(Duration),
    /// The network facility refused to start (bad credentials, driver error).
    NetworkUnavailable,
    /// The time synchronisation service could not be started.
    ClockSyncUnavailable,
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkTimeout(d) => write!(f, "network not up after {} ms", d.as_millis()),
            Self::ClockSyncTimeout(d) => write!(f, "clock not synced after {} ms", d.as_millis()),
            Self::NetworkUnavailable => write!(f, "network facility unavailable"),
            Self::ClockSyncUnavailable => write!(f, "clock sync service unavailable"),
        }
    }
}

impl From<StartupError> for Error {
    fn from(e: StartupError) -> Self {
        Self::Startup(e)
    }
}

// ---------------------------------------------------------------------------
// Key errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    /// Persistent storage failed while reading the byte at `offset`.
    ReadFailed { offset: usize },
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed { offset } => write!(f, "storage read failed at offset {offset}"),
        }
    }
}

impl From<KeyError> for Error {
    fn from(e: KeyError) -> Self {
        Self::Key(e)
    }
}

// ---------------------------------------------------------------------------
// Transmit errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitError {
    /// The configured endpoint is not a valid socket address.
    InvalidEndpoint,
    /// TCP connect failed (refused, unreachable, timed out).
    Connect(ErrorKind),
    /// The connection dropped while writing or flushing the packet.
    Write(ErrorKind),
}

impl fmt::Display for TransmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEndpoint => write!(f, "invalid endpoint address"),
            Self::Connect(kind) => write!(f, "connect failed ({kind})"),
            Self::Write(kind) => write!(f, "write failed ({kind})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
