//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DoorController (domain)
//! ```
//!
//! Driven adapters (clock, key storage, network, socket, event sinks)
//! implement these traits. The [`DoorController`](super::service::DoorController)
//! and the [`startup`](super::startup) helpers consume them via generics, so
//! the dispatch pipeline never touches hardware directly.
//!
//! ## Security notes
//!
//! - **KeyStorePort** is read-only. Provisioning happens out of band.
//! - **ConfigPort** implementations MUST validate before persisting.

use core::fmt;

use crate::config::ControllerConfig;
use crate::error::TransmitError;
use crate::protocol::WallTime;

// ───────────────────────────────────────────────────────────────
// Clock ports (driven adapter: RTC / SNTP → domain)
// ───────────────────────────────────────────────────────────────

/// Wall-clock source.
pub trait ClockPort {
    /// Current UTC time of day, or `None` if the clock cannot be read.
    ///
    /// An unsynchronised clock still returns a reading; the caller cannot
    /// tell it apart from a synchronised one.
    fn now_utc(&self) -> Option<WallTime>;
}

/// Network time synchronisation facility.
pub trait ClockSyncPort {
    /// Kick off synchronisation. Returns immediately.
    fn start(&mut self) -> Result<(), ClockSyncError>;

    /// Whether at least one synchronisation has completed.
    fn is_synced(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: domain ↔ WiFi STA)
// ───────────────────────────────────────────────────────────────

pub trait ConnectivityPort {
    fn connect(&mut self) -> Result<(), ConnectivityError>;
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;
    /// Drive reconnection after a drop.
    fn poll(&mut self);
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError>;
}

// ───────────────────────────────────────────────────────────────
// Key storage port (driven adapter: NVS → Key Provider)
// ───────────────────────────────────────────────────────────────

/// Byte-addressed persistent store holding the shared secret.
pub trait KeyStorePort {
    fn read(&self, offset: usize) -> Result<u8, StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists controller configuration.
///
/// # Security
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`ControllerConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<ControllerConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &ControllerConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Transmit port (driven adapter: domain → TCP socket)
// ───────────────────────────────────────────────────────────────

/// One-shot packet delivery.
///
/// Each call opens a fresh connection, writes `bytes`, flushes and closes.
/// No acknowledgement is read.
pub trait TransmitPort {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransmitError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`KeyStorePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested offset or key does not exist.
    NotFound,
    /// Generic I/O error.
    IoError,
}

/// Errors from [`ClockSyncPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSyncError {
    /// The SNTP service could not be started.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
    AlreadyConnected,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl fmt::Display for ClockSyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "SNTP service unavailable"),
        }
    }
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
            Self::AlreadyConnected => write!(f, "already connected to AP"),
        }
    }
}
