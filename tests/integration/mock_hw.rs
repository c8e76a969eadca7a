//! Mock adapters for integration tests.
//!
//! Each mock records what the controller asked of it so tests can assert on
//! the full interaction history without sockets, radios or flash.

use std::cell::Cell;
use std::collections::VecDeque;
use std::io::ErrorKind;

use doorlink::app::events::AppEvent;
use doorlink::app::ports::{
    ClockPort, ClockSyncError, ClockSyncPort, ConnectivityError, ConnectivityPort, EventSink,
    KeyStorePort, StorageError, TransmitPort,
};
use doorlink::error::TransmitError;
use doorlink::protocol::WallTime;
use embedded_hal::delay::DelayNs;

// ── Clock ─────────────────────────────────────────────────────

/// Clock that replays a script of readings, then repeats the last one.
pub struct MockClock {
    readings: std::cell::RefCell<VecDeque<Option<WallTime>>>,
    last: Cell<Option<WallTime>>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn fixed(hour: u8, minute: u8, second: u8) -> Self {
        Self::script(vec![WallTime::new(hour, minute, second)])
    }

    pub fn script(readings: Vec<Option<WallTime>>) -> Self {
        Self {
            readings: std::cell::RefCell::new(readings.into()),
            last: Cell::new(None),
        }
    }
}

impl ClockPort for MockClock {
    fn now_utc(&self) -> Option<WallTime> {
        match self.readings.borrow_mut().pop_front() {
            Some(r) => {
                self.last.set(r);
                r
            }
            None => self.last.get(),
        }
    }
}

// ── Transmitter ───────────────────────────────────────────────

/// Records every buffer it is asked to send; optionally fails.
pub struct MockTransmitter {
    pub sent: Vec<Vec<u8>>,
    pub attempts: u32,
    fail_remaining: u32,
    fail_with: TransmitError,
}

#[allow(dead_code)]
impl MockTransmitter {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            attempts: 0,
            fail_remaining: 0,
            fail_with: TransmitError::Connect(ErrorKind::ConnectionRefused),
        }
    }

    /// Fail the next `n` sends with a refused connection.
    pub fn refusing(n: u32) -> Self {
        Self {
            fail_remaining: n,
            ..Self::new()
        }
    }

    pub fn always_refusing() -> Self {
        Self::refusing(u32::MAX)
    }
}

impl TransmitPort for MockTransmitter {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransmitError> {
        self.attempts += 1;
        if self.fail_remaining > 0 {
            self.fail_remaining -= 1;
            return Err(self.fail_with);
        }
        self.sent.push(bytes.to_vec());
        Ok(())
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Records requested pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingDelay {
    pub pauses_ms: Vec<u32>,
}

#[allow(dead_code)]
impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.pauses_ms.iter().map(|&ms| u64::from(ms)).sum()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.pauses_ms.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.pauses_ms.push(ms);
    }
}

// ── Key store ─────────────────────────────────────────────────

pub struct MockKeyStore {
    pub bytes: Vec<u8>,
    pub fail_at: Option<usize>,
}

#[allow(dead_code)]
impl MockKeyStore {
    pub fn with_key(key: [u8; 32]) -> Self {
        Self {
            bytes: key.to_vec(),
            fail_at: None,
        }
    }
}

impl KeyStorePort for MockKeyStore {
    fn read(&self, offset: usize) -> Result<u8, StorageError> {
        if self.fail_at == Some(offset) {
            return Err(StorageError::IoError);
        }
        self.bytes.get(offset).copied().ok_or(StorageError::NotFound)
    }
}

// ── Network ───────────────────────────────────────────────────

/// Network that comes up after a fixed number of polls.
pub struct MockNet {
    pub connect_calls: u32,
    pub polls: u32,
    up_after_polls: Option<u32>,
    connect_error: Option<ConnectivityError>,
    connected: bool,
}

#[allow(dead_code)]
impl MockNet {
    pub fn up_after(polls: u32) -> Self {
        Self {
            connect_calls: 0,
            polls: 0,
            up_after_polls: Some(polls),
            connect_error: None,
            connected: false,
        }
    }

    pub fn never_up() -> Self {
        Self {
            up_after_polls: None,
            ..Self::up_after(0)
        }
    }

    pub fn rejecting(e: ConnectivityError) -> Self {
        Self {
            connect_error: Some(e),
            ..Self::never_up()
        }
    }
}

impl ConnectivityPort for MockNet {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        self.connect_calls += 1;
        if let Some(e) = self.connect_error {
            return Err(e);
        }
        if self.up_after_polls == Some(0) {
            self.connected = true;
        }
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn poll(&mut self) {
        self.polls += 1;
        if self.up_after_polls.is_some_and(|n| self.polls >= n) {
            self.connected = true;
        }
    }

    fn set_credentials(&mut self, _ssid: &str, _password: &str) -> Result<(), ConnectivityError> {
        Ok(())
    }
}

// ── Clock sync ────────────────────────────────────────────────

pub struct MockSync {
    pub started: bool,
    synced_after_checks: Option<u32>,
    checks: Cell<u32>,
    start_fails: bool,
}

#[allow(dead_code)]
impl MockSync {
    pub fn synced_after(checks: u32) -> Self {
        Self {
            started: false,
            synced_after_checks: Some(checks),
            checks: Cell::new(0),
            start_fails: false,
        }
    }

    pub fn never_synced() -> Self {
        Self {
            synced_after_checks: None,
            ..Self::synced_after(0)
        }
    }

    pub fn broken() -> Self {
        Self {
            start_fails: true,
            ..Self::never_synced()
        }
    }
}

impl ClockSyncPort for MockSync {
    fn start(&mut self) -> Result<(), ClockSyncError> {
        if self.start_fails {
            return Err(ClockSyncError::Unavailable);
        }
        self.started = true;
        Ok(())
    }

    fn is_synced(&self) -> bool {
        let n = self.checks.get() + 1;
        self.checks.set(n);
        self.started && self.synced_after_checks.is_some_and(|after| n > after)
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
