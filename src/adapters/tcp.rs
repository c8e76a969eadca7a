//! TCP fire-and-forget transmitter.
//!
//! Implements [`TransmitPort`]. Every `send` opens a new connection to the
//! configured receiver, writes the whole buffer, flushes and closes. Nothing
//! is ever read back.
//!
//! ESP-IDF ships a BSD socket layer behind `std::net`, so the same code runs
//! on target and on the host.

use std::io::Write;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, warn};

use crate::app::ports::TransmitPort;
use crate::config::{self, ControllerConfig};
use crate::error::TransmitError;

/// One-connection-per-packet TCP client.
#[derive(Debug, Clone)]
pub struct TcpTransmitter {
    host: heapless::String<64>,
    port: u16,
    connect_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl TcpTransmitter {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: config::bounded(host),
            port,
            connect_timeout: None,
            write_timeout: None,
        }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        let mut tx = Self::new(&config.remote_host, config.remote_port);
        tx.connect_timeout = Some(ms(config.connect_timeout_ms));
        tx.write_timeout = Some(ms(config.write_timeout_ms));
        tx
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Resolve the endpoint. Re-resolved on every send so DNS changes apply.
    fn resolve(&self) -> Result<SocketAddr, TransmitError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or(TransmitError::InvalidEndpoint)
    }

    fn open(&self, addr: &SocketAddr) -> Result<TcpStream, TransmitError> {
        let stream = match self.connect_timeout {
            Some(t) => TcpStream::connect_timeout(addr, t),
            None => TcpStream::connect(addr),
        };
        stream.map_err(|e| TransmitError::Connect(e.kind()))
    }
}

fn ms(v: u32) -> Duration {
    Duration::from_millis(u64::from(v))
}

impl TransmitPort for TcpTransmitter {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransmitError> {
        let addr = self.resolve()?;
        let mut stream = self.open(&addr).inspect_err(|e| {
            warn!("TCP: {} -> {}", addr, e);
        })?;

        stream
            .set_write_timeout(self.write_timeout)
            .map_err(|e| TransmitError::Write(e.kind()))?;
        stream
            .write_all(bytes)
            .and_then(|()| stream.flush())
            .map_err(|e| TransmitError::Write(e.kind()))?;

        // The peer may already have closed; the bytes are out either way.
        let _ = stream.shutdown(Shutdown::Both);
        debug!("TCP: {} bytes -> {}", bytes.len(), addr);
        Ok(())
    }
}
