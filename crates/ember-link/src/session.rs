//! Serial session to the downstream device
//!
//! The session wraps the open transport and frames outgoing protocol
//! lines. It is generic over the I/O type so tests can substitute an
//! in-memory stream for a real serial port; see
//! [`tokio::io::duplex`] for the test double.

use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::trace;

use crate::error::LinkError;

/// An open transport session to the device
///
/// Frames are text lines terminated CRLF; the device never acknowledges,
/// so sends are best-effort.
pub struct DeviceSession<T> {
    port_name: String,
    io: T,
}

impl DeviceSession<SerialStream> {
    /// Open a session on a serial port
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self, LinkError> {
        let stream = tokio_serial::new(port_name, baud_rate)
            .timeout(Duration::from_millis(100))
            .open_native_async()
            .map_err(|e| LinkError::OpenFailed {
                port: port_name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self::new(port_name.to_string(), stream))
    }
}

impl<T> DeviceSession<T>
where
    T: AsyncWrite + Unpin + Send,
{
    /// Create a session over a custom I/O type
    ///
    /// For tests, use a `DuplexStream` from `tokio::io::duplex()`.
    pub fn new(port_name: String, io: T) -> Self {
        Self { port_name, io }
    }

    /// The port this session is open on
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Send one protocol frame
    pub async fn send_frame(&mut self, frame: &str) -> Result<(), LinkError> {
        self.io.write_all(frame.as_bytes()).await?;
        self.io.write_all(b"\r\n").await?;
        self.io.flush().await?;
        trace!("sent frame {:?} to {}", frame, self.port_name);
        Ok(())
    }
}

/// Produces device sessions for the connection manager
///
/// The manager retries `open` until the session reports ready, so a
/// failure here is not final.
pub trait SessionOpener {
    /// The transport type of opened sessions
    type Io: AsyncWrite + Unpin + Send;

    /// Try to open a session on the given port
    fn open(&self, port_name: &str) -> Result<DeviceSession<Self::Io>, LinkError>;
}

/// Opener backed by real serial ports
#[derive(Debug, Clone)]
pub struct SerialOpener {
    baud_rate: u32,
}

impl SerialOpener {
    /// Create an opener with the host-side baud rate
    pub fn new(baud_rate: u32) -> Self {
        Self { baud_rate }
    }
}

impl SessionOpener for SerialOpener {
    type Io = SerialStream;

    fn open(&self, port_name: &str) -> Result<DeviceSession<SerialStream>, LinkError> {
        DeviceSession::open(port_name, self.baud_rate)
    }
}
