//! Link state tracking

use std::time::Instant;

use ember_detect::PortDescriptor;

/// Connection lifecycle of the downstream device
///
/// Owned exclusively by the connection manager; nothing else writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No device session; polling for an attach
    #[default]
    Disconnected,
    /// A peripheral attached; opening the session and checking identity
    Verifying,
    /// Identified device with an open session; trigger armed
    Connected,
}

impl LinkState {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Verifying => "verifying",
            Self::Connected => "connected",
        }
    }

    /// Whether a session is held and the trigger is armed
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Record of the accepted peripheral
#[derive(Debug, Clone)]
pub struct DeviceState {
    /// Serial port the device is attached on
    pub port: String,
    /// USB Vendor ID (if reported)
    pub vid: Option<u16>,
    /// USB Product ID (if reported)
    pub pid: Option<u16>,
    /// USB manufacturer string
    pub manufacturer: Option<String>,
    /// USB product string
    pub product: Option<String>,
    /// USB serial number
    pub serial_number: Option<String>,
    /// When the attach was observed
    pub attached_at: Instant,
}

impl DeviceState {
    /// Record the peripheral described by an attach event
    pub fn new(descriptor: &PortDescriptor) -> Self {
        Self {
            port: descriptor.port.clone(),
            vid: descriptor.vid,
            pid: descriptor.pid,
            manufacturer: descriptor.manufacturer.clone(),
            product: descriptor.product.clone(),
            serial_number: descriptor.serial_number.clone(),
            attached_at: Instant::now(),
        }
    }

    /// Format the numeric IDs for log lines
    pub fn vid_pid_display(&self) -> String {
        match (self.vid, self.pid) {
            (Some(vid), Some(pid)) => format!("{vid:04x}:{pid:04x}"),
            _ => "----:----".to_string(),
        }
    }

    /// Format the descriptor strings for log lines
    pub fn identity_display(&self) -> String {
        format!(
            "{}, {} ({})",
            self.manufacturer.as_deref().unwrap_or("?"),
            self.product.as_deref().unwrap_or("?"),
            self.serial_number.as_deref().unwrap_or("?")
        )
    }
}
