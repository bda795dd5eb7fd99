//! Serial port watching
//!
//! This module provides the host-polling primitive for the connection
//! manager: each poll enumerates the serial ports and reports which
//! serial-capable peripherals appeared or disappeared since the last poll.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serialport::{available_ports, SerialPortType};
use tracing::{debug, info};

use crate::error::DetectError;

/// Descriptor for an attached serial port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDescriptor {
    /// Port name (e.g., /dev/ttyUSB0, COM3)
    pub port: String,
    /// USB Vendor ID (if USB)
    pub vid: Option<u16>,
    /// USB Product ID (if USB)
    pub pid: Option<u16>,
    /// USB serial number (if available)
    pub serial_number: Option<String>,
    /// USB manufacturer string
    pub manufacturer: Option<String>,
    /// USB product string
    pub product: Option<String>,
}

impl PortDescriptor {
    /// Create from serialport crate's port info
    pub fn from_serialport(name: String, port_type: &SerialPortType) -> Self {
        match port_type {
            SerialPortType::UsbPort(usb) => Self {
                port: name,
                vid: Some(usb.vid),
                pid: Some(usb.pid),
                serial_number: usb.serial_number.clone(),
                manufacturer: usb.manufacturer.clone(),
                product: usb.product.clone(),
            },
            _ => Self {
                port: name,
                vid: None,
                pid: None,
                serial_number: None,
                manufacturer: None,
                product: None,
            },
        }
    }

    /// Whether this is a USB-attached (serial-capable peripheral) port
    pub fn is_usb(&self) -> bool {
        self.vid.is_some()
    }

    /// Display label: product description when reported
    pub fn label(&self) -> &str {
        self.product.as_deref().unwrap_or("Unknown")
    }
}

/// An attach or detach edge observed between polls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A serial-capable peripheral appeared
    Attached(PortDescriptor),
    /// A previously seen peripheral disappeared
    Detached(PortDescriptor),
}

/// Host watcher configuration
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Skip ports matching these patterns
    pub skip_patterns: Vec<String>,
    /// Report only USB-attached ports
    pub usb_only: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            skip_patterns: vec![
                // Bluetooth ports on macOS
                "Bluetooth".to_string(),
                // Debug/logging ports
                "debug".to_string(),
            ],
            usb_only: true,
        }
    }
}

/// Serial port watcher
///
/// Remembers the ports seen on the previous poll; the difference between
/// two consecutive polls is the attach/detach edge stream the connection
/// manager consumes.
pub struct HostWatcher {
    config: WatcherConfig,
    known: BTreeMap<String, PortDescriptor>,
}

impl HostWatcher {
    /// Create a new watcher with default configuration
    pub fn new() -> Self {
        Self::with_config(WatcherConfig::default())
    }

    /// Create a watcher with custom configuration
    pub fn with_config(config: WatcherConfig) -> Self {
        Self {
            config,
            known: BTreeMap::new(),
        }
    }

    /// Enumerate the ports and report edges since the previous poll
    pub fn poll(&mut self) -> Result<Vec<HostEvent>, DetectError> {
        let ports = available_ports().map_err(|e| DetectError::EnumerationFailed(e.to_string()))?;

        let scan: Vec<_> = ports
            .into_iter()
            .map(|p| PortDescriptor::from_serialport(p.port_name, &p.port_type))
            .collect();

        Ok(self.diff(scan))
    }

    /// Compute the edges between the previous scan and the given one
    ///
    /// Exposed separately so the attach/detach logic can be exercised
    /// without hardware.
    pub fn diff(&mut self, scan: Vec<PortDescriptor>) -> Vec<HostEvent> {
        let mut current = BTreeMap::new();
        for descriptor in scan {
            if self.should_skip_port(&descriptor) {
                continue;
            }
            current.insert(descriptor.port.clone(), descriptor);
        }

        let mut events = Vec::new();

        for (port, descriptor) in &current {
            if !self.known.contains_key(port) {
                info!("port attached: {} - {}", port, descriptor.label());
                events.push(HostEvent::Attached(descriptor.clone()));
            }
        }

        for (port, descriptor) in &self.known {
            if !current.contains_key(port) {
                info!("port detached: {}", port);
                events.push(HostEvent::Detached(descriptor.clone()));
            }
        }

        if events.is_empty() {
            debug!("no port changes, {} port(s) present", current.len());
        }

        self.known = current;
        events
    }

    /// Check if a port should be skipped
    fn should_skip_port(&self, descriptor: &PortDescriptor) -> bool {
        if self.config.usb_only && !descriptor.is_usb() {
            return true;
        }
        self.config
            .skip_patterns
            .iter()
            .any(|pattern| descriptor.port.contains(pattern))
    }
}

impl Default for HostWatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    fn usb_descriptor(port: &str, product: &str) -> PortDescriptor {
        PortDescriptor::from_serialport(
            port.to_string(),
            &SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x0403,
                pid: 0x6001,
                serial_number: Some("12345".to_string()),
                manufacturer: Some("FTDI".to_string()),
                product: Some(product.to_string()),
            }),
        )
    }

    #[test]
    fn test_descriptor_from_usb() {
        let descriptor = usb_descriptor("/dev/ttyUSB0", "FT232R");

        assert_eq!(descriptor.vid, Some(0x0403));
        assert_eq!(descriptor.pid, Some(0x6001));
        assert_eq!(descriptor.label(), "FT232R");
        assert!(descriptor.is_usb());
    }

    #[test]
    fn test_non_usb_port_skipped() {
        let mut watcher = HostWatcher::new();
        let native =
            PortDescriptor::from_serialport("/dev/ttyS0".to_string(), &SerialPortType::Unknown);

        assert!(watcher.diff(vec![native]).is_empty());
    }

    #[test]
    fn test_attach_edge_reported_once() {
        let mut watcher = HostWatcher::new();
        let descriptor = usb_descriptor("/dev/ttyUSB0", "Heater");

        let events = watcher.diff(vec![descriptor.clone()]);
        assert_eq!(events, vec![HostEvent::Attached(descriptor.clone())]);

        // Still attached on the next poll: no edge
        assert!(watcher.diff(vec![descriptor]).is_empty());
    }

    #[test]
    fn test_detach_edge_reported() {
        let mut watcher = HostWatcher::new();
        let descriptor = usb_descriptor("/dev/ttyUSB0", "Heater");

        watcher.diff(vec![descriptor.clone()]);
        let events = watcher.diff(vec![]);

        assert_eq!(events, vec![HostEvent::Detached(descriptor)]);
    }

    #[test]
    fn test_replug_reports_both_edges() {
        let mut watcher = HostWatcher::new();
        let descriptor = usb_descriptor("/dev/ttyUSB0", "Heater");

        watcher.diff(vec![descriptor.clone()]);
        watcher.diff(vec![]);
        let events = watcher.diff(vec![descriptor.clone()]);

        assert_eq!(events, vec![HostEvent::Attached(descriptor)]);
    }

    #[test]
    fn test_skip_patterns() {
        let mut watcher = HostWatcher::new();
        let descriptor = usb_descriptor("/dev/cu.Bluetooth-Incoming-Port", "Bluetooth");

        assert!(watcher.diff(vec![descriptor]).is_empty());
    }
}
