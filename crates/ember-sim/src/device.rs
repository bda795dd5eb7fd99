//! Virtual heater device
//!
//! Tracks the state a real heater would hold after each protocol frame.
//! The device never acknowledges, matching the real protocol: it only
//! consumes lines.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, BufReader, DuplexStream};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Virtual heater for testing
///
/// Parses `P=<w>W` and `F=<s>S` frames, tracks the commanded power level
/// and the last firing duration, and stores every received frame for test
/// verification.
#[derive(Debug, Default)]
pub struct VirtualDevice {
    /// Identifier for logging
    id: String,
    power_w: u16,
    last_fire_s: Option<u16>,
    /// Frames received (for test verification)
    received_frames: Vec<String>,
}

impl VirtualDevice {
    /// Create a new virtual device
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Get the identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Commanded power level in watts
    pub fn power_w(&self) -> u16 {
        self.power_w
    }

    /// Duration of the most recent firing cycle, in seconds
    pub fn last_fire_seconds(&self) -> Option<u16> {
        self.last_fire_s
    }

    /// Frames received so far, in arrival order
    pub fn received_frames(&self) -> &[String] {
        &self.received_frames
    }

    /// Process one protocol frame
    ///
    /// Returns true if device state changed. Unrecognized frames are
    /// recorded but change nothing.
    pub fn process_frame(&mut self, line: &str) -> bool {
        let frame = line.trim_end_matches(['\r', '\n']).trim();
        if frame.is_empty() {
            return false;
        }
        self.received_frames.push(frame.to_string());

        if let Some(watts) = frame
            .strip_prefix("P=")
            .and_then(|rest| rest.strip_suffix('W'))
            .and_then(|digits| digits.parse::<u16>().ok())
        {
            debug!("{}: power set to {}W", self.id, watts);
            if self.power_w != watts {
                self.power_w = watts;
                return true;
            }
            return false;
        }

        if let Some(seconds) = frame
            .strip_prefix("F=")
            .and_then(|rest| rest.strip_suffix('S'))
            .and_then(|digits| digits.parse::<u16>().ok())
        {
            debug!("{}: firing for {}s", self.id, seconds);
            self.last_fire_s = Some(seconds);
            return true;
        }

        error!("{}: unrecognized frame {:?}", self.id, frame);
        false
    }
}

/// Wires a [`VirtualDevice`] behind an in-memory stream
///
/// The returned `DuplexStream` is the controller-facing end; the spawned
/// task reads lines off the other end and feeds them to the shared
/// device.
pub struct VirtualDeviceIo {
    device: Arc<Mutex<VirtualDevice>>,
    task: JoinHandle<()>,
}

impl VirtualDeviceIo {
    /// Spawn a device actor and return the controller-facing stream
    pub fn spawn(id: impl Into<String>) -> (DuplexStream, Self) {
        let (near, far) = tokio::io::duplex(1024);
        let device = Arc::new(Mutex::new(VirtualDevice::new(id)));

        let task_device = Arc::clone(&device);
        let task = tokio::spawn(async move {
            let mut lines = BufReader::new(far).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let Ok(mut device) = task_device.lock() else {
                    break;
                };
                device.process_frame(&line);
            }
        });

        (near, Self { device, task })
    }

    /// Shared handle to the device state
    pub fn device(&self) -> Arc<Mutex<VirtualDevice>> {
        Arc::clone(&self.device)
    }

    /// Stop the actor task
    pub fn shutdown(self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[test]
    fn test_power_frame_updates_state() {
        let mut device = VirtualDevice::new("test");

        assert!(device.process_frame("P=100W"));
        assert_eq!(device.power_w(), 100);

        // Same level again: recorded, but no state change
        assert!(!device.process_frame("P=100W"));
        assert_eq!(device.received_frames().len(), 2);
    }

    #[test]
    fn test_fire_frame_updates_state() {
        let mut device = VirtualDevice::new("test");

        assert!(device.process_frame("F=5S"));
        assert_eq!(device.last_fire_seconds(), Some(5));
    }

    #[test]
    fn test_line_termination_stripped() {
        let mut device = VirtualDevice::new("test");

        device.process_frame("P=250W\r\n");
        assert_eq!(device.power_w(), 250);
        assert_eq!(device.received_frames(), ["P=250W"]);
    }

    #[test]
    fn test_unrecognized_frame_recorded_without_state_change() {
        let mut device = VirtualDevice::new("test");

        assert!(!device.process_frame("Q=1X"));
        assert_eq!(device.power_w(), 0);
        assert_eq!(device.received_frames(), ["Q=1X"]);
    }

    #[tokio::test]
    async fn test_io_actor_feeds_device() {
        let (mut near, io) = VirtualDeviceIo::spawn("bench");
        let device = io.device();

        near.write_all(b"P=100W\r\nF=5S\r\n").await.unwrap();
        near.flush().await.unwrap();
        drop(near);

        // Reading happens on the spawned task; wait for it to drain
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let device = device.lock().unwrap();
        assert_eq!(device.power_w(), 100);
        assert_eq!(device.last_fire_seconds(), Some(5));
        assert_eq!(device.received_frames(), ["P=100W", "F=5S"]);
    }
}
