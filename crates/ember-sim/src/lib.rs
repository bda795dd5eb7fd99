//! Heater Device Simulation Library
//!
//! This crate provides a simulated downstream heater for testing the
//! controller without physical hardware:
//!
//! - **VirtualDevice**: tracks power and firing state from received
//!   protocol frames, recording every frame for test verification
//! - **VirtualDeviceIo**: pairs a device with an in-memory stream so it
//!   can stand behind a real session
//!
//! # Example
//!
//! ```rust
//! use ember_sim::VirtualDevice;
//!
//! let mut device = VirtualDevice::new("bench heater");
//! device.process_frame("P=100W");
//! device.process_frame("F=5S");
//!
//! assert_eq!(device.power_w(), 100);
//! assert_eq!(device.last_fire_seconds(), Some(5));
//! ```

pub mod device;

pub use device::{VirtualDevice, VirtualDeviceIo};
