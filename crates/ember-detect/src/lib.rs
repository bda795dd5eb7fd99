//! Serial Port Detection Library
//!
//! This crate watches the host's serial ports for the downstream heater
//! peripheral: it enumerates USB serial ports, reports attach and detach
//! edges between polls, and filters candidate devices by their
//! self-reported product description.
//!
//! # Example
//!
//! ```rust,no_run
//! use ember_detect::{HostEvent, HostWatcher, IdentityFilter};
//!
//! let mut watcher = HostWatcher::new();
//! let filter = IdentityFilter::new("EMBER");
//!
//! for event in watcher.poll().unwrap() {
//!     if let HostEvent::Attached(descriptor) = event {
//!         println!("{}: match={}", descriptor.port, filter.matches(&descriptor));
//!     }
//! }
//! ```

pub mod error;
pub mod identity;
pub mod scanner;

pub use error::DetectError;
pub use identity::IdentityFilter;
pub use scanner::{HostEvent, HostWatcher, PortDescriptor, WatcherConfig};
