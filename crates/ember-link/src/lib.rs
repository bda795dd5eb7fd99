//! Device Link Library
//!
//! This crate owns the lifecycle of the link to the downstream heating
//! device and the execution of the firing script against it:
//!
//! - **ConnectionManager**: the attach/verify/detach state machine; opens
//!   and closes the serial session exactly once per physical connection
//! - **ScriptExecutor**: runs the loaded script to completion on each
//!   trigger, pacing timed commands by suspending
//! - **Controller**: the tick loop tying host polling, trigger polling,
//!   and dispatch together
//!
//! The trigger input and indicator output are external collaborators,
//! reached only through the [`TriggerSource`] and [`Indicator`] traits.
//!
//! # Blocking property
//!
//! A script run is awaited to completion inside the controller tick: for
//! the whole scripted dwell, no attach/detach event and no further trigger
//! is serviced. Trigger edges that arrive during a run are rejected when
//! the run completes.

pub mod controller;
pub mod error;
pub mod events;
pub mod executor;
pub mod manager;
pub mod session;
pub mod state;
pub mod trigger;

pub use controller::Controller;
pub use error::LinkError;
pub use events::{LinkEvent, TriggerRejection};
pub use executor::{execute, ExecutionSummary};
pub use manager::{ConnectionManager, ManagerConfig};
pub use session::{DeviceSession, SerialOpener, SessionOpener};
pub use state::{DeviceState, LinkState};
pub use trigger::{ChannelTrigger, Indicator, TriggerEvent, TriggerSource};
