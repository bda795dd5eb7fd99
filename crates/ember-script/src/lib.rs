//! Firing Script Library
//!
//! This crate provides the data model for heater command scripts:
//!
//! - **Command**: a single validated instruction (set power, fire, pause)
//! - **CommandScript**: the immutable, ordered, bounded sequence of commands
//!   loaded once at startup and executed verbatim on every trigger
//!
//! Scripts are validated in full before they are considered loaded: an
//! unknown command letter or an out-of-range value anywhere in the source
//! rejects the entire script.
//!
//! # Example
//!
//! ```rust
//! use ember_script::{CommandKind, CommandScript};
//!
//! let script = CommandScript::parse("W,100,F,5,P,10", ',').unwrap();
//!
//! assert_eq!(script.len(), 3);
//! assert_eq!(script.commands()[0].kind(), CommandKind::SetPower);
//! assert_eq!(script.commands()[0].frame().as_deref(), Some("P=100W"));
//! ```

pub mod command;
pub mod error;
pub mod script;

pub use command::{Command, CommandKind};
pub use error::ScriptError;
pub use script::{CommandScript, MAX_COMMANDS};
