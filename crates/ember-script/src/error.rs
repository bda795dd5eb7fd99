//! Error types for script loading

use thiserror::Error;

use crate::command::CommandKind;

/// Errors that can occur while loading a script
///
/// Any of these rejects the entire script; there is no partially loaded
/// state to recover.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// A command letter outside the known set
    #[error("unknown command letter '{letter}' at entry {entry}")]
    UnknownCommand { entry: usize, letter: char },

    /// A value outside its command kind's range, or not a number at all
    #[error("invalid value \"{value}\" for {kind} at entry {entry} (allowed {min} to {max})")]
    ValueOutOfRange {
        entry: usize,
        kind: CommandKind,
        /// Raw token as read from the source
        value: String,
        min: f64,
        max: f64,
    },

    /// The source yielded zero commands
    #[error("no commands loaded")]
    Empty,

    /// The script source could not be read
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
}
