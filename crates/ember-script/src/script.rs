//! Script loading and validation
//!
//! A script source is a flat token stream: repeated `(letter, value)` tuples
//! separated by a configurable separator, terminated by the first empty
//! token. Validation is all-or-nothing — the returned [`CommandScript`] is
//! either complete and fully in-range, or the load fails.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::command::{Command, CommandKind};
use crate::error::ScriptError;

/// Maximum number of commands a script may hold
///
/// Tokens past the capacity are ignored; the script is the first
/// `MAX_COMMANDS` entries.
pub const MAX_COMMANDS: usize = 16;

/// An immutable, ordered, bounded sequence of validated commands
///
/// Constructed once at startup and read-only afterwards. Execution order is
/// exactly the source order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandScript {
    commands: Vec<Command>,
}

impl CommandScript {
    /// Parse a script from source text
    ///
    /// Fails on the first unknown letter or out-of-range value, and when
    /// zero commands are accepted. An unparseable number is reported as a
    /// range violation carrying the raw token.
    pub fn parse(text: &str, separator: char) -> Result<Self, ScriptError> {
        let mut commands = Vec::new();
        let mut tokens = text.split(separator).map(str::trim);

        while commands.len() < MAX_COMMANDS {
            let letter_token = match tokens.next() {
                Some(token) if !token.is_empty() => token,
                _ => break,
            };
            let entry = commands.len() + 1;

            // The command letter is the first character of its token
            let letter = letter_token.chars().next().unwrap_or_default();
            let kind = match CommandKind::from_letter(letter) {
                Some(kind) => kind,
                None => {
                    warn!("rejecting script: unknown command letter '{letter}' at entry {entry}");
                    return Err(ScriptError::UnknownCommand { entry, letter });
                }
            };

            let value_token = tokens.next().unwrap_or("");
            let command = value_token
                .parse::<f64>()
                .ok()
                .and_then(|value| Command::new(kind, value));

            let command = match command {
                Some(command) => command,
                None => {
                    let range = kind.value_range();
                    warn!(
                        "rejecting script: value \"{value_token}\" for {kind} at entry {entry} \
                         is not in {}..={}",
                        range.start(),
                        range.end()
                    );
                    return Err(ScriptError::ValueOutOfRange {
                        entry,
                        kind,
                        value: value_token.to_string(),
                        min: *range.start(),
                        max: *range.end(),
                    });
                }
            };

            debug!("parsed entry {entry}: {command}");
            commands.push(command);
        }

        if commands.is_empty() {
            warn!("rejecting script: no commands loaded");
            return Err(ScriptError::Empty);
        }

        let script = Self { commands };
        info!(
            "loaded {} command(s), {}s scripted dwell",
            script.len(),
            script.total_dwell().as_secs_f64()
        );
        Ok(script)
    }

    /// Load a script from a file
    pub fn load(path: impl AsRef<Path>, separator: char) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        info!("loading script from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, separator)
    }

    /// Number of commands in the script
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// A successfully loaded script is never empty; this exists for
    /// completeness
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The commands in execution order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Total time a run suspends the controller (sum of fire and pause
    /// dwells)
    pub fn total_dwell(&self) -> Duration {
        self.commands
            .iter()
            .filter_map(Command::dwell)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_preserved() {
        let script = CommandScript::parse("W,100,F,5,P,10", ',').unwrap();

        let kinds: Vec<_> = script.commands().iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![CommandKind::SetPower, CommandKind::Fire, CommandKind::Pause]
        );
        let values: Vec<_> = script.commands().iter().map(|c| c.value()).collect();
        assert_eq!(values, vec![100.0, 5.0, 10.0]);
    }

    #[test]
    fn test_exact_count() {
        let script = CommandScript::parse("W,100,F,5,P,10", ',').unwrap();
        assert_eq!(script.len(), 3);
    }

    #[test]
    fn test_empty_token_terminates() {
        let script = CommandScript::parse("W,100,,F,5", ',').unwrap();
        assert_eq!(script.len(), 1);
    }

    #[test]
    fn test_whitespace_tolerated() {
        let script = CommandScript::parse(" W , 100 , F , 5 ", ',').unwrap();
        assert_eq!(script.len(), 2);
    }

    #[test]
    fn test_custom_separator() {
        let script = CommandScript::parse("W;100;F;5", ';').unwrap();
        assert_eq!(script.len(), 2);
    }

    #[test]
    fn test_unknown_letter_rejects_all() {
        let err = CommandScript::parse("W,100,X,5,P,10", ',').unwrap_err();
        assert!(matches!(
            err,
            ScriptError::UnknownCommand { entry: 2, letter: 'X' }
        ));
    }

    #[test]
    fn test_out_of_range_rejects_all() {
        let err = CommandScript::parse("W,100,F,21", ',').unwrap_err();
        assert!(matches!(
            err,
            ScriptError::ValueOutOfRange { entry: 2, kind: CommandKind::Fire, .. }
        ));
    }

    #[test]
    fn test_non_numeric_is_range_violation() {
        let err = CommandScript::parse("W,lots", ',').unwrap_err();
        match err {
            ScriptError::ValueOutOfRange { value, .. } => assert_eq!(value, "lots"),
            other => panic!("expected ValueOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_source_fails() {
        assert!(matches!(
            CommandScript::parse("", ',').unwrap_err(),
            ScriptError::Empty
        ));
        assert!(matches!(
            CommandScript::parse(",,,", ',').unwrap_err(),
            ScriptError::Empty
        ));
    }

    #[test]
    fn test_capacity_bounds_script() {
        let source = "W,100,".repeat(MAX_COMMANDS + 4);
        let script = CommandScript::parse(&source, ',').unwrap();
        assert_eq!(script.len(), MAX_COMMANDS);
    }

    #[test]
    fn test_total_dwell() {
        let script = CommandScript::parse("W,100,F,5,P,10", ',').unwrap();
        assert_eq!(script.total_dwell(), Duration::from_secs(15));
    }
}
