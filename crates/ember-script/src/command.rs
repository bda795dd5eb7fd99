//! Script command representation
//!
//! A command pairs a kind (the operation the device protocol supports) with
//! a numeric value. Commands are immutable and only constructed through
//! range-validated paths, so an out-of-range value can never reach
//! execution.

use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

/// The three operations the device protocol supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandKind {
    /// Set the heater power level in watts
    SetPower,
    /// Begin a timed firing cycle, duration in seconds
    Fire,
    /// Suspend between commands, duration in seconds; sends no frame
    Pause,
}

impl CommandKind {
    /// Map a script letter to its command kind
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'W' => Some(Self::SetPower),
            'F' => Some(Self::Fire),
            'P' => Some(Self::Pause),
            _ => None,
        }
    }

    /// The script letter for this kind
    pub fn letter(&self) -> char {
        match self {
            Self::SetPower => 'W',
            Self::Fire => 'F',
            Self::Pause => 'P',
        }
    }

    /// Returns a human-readable name for the kind
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetPower => "set-power",
            Self::Fire => "fire",
            Self::Pause => "pause",
        }
    }

    /// Inclusive range of valid values for this kind
    pub fn value_range(&self) -> RangeInclusive<f64> {
        match self {
            Self::SetPower => 5.0..=400.0,
            Self::Fire => 1.0..=20.0,
            Self::Pause => 1.0..=120.0,
        }
    }

    /// Unit suffix for log lines
    pub fn unit(&self) -> &'static str {
        match self {
            Self::SetPower => "W",
            Self::Fire | Self::Pause => "s",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single validated script command
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Command {
    kind: CommandKind,
    value: f64,
}

impl Command {
    /// Create a command, checking the value against the kind's range
    ///
    /// Returns `None` when the value falls outside the kind's inclusive
    /// range. NaN never satisfies the range check.
    pub fn new(kind: CommandKind, value: f64) -> Option<Self> {
        if kind.value_range().contains(&value) {
            Some(Self { kind, value })
        } else {
            None
        }
    }

    /// The command kind
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// The validated value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Protocol frame for this command, without line termination
    ///
    /// Pause is pacing-only and produces no frame. Values are truncated to
    /// whole units on the wire.
    pub fn frame(&self) -> Option<String> {
        match self.kind {
            CommandKind::SetPower => Some(format!("P={}W", self.value as u16)),
            CommandKind::Fire => Some(format!("F={}S", self.value as u16)),
            CommandKind::Pause => None,
        }
    }

    /// How long the controller suspends after sending this command
    pub fn dwell(&self) -> Option<Duration> {
        match self.kind {
            CommandKind::SetPower => None,
            CommandKind::Fire | CommandKind::Pause => Some(Duration::from_secs_f64(self.value)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", self.kind, self.value, self.kind.unit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_round_trip() {
        for kind in [CommandKind::SetPower, CommandKind::Fire, CommandKind::Pause] {
            assert_eq!(CommandKind::from_letter(kind.letter()), Some(kind));
        }
        assert_eq!(CommandKind::from_letter('X'), None);
        assert_eq!(CommandKind::from_letter('w'), None);
    }

    #[test]
    fn test_range_boundaries() {
        assert!(Command::new(CommandKind::SetPower, 5.0).is_some());
        assert!(Command::new(CommandKind::SetPower, 400.0).is_some());
        assert!(Command::new(CommandKind::SetPower, 4.99).is_none());
        assert!(Command::new(CommandKind::SetPower, 400.01).is_none());

        assert!(Command::new(CommandKind::Fire, 1.0).is_some());
        assert!(Command::new(CommandKind::Fire, 20.0).is_some());
        assert!(Command::new(CommandKind::Fire, 0.99).is_none());
        assert!(Command::new(CommandKind::Fire, 20.01).is_none());

        assert!(Command::new(CommandKind::Pause, 1.0).is_some());
        assert!(Command::new(CommandKind::Pause, 120.0).is_some());
        assert!(Command::new(CommandKind::Pause, 0.5).is_none());
        assert!(Command::new(CommandKind::Pause, 120.5).is_none());
    }

    #[test]
    fn test_nan_rejected() {
        assert!(Command::new(CommandKind::Fire, f64::NAN).is_none());
    }

    #[test]
    fn test_frame_encoding() {
        let power = Command::new(CommandKind::SetPower, 100.0).unwrap();
        assert_eq!(power.frame().as_deref(), Some("P=100W"));

        let fire = Command::new(CommandKind::Fire, 5.0).unwrap();
        assert_eq!(fire.frame().as_deref(), Some("F=5S"));

        let pause = Command::new(CommandKind::Pause, 10.0).unwrap();
        assert_eq!(pause.frame(), None);
    }

    #[test]
    fn test_frame_truncates_fractional_values() {
        let power = Command::new(CommandKind::SetPower, 99.9).unwrap();
        assert_eq!(power.frame().as_deref(), Some("P=99W"));
    }

    #[test]
    fn test_dwell() {
        let power = Command::new(CommandKind::SetPower, 100.0).unwrap();
        assert_eq!(power.dwell(), None);

        let fire = Command::new(CommandKind::Fire, 5.0).unwrap();
        assert_eq!(fire.dwell(), Some(Duration::from_secs(5)));

        let pause = Command::new(CommandKind::Pause, 10.0).unwrap();
        assert_eq!(pause.dwell(), Some(Duration::from_secs(10)));
    }
}
