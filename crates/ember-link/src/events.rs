//! Observable event stream for the device link
//!
//! The manager and controller buffer everything that happens (attach,
//! verification, session lifecycle, script runs, rejected triggers) as
//! events drained by the caller. The stream is purely observational; no
//! component consumes it to make decisions.

/// Why a trigger edge was not acted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerRejection {
    /// No identified device session was active
    NotConnected,
    /// The edge arrived while a script run held the controller
    Busy,
}

/// Unified event enum for all link activity
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    // -------------------------------------------------------------------------
    // Device lifecycle events
    // -------------------------------------------------------------------------
    /// A serial-capable peripheral appeared on the host
    DeviceAttached { port: String },

    /// The peripheral's product description matched the identity filter
    DeviceVerified { port: String, product: String },

    /// The peripheral failed the identity check and was not adopted
    DeviceRejected { port: String, product: Option<String> },

    /// The tracked peripheral was removed from the host
    DeviceDetached { port: String },

    // -------------------------------------------------------------------------
    // Session lifecycle events
    // -------------------------------------------------------------------------
    /// The serial session opened and reported ready
    SessionOpened { port: String },

    /// The session never became ready within the open timeout
    SessionOpenTimedOut { port: String },

    /// The serial session was closed
    SessionClosed { port: String },

    // -------------------------------------------------------------------------
    // Execution events
    // -------------------------------------------------------------------------
    /// A script run started
    ScriptStarted { commands: usize },

    /// A script run completed; the only completion signal there is
    ScriptCompleted { frames_sent: usize },

    /// A script run ended early on an I/O failure
    ScriptFailed { reason: String },

    /// A trigger edge was rejected
    TriggerIgnored { reason: TriggerRejection },
}

impl LinkEvent {
    /// Check if this is a device lifecycle event
    pub fn is_device_lifecycle(&self) -> bool {
        matches!(
            self,
            LinkEvent::DeviceAttached { .. }
                | LinkEvent::DeviceVerified { .. }
                | LinkEvent::DeviceRejected { .. }
                | LinkEvent::DeviceDetached { .. }
        )
    }

    /// Check if this is a session lifecycle event
    pub fn is_session_lifecycle(&self) -> bool {
        matches!(
            self,
            LinkEvent::SessionOpened { .. }
                | LinkEvent::SessionOpenTimedOut { .. }
                | LinkEvent::SessionClosed { .. }
        )
    }

    /// Check if this is a script execution event
    pub fn is_execution(&self) -> bool {
        matches!(
            self,
            LinkEvent::ScriptStarted { .. }
                | LinkEvent::ScriptCompleted { .. }
                | LinkEvent::ScriptFailed { .. }
                | LinkEvent::TriggerIgnored { .. }
        )
    }

    /// Get the port if this event is associated with one
    pub fn port(&self) -> Option<&str> {
        match self {
            LinkEvent::DeviceAttached { port }
            | LinkEvent::DeviceVerified { port, .. }
            | LinkEvent::DeviceRejected { port, .. }
            | LinkEvent::DeviceDetached { port }
            | LinkEvent::SessionOpened { port }
            | LinkEvent::SessionOpenTimedOut { port }
            | LinkEvent::SessionClosed { port } => Some(port),
            _ => None,
        }
    }
}
