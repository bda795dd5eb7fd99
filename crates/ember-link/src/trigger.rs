//! Trigger and indicator collaborator interfaces
//!
//! The physical trigger (debounce, tap vs. hold classification) and the
//! indicator output live outside this crate; the controller reaches them
//! only through these traits. Sources deliver payload-free edge events
//! and drop edges while disarmed.

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::time::Duration;

use tracing::{debug, info};

/// An instantaneous activation signal; carries nothing but its occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent;

/// Source of trigger edges
pub trait TriggerSource {
    /// Arm the source; `hold` is the activation hold duration forwarded to
    /// the collaborator
    fn arm(&mut self, hold: Duration);

    /// Disarm the source; pending and future edges are dropped until the
    /// next arm
    fn disarm(&mut self);

    /// Drain one pending edge, if armed and one occurred
    fn poll(&mut self) -> Option<TriggerEvent>;
}

/// Binary connected-state indicator
pub trait Indicator {
    /// Reflect the connected state
    fn set_on(&mut self, on: bool);
}

/// Trigger source fed by a channel
///
/// Whatever pumps the sending half (a stdin reader thread, a GPIO edge
/// handler, a test) decides what counts as an activation; this side only
/// gates edges on the armed state.
pub struct ChannelTrigger {
    rx: Receiver<()>,
    armed: bool,
    hold: Duration,
}

impl ChannelTrigger {
    /// Create a trigger source around the receiving half of a channel
    pub fn new(rx: Receiver<()>) -> Self {
        Self {
            rx,
            armed: false,
            hold: Duration::ZERO,
        }
    }

    /// Create a connected sender/trigger pair
    pub fn channel() -> (Sender<()>, Self) {
        let (tx, rx) = std::sync::mpsc::channel();
        (tx, Self::new(rx))
    }

    /// The hold duration configured at the last arm
    pub fn hold(&self) -> Duration {
        self.hold
    }

    fn drop_pending(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(()) => debug!("dropping trigger edge received while disarmed"),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }
}

impl TriggerSource for ChannelTrigger {
    fn arm(&mut self, hold: Duration) {
        // edges from before the device was ready do not count
        self.drop_pending();
        self.hold = hold;
        self.armed = true;
        info!("trigger armed ({}ms hold), waiting for press", hold.as_millis());
    }

    fn disarm(&mut self) {
        self.armed = false;
        info!("trigger disarmed");
    }

    fn poll(&mut self) -> Option<TriggerEvent> {
        if !self.armed {
            self.drop_pending();
            return None;
        }
        self.rx.try_recv().ok().map(|()| TriggerEvent)
    }
}
