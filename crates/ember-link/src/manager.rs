//! Connection manager
//!
//! The attach/verify/detach state machine. The manager is the single
//! writer of [`LinkState`] and the sole owner of the session handle: a
//! session exists exactly while the state is `Connected`, so no frame can
//! be sent after a close.

use std::time::Duration;

use ember_detect::{HostEvent, IdentityFilter, PortDescriptor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::LinkError;
use crate::events::LinkEvent;
use crate::session::{DeviceSession, SessionOpener};
use crate::state::{DeviceState, LinkState};
use crate::trigger::{Indicator, TriggerSource};

/// Connection manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Substring the product description must contain; empty accepts any
    pub match_substring: String,
    /// Deadline for the session to report ready (ms)
    pub open_timeout_ms: u64,
    /// Interval between session open attempts (ms)
    pub open_retry_ms: u64,
    /// Hold duration forwarded when arming the trigger (ms)
    pub trigger_hold_ms: u64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            match_substring: String::new(),
            open_timeout_ms: 5_000,
            open_retry_ms: 100,
            trigger_hold_ms: 2_000,
        }
    }
}

impl ManagerConfig {
    /// Session open deadline
    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }

    /// Session open retry interval
    pub fn open_retry(&self) -> Duration {
        Duration::from_millis(self.open_retry_ms)
    }

    /// Trigger hold duration
    pub fn trigger_hold(&self) -> Duration {
        Duration::from_millis(self.trigger_hold_ms)
    }
}

/// The connection state machine
pub struct ConnectionManager<O: SessionOpener> {
    config: ManagerConfig,
    identity: IdentityFilter,
    opener: O,
    state: LinkState,
    device: Option<DeviceState>,
    session: Option<DeviceSession<O::Io>>,
    event_buffer: Vec<LinkEvent>,
}

impl<O: SessionOpener> ConnectionManager<O> {
    /// Create a manager in the `Disconnected` state
    pub fn new(config: ManagerConfig, opener: O) -> Self {
        let identity = IdentityFilter::new(config.match_substring.clone());
        Self {
            config,
            identity,
            opener,
            state: LinkState::Disconnected,
            device: None,
            session: None,
            event_buffer: Vec::new(),
        }
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// The accepted device, while one is connected
    pub fn device(&self) -> Option<&DeviceState> {
        self.device.as_ref()
    }

    /// Borrow the open session; `Some` exactly while `Connected`
    pub fn session_mut(&mut self) -> Option<&mut DeviceSession<O::Io>> {
        self.session.as_mut()
    }

    /// Drain pending events
    pub fn drain_events(&mut self) -> Vec<LinkEvent> {
        std::mem::take(&mut self.event_buffer)
    }

    /// Apply one host attach/detach edge
    pub async fn handle_host_event(
        &mut self,
        event: HostEvent,
        trigger: &mut dyn TriggerSource,
        indicator: &mut dyn Indicator,
    ) {
        match event {
            HostEvent::Attached(descriptor) => {
                self.handle_attach(descriptor, trigger, indicator).await;
            }
            HostEvent::Detached(descriptor) => {
                self.handle_detach(&descriptor, trigger, indicator);
            }
        }
    }

    async fn handle_attach(
        &mut self,
        descriptor: PortDescriptor,
        trigger: &mut dyn TriggerSource,
        indicator: &mut dyn Indicator,
    ) {
        if self.state != LinkState::Disconnected {
            debug!(
                "ignoring attach of {} while {}",
                descriptor.port,
                self.state.name()
            );
            return;
        }

        self.state = LinkState::Verifying;
        self.event_buffer.push(LinkEvent::DeviceAttached {
            port: descriptor.port.clone(),
        });

        let device = DeviceState::new(&descriptor);
        info!(
            "device attached on {} ({})",
            device.port,
            device.vid_pid_display()
        );
        info!("device {}", device.identity_display());
        info!("opening serial connection to device...");

        let session = match self.open_session(&descriptor.port).await {
            Ok(session) => session,
            Err(e) => {
                warn!("{e}, abandoning device on {}", descriptor.port);
                self.event_buffer.push(LinkEvent::SessionOpenTimedOut {
                    port: descriptor.port.clone(),
                });
                self.state = LinkState::Disconnected;
                return;
            }
        };
        info!("opened serial connection!");
        self.event_buffer.push(LinkEvent::SessionOpened {
            port: descriptor.port.clone(),
        });

        if !self.identity.matches(&descriptor) {
            info!("closing serial connection to unrecognized device");
            drop(session);
            self.event_buffer.push(LinkEvent::SessionClosed {
                port: descriptor.port.clone(),
            });
            self.event_buffer.push(LinkEvent::DeviceRejected {
                port: descriptor.port.clone(),
                product: descriptor.product.clone(),
            });
            self.state = LinkState::Disconnected;
            return;
        }

        trigger.arm(self.config.trigger_hold());
        indicator.set_on(true);
        self.event_buffer.push(LinkEvent::DeviceVerified {
            port: descriptor.port.clone(),
            product: descriptor.product.clone().unwrap_or_default(),
        });
        self.session = Some(session);
        self.device = Some(device);
        self.state = LinkState::Connected;
    }

    fn handle_detach(
        &mut self,
        descriptor: &PortDescriptor,
        trigger: &mut dyn TriggerSource,
        indicator: &mut dyn Indicator,
    ) {
        let tracked = self
            .device
            .as_ref()
            .is_some_and(|device| device.port == descriptor.port);
        if !tracked {
            debug!("ignoring detach of untracked port {}", descriptor.port);
            return;
        }

        if self.session.take().is_some() {
            info!("closing serial connection to device...");
            self.event_buffer.push(LinkEvent::SessionClosed {
                port: descriptor.port.clone(),
            });
        }

        trigger.disarm();
        indicator.set_on(false);
        info!("device on {} disconnected", descriptor.port);
        self.event_buffer.push(LinkEvent::DeviceDetached {
            port: descriptor.port.clone(),
        });
        self.device = None;
        self.state = LinkState::Disconnected;
    }

    /// Open the session, retrying until ready or until the deadline
    ///
    /// A peripheral that never reports ready is abandoned at the deadline
    /// and the manager returns to polling.
    async fn open_session(&self, port: &str) -> Result<DeviceSession<O::Io>, LinkError> {
        let deadline = tokio::time::Instant::now() + self.config.open_timeout();

        loop {
            match self.opener.open(port) {
                Ok(session) => return Ok(session),
                Err(e) => {
                    if tokio::time::Instant::now() >= deadline {
                        return Err(LinkError::OpenTimedOut {
                            port: port.to_string(),
                            waited_ms: self.config.open_timeout_ms,
                        });
                    }
                    debug!("session on {port} not ready: {e}");
                    tokio::time::sleep(self.config.open_retry()).await;
                }
            }
        }
    }
}
