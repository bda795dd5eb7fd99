//! Controller tick loop
//!
//! Each tick polls the host for attach/detach edges, polls the trigger,
//! and dispatches at most one state transition or one script run. A run is
//! awaited to completion inside the tick, so the loop is unavailable for
//! the full scripted dwell; edges that queued up meanwhile are rejected,
//! not deferred.

use std::time::Duration;

use ember_detect::{DetectError, HostEvent, HostWatcher};
use ember_script::CommandScript;
use tracing::{info, trace, warn};

use crate::events::{LinkEvent, TriggerRejection};
use crate::executor;
use crate::manager::ConnectionManager;
use crate::session::SessionOpener;
use crate::state::LinkState;
use crate::trigger::{Indicator, TriggerSource};

/// The controller: host watcher, connection manager, trigger, indicator,
/// and the script, all single-owner
pub struct Controller<O, T, I>
where
    O: SessionOpener,
    T: TriggerSource,
    I: Indicator,
{
    watcher: HostWatcher,
    manager: ConnectionManager<O>,
    trigger: T,
    indicator: I,
    script: CommandScript,
    event_buffer: Vec<LinkEvent>,
}

impl<O, T, I> Controller<O, T, I>
where
    O: SessionOpener,
    T: TriggerSource,
    I: Indicator,
{
    /// Assemble a controller around a loaded script
    pub fn new(
        watcher: HostWatcher,
        manager: ConnectionManager<O>,
        trigger: T,
        indicator: I,
        script: CommandScript,
    ) -> Self {
        info!(
            "controller ready: {} command(s), {}s scripted dwell per run",
            script.len(),
            script.total_dwell().as_secs_f64()
        );
        Self {
            watcher,
            manager,
            trigger,
            indicator,
            script,
            event_buffer: Vec::new(),
        }
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.manager.state()
    }

    /// One scheduling tick
    pub async fn tick(&mut self) -> Result<(), DetectError> {
        let events = self.watcher.poll()?;
        self.apply_host_events(events).await;
        self.poll_trigger().await;
        Ok(())
    }

    /// Feed host edges to the connection manager
    ///
    /// Split out from [`tick`](Self::tick) so the state machine can be
    /// driven without enumerating real hardware.
    pub async fn apply_host_events(&mut self, events: Vec<HostEvent>) {
        for event in events {
            self.manager
                .handle_host_event(event, &mut self.trigger, &mut self.indicator)
                .await;
        }
    }

    /// Service at most one trigger edge
    pub async fn poll_trigger(&mut self) {
        if self.trigger.poll().is_some() {
            self.fire().await;
        }
    }

    async fn fire(&mut self) {
        info!("trigger!");
        if self.manager.state() != LinkState::Connected {
            warn!("serial connection is not active, ignoring trigger");
            self.event_buffer.push(LinkEvent::TriggerIgnored {
                reason: TriggerRejection::NotConnected,
            });
            return;
        }
        let Some(session) = self.manager.session_mut() else {
            warn!("serial connection is not active, ignoring trigger");
            self.event_buffer.push(LinkEvent::TriggerIgnored {
                reason: TriggerRejection::NotConnected,
            });
            return;
        };

        self.event_buffer.push(LinkEvent::ScriptStarted {
            commands: self.script.len(),
        });
        match executor::execute(&self.script, session).await {
            Ok(summary) => self.event_buffer.push(LinkEvent::ScriptCompleted {
                frames_sent: summary.frames_sent,
            }),
            Err(e) => {
                warn!("script run failed: {e}");
                self.event_buffer.push(LinkEvent::ScriptFailed {
                    reason: e.to_string(),
                });
            }
        }

        // One in-flight script, ever: edges that arrived during the run
        // are rejected now rather than starting back-to-back runs
        let mut stale = 0;
        while self.trigger.poll().is_some() {
            stale += 1;
            self.event_buffer.push(LinkEvent::TriggerIgnored {
                reason: TriggerRejection::Busy,
            });
        }
        if stale > 0 {
            info!("ignoring {stale} trigger(s) received while busy");
        }
    }

    /// Drain pending events, manager's first
    pub fn drain_events(&mut self) -> Vec<LinkEvent> {
        let mut events = self.manager.drain_events();
        events.append(&mut self.event_buffer);
        events
    }

    /// Drive the tick loop forever
    ///
    /// Host enumeration failures are logged and retried on the next tick;
    /// nothing here is fatal.
    pub async fn run(&mut self, tick_interval: Duration) {
        let mut interval = tokio::time::interval(tick_interval);
        loop {
            interval.tick().await;
            if let Err(e) = self.tick().await {
                warn!("host poll failed: {e}");
            }
            for event in self.drain_events() {
                trace!("event: {event:?}");
            }
        }
    }
}
