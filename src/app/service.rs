//! Protocol agent: the hexagonal core.
//!
//! [`Agent`] owns every piece of protocol state for one node: the
//! outstanding-message tracker, the channel filter, the role dispatcher,
//! the geofence trigger (car role only) and the tick scheduler. Nothing is
//! process-global, so two agents can share one test without aliasing.
//!
//! All I/O flows through port traits injected at call sites, so the whole
//! loop can be driven from tests with mock adapters.
//!
//! ```text
//!  RadioLink ──▶ ┌────────────────────────────────┐ ──▶ RadioLink
//!                │             Agent              │
//!  GpsSource ──▶ │ codec · filter · dispatch      │ ──▶ RelayActuator
//!                │ tracker · geofence · scheduler │ ──▶ StatusIndicator
//!      Clock ──▶ └────────────────────────────────┘ ──▶ EventSink
//! ```

use core::time::Duration;

use log::{debug, info, warn};

use crate::config::DeviceConfig;
use crate::geofence::{GeofenceEvent, GeofenceTrigger, TriggerZone};
use crate::link::codec::{decode, Message, MessageKind};
use crate::link::dispatch::{Dispatcher, Reaction, Role};
use crate::link::filter::ChannelFilter;
use crate::link::tracker::{OutstandingTracker, Transmission};
use crate::scheduler::{TickScheduler, TICK_INTERVAL};

use super::events::AppEvent;
use super::ports::{Clock, EventSink, GpsSource, RadioLink, RelayActuator, StatusIndicator};

// ───────────────────────────────────────────────────────────────
// Agent
// ───────────────────────────────────────────────────────────────

/// One node's protocol state machine.
pub struct Agent<C: Clock> {
    clock: C,
    dispatcher: Dispatcher,
    filter: ChannelFilter,
    tracker: OutstandingTracker,
    /// Present only for roles that carry a GPS.
    geofence: Option<GeofenceTrigger>,
    scheduler: TickScheduler,
    relay_pulse: Duration,
    receive_timeout: Duration,
}

impl<C: Clock> Agent<C> {
    /// Build the agent from a validated configuration.
    pub fn new(config: &DeviceConfig, clock: C) -> Self {
        let role = config.mode;
        let geofence = role
            .has_geofence()
            .then(|| GeofenceTrigger::new(TriggerZone::from(&config.gps.trigger_zone)));
        let scheduler = TickScheduler::new(TICK_INTERVAL, clock.now_ms());

        Self {
            dispatcher: Dispatcher::new(role),
            filter: ChannelFilter::new(config.channel),
            tracker: OutstandingTracker::new(config.channel, config.ack_timeout()),
            geofence,
            scheduler,
            relay_pulse: config.relay_pulse(),
            receive_timeout: config.receive_timeout(),
            clock,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        info!(
            "Agent started: role={} channel={}",
            self.role(),
            self.filter.channel()
        );
        sink.emit(&AppEvent::Started {
            role: self.role(),
            channel: self.filter.channel(),
        });
    }

    /// Run the loop forever.
    pub fn run(
        &mut self,
        radio: &mut impl RadioLink,
        gps: &mut impl GpsSource,
        hw: &mut (impl RelayActuator + StatusIndicator),
        sink: &mut impl EventSink,
    ) -> ! {
        loop {
            self.run_once(radio, gps, hw, sink);
        }
    }

    /// One loop iteration: bounded receive, GPS poll, then the 1 s tick if due.
    pub fn run_once(
        &mut self,
        radio: &mut impl RadioLink,
        gps: &mut impl GpsSource,
        hw: &mut (impl RelayActuator + StatusIndicator),
        sink: &mut impl EventSink,
    ) {
        self.poll_radio(radio, hw, sink);
        self.poll_gps(gps, sink);
        if self.scheduler.poll(self.clock.now_ms()) {
            self.tick(radio, &*gps, sink);
        }
    }

    // ── Outbound ──────────────────────────────────────────────

    /// Send an unsolicited command (`target = 0`), tracked for retry.
    pub fn send_command(
        &mut self,
        radio: &mut impl RadioLink,
        kind: MessageKind,
        sink: &mut impl EventSink,
    ) -> Message {
        let tx = self.tracker.send(radio, self.clock.now_ms(), kind, 0, None);
        Self::report(tx, AppEvent::Sent, sink)
    }

    // ── Inbound ───────────────────────────────────────────────

    /// Wait up to the configured receive timeout for one packet.
    pub fn poll_radio(
        &mut self,
        radio: &mut impl RadioLink,
        hw: &mut (impl RelayActuator + StatusIndicator),
        sink: &mut impl EventSink,
    ) {
        match radio.receive(self.receive_timeout) {
            Ok(Some(packet)) => {
                self.handle_packet(&packet, radio, hw, sink);
            }
            Ok(None) => {}
            Err(e) => sink.emit(&AppEvent::PortFailure(e.into())),
        }
    }

    /// Decode, filter and dispatch one raw packet.
    ///
    /// Returns the reaction taken, or `None` if the packet was dropped
    /// (malformed or foreign channel).
    pub fn handle_packet(
        &mut self,
        packet: &[u8],
        radio: &mut impl RadioLink,
        hw: &mut (impl RelayActuator + StatusIndicator),
        sink: &mut impl EventSink,
    ) -> Option<Reaction> {
        let msg = match decode(packet) {
            Ok(msg) => msg,
            Err(e) => {
                sink.emit(&AppEvent::PacketRejected(e));
                return None;
            }
        };
        if !self.filter.accept(&msg) {
            return None;
        }
        debug!("Agent: received {}", msg);

        // Any reply clears what it answers, whatever its kind.
        if let Some(entry) = self.tracker.on_receive(&msg) {
            sink.emit(&AppEvent::Acknowledged {
                id: entry.message.id,
                by: msg.kind,
            });
        }

        let reaction = self.dispatcher.dispatch(&msg);

        if reaction.pulses_relay() {
            match hw.pulse(self.relay_pulse) {
                Ok(()) => sink.emit(&AppEvent::RelayPulsed {
                    duration_ms: self.relay_pulse.as_millis() as u64,
                }),
                Err(e) => sink.emit(&AppEvent::PortFailure(e.into())),
            }
        }

        if let Some(kind) = reaction.reply() {
            let tx = self
                .tracker
                .send(radio, self.clock.now_ms(), kind, msg.id, None);
            Self::report(tx, AppEvent::Sent, sink);
        }

        if reaction == Reaction::Unhandled {
            sink.emit(&AppEvent::UnhandledCommand {
                kind: msg.kind,
                role: self.role(),
            });
        } else if reaction.blinks() {
            hw.blink();
        }

        Some(reaction)
    }

    /// Let the GPS consume its buffered input. No-op without a geofence.
    pub fn poll_gps(&mut self, gps: &mut impl GpsSource, sink: &mut impl EventSink) {
        if self.geofence.is_none() {
            return;
        }
        if let Err(e) = gps.update() {
            sink.emit(&AppEvent::PortFailure(e.into()));
        }
    }

    // ── Periodic ──────────────────────────────────────────────

    /// The 1 s tick: retransmit overdue messages, then evaluate the geofence.
    pub fn tick(
        &mut self,
        radio: &mut impl RadioLink,
        gps: &impl GpsSource,
        sink: &mut impl EventSink,
    ) {
        let now = self.clock.now_ms();

        for tx in self.tracker.tick(radio, now) {
            Self::report(tx, AppEvent::Retransmitted, sink);
        }

        match self.geofence.as_mut().and_then(|g| g.tick(gps)) {
            Some(GeofenceEvent::Armed { distance_m }) => {
                sink.emit(&AppEvent::ZoneArmed { distance_m });
            }
            Some(GeofenceEvent::Fire { distance_m }) => {
                let tx = self
                    .tracker
                    .send(radio, now, MessageKind::Trigger, 0, None);
                let msg = Self::report(tx, AppEvent::Sent, sink);
                sink.emit(&AppEvent::TriggerSent {
                    id: msg.id,
                    distance_m,
                });
            }
            None => {}
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn role(&self) -> Role {
        self.dispatcher.role()
    }

    pub fn tracker(&self) -> &OutstandingTracker {
        &self.tracker
    }

    pub fn geofence(&self) -> Option<&GeofenceTrigger> {
        self.geofence.as_ref()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Turn a transmission outcome into events. A failed send stays tracked
    /// (if it was trackable) and is retried on a later tick.
    fn report(
        tx: Transmission,
        on_success: fn(Message) -> AppEvent,
        sink: &mut impl EventSink,
    ) -> Message {
        match tx.result {
            Ok(()) => sink.emit(&on_success(tx.message)),
            Err(e) => {
                warn!("Agent: transmit of {} failed", tx.message);
                sink.emit(&AppEvent::PortFailure(e.into()));
            }
        }
        tx.message
    }
}
