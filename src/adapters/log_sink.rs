//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to the
//! `log` facade (UART on the board, the tracing subscriber on the host).
//! Each line starts with a fixed tag so serial captures are easy to grep.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { role, channel } => {
                info!("START | role={} channel={}", role, channel);
            }
            AppEvent::Sent(msg) => info!("TX    | {}", msg),
            AppEvent::Retransmitted(msg) => info!("RETX  | {}", msg),
            AppEvent::Acknowledged { id, by } => info!("ACK   | #{} answered by {}", id, by),
            AppEvent::PacketRejected(err) => warn!("DROP  | unable to parse message: {}", err),
            AppEvent::UnhandledCommand { kind, role } => {
                warn!("CMD   | unknown command message {} for {}", kind, role);
            }
            AppEvent::RelayPulsed { duration_ms } => info!("RELAY | pulsed {} ms", duration_ms),
            AppEvent::ZoneArmed { distance_m } => {
                info!("GEO   | trigger zone activated at {:.0} m", distance_m);
            }
            AppEvent::TriggerSent { id, distance_m } => {
                info!("GEO   | sent door open message #{} at {:.1} m", id, distance_m);
            }
            AppEvent::PortFailure(err) => warn!("FAULT | {}", err),
        }
    }
}
