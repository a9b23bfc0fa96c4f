//! Outbound application events.
//!
//! The [`Agent`](super::service::Agent) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them (serial log, test recorder, ...).

use crate::error::Error;
use crate::link::codec::{DecodeError, Message, MessageKind};
use crate::link::dispatch::Role;

/// Structured events emitted by the protocol agent.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The agent has started.
    Started { role: Role, channel: u16 },

    /// A message went out for the first time.
    Sent(Message),

    /// An unacknowledged message was sent again with its original id.
    Retransmitted(Message),

    /// An outstanding message was answered and is no longer tracked.
    Acknowledged { id: u16, by: MessageKind },

    /// A received packet could not be decoded and was discarded.
    PacketRejected(DecodeError),

    /// A decoded packet carried a command this role does not handle.
    UnhandledCommand { kind: MessageKind, role: Role },

    /// The garage relay was pulsed.
    RelayPulsed { duration_ms: u64 },

    /// The car drove beyond the activation radius.
    ZoneArmed { distance_m: f64 },

    /// The car re-entered the trigger radius and sent the trigger.
    TriggerSent { id: u16, distance_m: f64 },

    /// A port operation failed; the loop continued.
    PortFailure(Error),
}
