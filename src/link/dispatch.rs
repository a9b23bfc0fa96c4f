//! Command dispatcher.
//!
//! Maps one accepted inbound message to a [`Reaction`] for the configured
//! [`Role`]. The dispatcher is pure: the agent carries out the reaction
//! (relay pulse, reply, LED blink) through its ports.
//!
//! ```text
//!  received   │ car            │ garage             │ reply │ blink
//! ────────────┼────────────────┼────────────────────┼───────┼──────
//!  Ping       │ reply          │ reply              │ Pong  │ yes
//!  Pong       │ reply          │ reply              │ Ack   │ yes
//!  Trigger    │ unhandled      │ pulse relay, reply │ Ack¹  │ yes¹
//!  Ack        │ (tracker only) │ (tracker only)     │ none  │ yes
//!  unhandled  │ log, drop      │ log, drop          │ none  │ no
//! ```
//!
//! ¹ garage only; on the car a Trigger takes the unhandled row.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::codec::{Message, MessageKind};

/// Which end of the link this device is. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Role {
    /// Roaming peer with a GPS; emits triggers.
    Car,
    /// Fixed peer wired to the door relay; obeys triggers.
    Garage,
}

impl Role {
    /// Only the car runs the geofence.
    pub fn has_geofence(self) -> bool {
        matches!(self, Self::Car)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Car => write!(f, "car"),
            Self::Garage => write!(f, "garage"),
        }
    }
}

/// The role string did not name a known role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedRole(pub String);

impl fmt::Display for UnsupportedRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown mode: {:?} (expected \"car\" or \"garage\")", self.0)
    }
}

impl std::error::Error for UnsupportedRole {}

impl FromStr for Role {
    type Err = UnsupportedRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "car" => Ok(Self::Car),
            "garage" => Ok(Self::Garage),
            other => Err(UnsupportedRole(other.to_owned())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnsupportedRole;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// What the agent should do about one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Send `kind` back with `target = sender.id`, then blink.
    Reply(MessageKind),
    /// Pulse the relay, reply with an Ack, then blink.
    OpenDoor,
    /// Nothing to send (the tracker already consumed the ack); blink.
    Acknowledged,
    /// Not a command for this role: log and drop without blinking.
    Unhandled,
}

impl Reaction {
    /// Reply kind to send, if any.
    pub fn reply(self) -> Option<MessageKind> {
        match self {
            Self::Reply(kind) => Some(kind),
            Self::OpenDoor => Some(MessageKind::Ack),
            Self::Acknowledged | Self::Unhandled => None,
        }
    }

    pub fn pulses_relay(self) -> bool {
        matches!(self, Self::OpenDoor)
    }

    /// Every handled command blinks; only the unhandled branch skips it.
    pub fn blinks(self) -> bool {
        !matches!(self, Self::Unhandled)
    }
}

/// Role-specific command dispatch.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    role: Role,
}

impl Dispatcher {
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Decide the reaction to an accepted (channel-matched) message.
    pub fn dispatch(&self, msg: &Message) -> Reaction {
        match (msg.kind, self.role) {
            (MessageKind::Ping, _) => Reaction::Reply(MessageKind::Pong),
            (MessageKind::Pong, _) => Reaction::Reply(MessageKind::Ack),
            (MessageKind::Trigger, Role::Garage) => Reaction::OpenDoor,
            (MessageKind::Trigger, Role::Car) => Reaction::Unhandled,
            (MessageKind::Ack, _) => Reaction::Acknowledged,
        }
    }
}
