//! Outstanding-message tracker.
//!
//! Owns every sent-but-unacknowledged message and drives retransmission.
//!
//! ## Entry lifecycle
//!
//! 1. A non-ack message is sent for the first time → an entry is created
//!    (before the radio is touched, so a failed first transmit still gets
//!    retried).
//! 2. Any inbound message whose `target` equals the entry's `id` removes it.
//!    Ping/Pong replies count, not only Acks.
//! 3. Once an entry is `ack_timeout` old it is re-sent with the same id and
//!    its timestamp is reset. There is no retry ceiling.
//!
//! Acks and retransmissions never create entries.

use core::time::Duration;

use log::{debug, warn};

use crate::app::ports::RadioLink;
use crate::error::RadioError;

use super::codec::{encode, Message, MessageKind};

/// Ids are the last four decimal digits of the millisecond clock.
const ID_SPACE: u64 = 10_000;

/// Derive a message id from the millisecond clock.
///
/// Zero is reserved for "unsolicited" in the `target` field, so a clock
/// reading ending in `0000` mints id 1 instead.
pub fn mint_id(now_ms: u64) -> u16 {
    match (now_ms % ID_SPACE) as u16 {
        0 => 1,
        id => id,
    }
}

/// A message awaiting acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outstanding {
    pub message: Message,
    /// Clock reading of the latest (re)transmission.
    pub created_at_ms: u64,
}

/// Outcome of handing one message to the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Transmission {
    pub message: Message,
    pub result: Result<(), RadioError>,
}

/// The set of outstanding messages for one channel.
pub struct OutstandingTracker {
    channel: u16,
    ack_timeout_ms: u64,
    /// Kept in insertion order; index 0 is the oldest entry. Unbounded:
    /// an entry leaves only when its reply arrives.
    entries: Vec<Outstanding>,
}

impl OutstandingTracker {
    pub fn new(channel: u16, ack_timeout: Duration) -> Self {
        Self {
            channel,
            ack_timeout_ms: ack_timeout.as_millis() as u64,
            entries: Vec::new(),
        }
    }

    /// Build a message and hand it to the radio.
    ///
    /// A fresh id is minted unless `reuse_id` is given (retransmits). Only
    /// first sends of non-ack kinds are tracked.
    pub fn send(
        &mut self,
        radio: &mut impl RadioLink,
        now_ms: u64,
        kind: MessageKind,
        target: u16,
        reuse_id: Option<u16>,
    ) -> Transmission {
        let message = Message {
            id: reuse_id.unwrap_or_else(|| mint_id(now_ms)),
            channel: self.channel,
            kind,
            target,
        };

        if reuse_id.is_none() && kind != MessageKind::Ack {
            self.track(message, now_ms);
        }

        let result = radio.send(&encode(&message));
        Transmission { message, result }
    }

    /// Treat `msg` as a possible reply. Returns the entry it acknowledged.
    pub fn on_receive(&mut self, msg: &Message) -> Option<Outstanding> {
        if !msg.is_reply() {
            return None;
        }
        let pos = self
            .entries
            .iter()
            .position(|e| e.message.id == msg.target)?;
        let entry = self.entries.remove(pos);
        debug!("Tracker: {} acknowledged by {}", entry.message, msg);
        Some(entry)
    }

    /// Re-send every entry that has waited at least the ack timeout.
    pub fn tick(
        &mut self,
        radio: &mut impl RadioLink,
        now_ms: u64,
    ) -> Vec<Transmission> {
        let mut due = Vec::new();
        for entry in self.entries.iter_mut() {
            if now_ms.saturating_sub(entry.created_at_ms) >= self.ack_timeout_ms {
                entry.created_at_ms = now_ms;
                due.push(entry.message);
            }
        }

        due.into_iter()
            .map(|msg| self.send(radio, now_ms, msg.kind, msg.target, Some(msg.id)))
            .collect()
    }

    /// Number of messages awaiting acknowledgement.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the outstanding entry for `id`.
    pub fn get(&self, id: u16) -> Option<&Outstanding> {
        self.entries.iter().find(|e| e.message.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outstanding> {
        self.entries.iter()
    }

    // ── Internal ──────────────────────────────────────────────

    fn track(&mut self, message: Message, now_ms: u64) {
        let entry = Outstanding {
            message,
            created_at_ms: now_ms,
        };

        // One entry per id: a clock-derived id can collide with one still
        // in flight, in which case the newer message takes the slot.
        if let Some(existing) = self.entries.iter_mut().find(|e| e.message.id == message.id) {
            warn!(
                "Tracker: id {} reused while outstanding, {} replaces {}",
                message.id, message, existing.message
            );
            *existing = entry;
            return;
        }

        self.entries.push(entry);
    }
}
