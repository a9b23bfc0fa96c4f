//! Port traits: the hexagonal boundary between protocol logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Agent (domain)
//! ```
//!
//! Driven adapters (radio, GPS, relay, LED, clock, event sinks) implement
//! these traits. The [`Agent`](super::service::Agent) consumes them via
//! generics, so the protocol core never touches hardware directly and
//! every transition can be driven from a test with mock adapters.

use core::time::Duration;

use crate::error::{ActuatorError, GpsError, RadioError};
use crate::geofence::Position;

/// Largest payload a LoRa transceiver hands us (RFM9x FIFO).
pub const MAX_RADIO_PAYLOAD: usize = 252;

/// A raw packet as received from the air, before decoding.
pub type RxPacket = heapless::Vec<u8, MAX_RADIO_PAYLOAD>;

// ───────────────────────────────────────────────────────────────
// Radio port (half-duplex, shared frequency)
// ───────────────────────────────────────────────────────────────

/// Half-duplex packet radio.
pub trait RadioLink {
    /// Transmit one packet.
    fn send(&mut self, packet: &[u8]) -> Result<(), RadioError>;

    /// Wait up to `timeout` for one packet.
    ///
    /// Returns `Ok(None)` when nothing arrived in time. This is the only
    /// blocking call in the main loop, so implementations MUST honour the
    /// bound.
    fn receive(&mut self, timeout: Duration) -> Result<Option<RxPacket>, RadioError>;
}

// ───────────────────────────────────────────────────────────────
// GPS port (read side, car role only)
// ───────────────────────────────────────────────────────────────

/// Position source.
pub trait GpsSource {
    /// Pull whatever the receiver has buffered. Called every loop iteration.
    fn update(&mut self) -> Result<(), GpsError>;

    /// Whether the receiver currently has a valid position solution.
    fn has_fix(&self) -> bool;

    /// Last known position. Only meaningful while [`has_fix`](Self::has_fix).
    fn position(&self) -> Position;
}

/// A GPS source that never obtains a fix. Used by the garage role, which
/// has no receiver fitted.
pub struct NullGps;

impl GpsSource for NullGps {
    fn update(&mut self) -> Result<(), GpsError> {
        Ok(())
    }

    fn has_fix(&self) -> bool {
        false
    }

    fn position(&self) -> Position {
        Position::default()
    }
}

// ───────────────────────────────────────────────────────────────
// Actuator ports (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Relay that momentarily closes the garage-door button circuit.
pub trait RelayActuator {
    /// Energise the relay for `duration`, then restore it to off.
    fn pulse(&mut self, duration: Duration) -> Result<(), ActuatorError>;
}

/// Activity LED.
pub trait StatusIndicator {
    /// One short blink.
    fn blink(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin (boot).
    fn now_ms(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The agent emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
