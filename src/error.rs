//! Unified error types for the OpenSesame firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! main loop's error handling uniform. All variants are `Copy` so they can
//! be handed through port calls and events without allocation.
//!
//! None of these are fatal once the loop is running: the agent logs them
//! and carries on. Only configuration errors stop the device, and those
//! are raised before the loop starts (see [`crate::config::ConfigError`]).

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible port operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The radio link failed to send or receive.
    Radio(RadioError),
    /// The GPS receiver could not be read.
    Gps(GpsError),
    /// An actuator command failed.
    Actuator(ActuatorError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radio(e) => write!(f, "radio: {e}"),
            Self::Gps(e) => write!(f, "gps: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Radio errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// Transmit did not complete.
    SendFailed,
    /// Receive failed for a reason other than a timeout.
    ReceiveFailed,
    /// Payload exceeds the transceiver FIFO.
    PacketTooLarge(usize),
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SendFailed => write!(f, "send failed"),
            Self::ReceiveFailed => write!(f, "receive failed"),
            Self::PacketTooLarge(len) => write!(f, "packet too large ({len} bytes)"),
        }
    }
}

impl std::error::Error for RadioError {}

impl From<RadioError> for Error {
    fn from(e: RadioError) -> Self {
        Self::Radio(e)
    }
}

// ---------------------------------------------------------------------------
// GPS errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpsError {
    /// The UART / serial stream returned an error.
    ReadFailed,
    /// A configuration sentence could not be written.
    WriteFailed,
    /// A sentence failed its checksum or could not be parsed.
    BadSentence,
}

impl fmt::Display for GpsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "read failed"),
            Self::WriteFailed => write!(f, "write failed"),
            Self::BadSentence => write!(f, "bad NMEA sentence"),
        }
    }
}

impl std::error::Error for GpsError {}

impl From<GpsError> for Error {
    fn from(e: GpsError) -> Self {
        Self::Gps(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
    /// This device has no relay wired (car role).
    NotFitted,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::NotFitted => write!(f, "actuator not fitted"),
        }
    }
}

impl std::error::Error for ActuatorError {}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}
