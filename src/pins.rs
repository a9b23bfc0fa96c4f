//! GPIO / peripheral pin assignments for the OpenSesame node board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers. The relay pin can be overridden per device via
//! `relay.pin` in the config; the rest are fixed by the board.

// ---------------------------------------------------------------------------
// Garage relay (opto-isolated coil driver, active HIGH)
// ---------------------------------------------------------------------------

/// Default relay output when the config does not name one.
pub const RELAY_GPIO: i32 = 14;

/// Highest GPIO number on the ESP32 family (S3).
pub const MAX_GPIO: i32 = 48;

// ---------------------------------------------------------------------------
// Status LED (single colour, active HIGH)
// ---------------------------------------------------------------------------

pub const STATUS_LED_GPIO: i32 = 13;

/// On-time of one activity blink.
pub const BLINK_MS: u32 = 50;
