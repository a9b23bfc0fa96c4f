//! Device configuration parameters
//!
//! All tunable parameters for an OpenSesame node, read once at startup from
//! a JSON document. Every field has a default, so a document only needs to
//! name what differs (usually `mode`, `channel` and the trigger zone).

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::link::dispatch::{Role, UnsupportedRole};
use crate::pins;

/// Core device configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    // --- Device mode ---
    /// Which end of the link this is (`"car"` or `"garage"`)
    pub mode: Role,
    /// Logical channel shared with the paired device
    pub channel: u16,

    // --- Link ---
    /// How long to wait for an acknowledgement before resending (seconds)
    pub ack_timeout_secs: f32,

    pub relay: RelayConfig,
    pub lora: LoraConfig,
    pub gps: GpsConfig,
}

/// Garage-role relay binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// GPIO the relay coil driver is wired to
    pub pin: i32,
    /// How long to hold the relay closed (seconds)
    pub delay_secs: f32,
}

/// LoRa radio parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoraConfig {
    /// Carrier frequency (433, 868 or 915 MHz)
    pub freq_mhz: f32,
    /// How long one receive waits for a packet (seconds)
    pub msg_timeout_secs: f32,
    /// Transmit power (RFM9x: 5–23 dB)
    pub tx_power_db: i8,
}

/// Car-role GPS and geofence parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpsConfig {
    /// How often the receiver reports a position (milliseconds)
    pub update_rate_ms: u32,
    /// Which NMEA sentences the receiver emits
    pub mode: GpsOutputMode,
    /// Garage door opening zone
    pub trigger_zone: TriggerZoneConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerZoneConfig {
    pub lat: f64,
    pub lon: f64,
    /// How close to the centre the trigger fires (metres)
    pub radius_meters: f64,
    /// How far the car must drive away before the trigger arms (metres).
    /// Without this the door would open as we leave the neighbourhood.
    pub activation_radius_meters: f64,
}

/// NMEA output selection sent to the receiver with `PMTK314`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GpsOutputMode {
    /// Basic GGA and RMC info
    GgaRmc,
    /// RMC only (position, fix status)
    RmcLoc,
    /// All sentences disabled
    Off,
    /// Everything the receiver supports
    All,
}

impl GpsOutputMode {
    /// Body of the `PMTK314` sentence (no `$`, no checksum).
    pub fn pmtk_body(self) -> &'static str {
        match self {
            Self::GgaRmc => "PMTK314,0,1,0,1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0",
            Self::RmcLoc => "PMTK314,0,1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0",
            Self::Off => "PMTK314,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0",
            Self::All => "PMTK314,1,1,1,1,1,1,0,0,0,0,0,0,0,0,0,0,0,0,0",
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            mode: Role::Car,
            channel: 1,
            ack_timeout_secs: 5.0,
            relay: RelayConfig::default(),
            lora: LoraConfig::default(),
            gps: GpsConfig::default(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            pin: pins::RELAY_GPIO,
            delay_secs: 0.1,
        }
    }
}

impl Default for LoraConfig {
    fn default() -> Self {
        Self {
            freq_mhz: 915.0,
            msg_timeout_secs: 1.0,
            tx_power_db: 23,
        }
    }
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self {
            update_rate_ms: 1000,
            mode: GpsOutputMode::RmcLoc,
            trigger_zone: TriggerZoneConfig::default(),
        }
    }
}

impl Default for TriggerZoneConfig {
    fn default() -> Self {
        Self {
            lat: 29.888130,
            lon: -90.193034,
            radius_meters: 15.0,
            activation_radius_meters: 250.0,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Loading and validation
// ───────────────────────────────────────────────────────────────

/// Errors raised while loading configuration. All of them are fatal: the
/// device must not start with a configuration it does not understand.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The config file could not be read.
    Io(String),
    /// The document is not valid JSON for [`DeviceConfig`].
    Parse(String),
    /// `mode` named a role other than car or garage.
    UnsupportedRole(String),
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "cannot read config: {}", msg),
            Self::Parse(msg) => write!(f, "invalid config: {}", msg),
            Self::UnsupportedRole(mode) => write!(f, "unknown mode: {:?}", mode),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<UnsupportedRole> for ConfigError {
    fn from(e: UnsupportedRole) -> Self {
        Self::UnsupportedRole(e.0)
    }
}

impl DeviceConfig {
    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json(&text)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        // Check the role first so an unknown mode is reported as such rather
        // than as a generic parse failure.
        let raw: serde_json::Value =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if let Some(mode) = raw.get("mode").and_then(serde_json::Value::as_str) {
            mode.parse::<Role>()?;
        }

        let cfg: Self =
            serde_json::from_value(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Range-check every field. Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ack_timeout_secs > 0.0 && self.ack_timeout_secs <= 3600.0) {
            return Err(ConfigError::ValidationFailed(
                "ack_timeout_secs must be within (0, 3600]",
            ));
        }
        if !(self.relay.delay_secs > 0.0 && self.relay.delay_secs <= 10.0) {
            return Err(ConfigError::ValidationFailed(
                "relay.delay_secs must be within (0, 10]",
            ));
        }
        if !(0..=pins::MAX_GPIO).contains(&self.relay.pin) {
            return Err(ConfigError::ValidationFailed("relay.pin must be GPIO 0–48"));
        }
        if ![433.0, 868.0, 915.0].contains(&self.lora.freq_mhz) {
            return Err(ConfigError::ValidationFailed(
                "lora.freq_mhz must be 433, 868 or 915",
            ));
        }
        if !(self.lora.msg_timeout_secs > 0.0 && self.lora.msg_timeout_secs <= 60.0) {
            return Err(ConfigError::ValidationFailed(
                "lora.msg_timeout_secs must be within (0, 60]",
            ));
        }
        if !(5..=23).contains(&self.lora.tx_power_db) {
            return Err(ConfigError::ValidationFailed(
                "lora.tx_power_db must be 5–23",
            ));
        }
        if !(100..=10_000).contains(&self.gps.update_rate_ms) {
            return Err(ConfigError::ValidationFailed(
                "gps.update_rate_ms must be 100–10000",
            ));
        }

        let zone = &self.gps.trigger_zone;
        if !(-90.0..=90.0).contains(&zone.lat) || !(-180.0..=180.0).contains(&zone.lon) {
            return Err(ConfigError::ValidationFailed(
                "gps.trigger_zone lat/lon out of range",
            ));
        }
        if !(zone.radius_meters > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "gps.trigger_zone.radius_meters must be positive",
            ));
        }
        if !(zone.activation_radius_meters > zone.radius_meters) {
            return Err(ConfigError::ValidationFailed(
                "gps.trigger_zone.activation_radius_meters must exceed radius_meters",
            ));
        }
        Ok(())
    }

    /// Retry interval as a [`Duration`](core::time::Duration).
    pub fn ack_timeout(&self) -> core::time::Duration {
        millis(self.ack_timeout_secs)
    }

    /// Relay pulse length.
    pub fn relay_pulse(&self) -> core::time::Duration {
        millis(self.relay.delay_secs)
    }

    /// Upper bound for one radio receive.
    pub fn receive_timeout(&self) -> core::time::Duration {
        millis(self.lora.msg_timeout_secs)
    }
}

/// Seconds from the config file, rounded to whole milliseconds.
fn millis(secs: f32) -> core::time::Duration {
    core::time::Duration::from_millis((secs * 1000.0).round() as u64)
}
