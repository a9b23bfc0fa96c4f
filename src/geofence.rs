//! Two-phase geofence trigger (car role).
//!
//! The opener must fire when the car comes *home*, not while it is still
//! pulling out of the driveway. Two latched flags give that:
//!
//! ```text
//!            d >= activation radius          d <= trigger radius
//!   Idle ─────────────────────────▶ Armed ─────────────────────▶ Fired
//!                                                        (latched until restart)
//! ```
//!
//! Evaluated once per 1-second tick, and only while the GPS has a fix.
//! Without a fix the tick is skipped entirely: no state change, no error.

use log::{debug, info};

use crate::app::ports::GpsSource;
use crate::config::TriggerZoneConfig;

/// Mean Earth radius used by the haversine distance.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Great-circle distance between two positions, in metres.
pub fn haversine_m(a: Position, b: Position) -> f64 {
    let (lat1, lon1) = (a.lat.to_radians(), a.lon.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lon.to_radians());

    let h = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    c * EARTH_RADIUS_M
}

/// Centre and radii of the trigger zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerZone {
    pub center: Position,
    /// Fire when at most this far from the centre.
    pub radius_m: f64,
    /// Arm once at least this far from the centre.
    pub activation_radius_m: f64,
}

impl From<&TriggerZoneConfig> for TriggerZone {
    fn from(cfg: &TriggerZoneConfig) -> Self {
        Self {
            center: Position::new(cfg.lat, cfg.lon),
            radius_m: cfg.radius_meters,
            activation_radius_m: cfg.activation_radius_meters,
        }
    }
}

/// State changes reported by [`GeofenceTrigger::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeofenceEvent {
    /// Left the neighbourhood; the trigger is now armed.
    Armed { distance_m: f64 },
    /// Came back inside the trigger radius; send the trigger now.
    Fire { distance_m: f64 },
}

/// The arm/fire state machine. `fired` implies `armed`.
pub struct GeofenceTrigger {
    zone: TriggerZone,
    armed: bool,
    fired: bool,
}

impl GeofenceTrigger {
    pub fn new(zone: TriggerZone) -> Self {
        Self {
            zone,
            armed: false,
            fired: false,
        }
    }

    /// One 1-second evaluation against the GPS.
    pub fn tick(&mut self, gps: &impl GpsSource) -> Option<GeofenceEvent> {
        if !gps.has_fix() {
            debug!("Geofence: waiting for fix...");
            return None;
        }
        self.evaluate(gps.position())
    }

    /// Advance the state machine with one position sample.
    pub fn evaluate(&mut self, position: Position) -> Option<GeofenceEvent> {
        let distance_m = haversine_m(position, self.zone.center);
        let mut event = None;

        if !self.armed && distance_m >= self.zone.activation_radius_m {
            self.armed = true;
            info!("Geofence: trigger zone activated ({:.0} m out)", distance_m);
            event = Some(GeofenceEvent::Armed { distance_m });
        }

        if self.armed && !self.fired && distance_m <= self.zone.radius_m {
            self.fired = true;
            info!("Geofence: inside trigger radius ({:.1} m), firing", distance_m);
            event = Some(GeofenceEvent::Fire { distance_m });
        }

        event
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn zone(&self) -> &TriggerZone {
        &self.zone
    }
}
