//! Application core: protocol orchestration, zero I/O.
//!
//! [`service::Agent`] ties the link layer, the geofence and the tick
//! scheduler together. All interaction with radio, GPS and actuators goes
//! through the **port traits** in [`ports`], so the core is fully testable
//! without a transceiver attached.

pub mod events;
pub mod ports;
pub mod service;
