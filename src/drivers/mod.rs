//! Actuator drivers.

pub mod relay;
pub mod status_led;
