//! Hardware adapter: bridges the actuator drivers to domain port traits.
//!
//! Owns the optional relay (garage role only) and the status LED, exposing
//! them through [`RelayActuator`] and [`StatusIndicator`].

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::warn;

use crate::adapters::gpio::{GpioError, GpioPin};
use crate::adapters::time::StdDelay;
use crate::app::ports::{RelayActuator, StatusIndicator};
use crate::drivers::relay::RelayDriver;
use crate::drivers::status_led::StatusLed;
use crate::error::ActuatorError;
use crate::pins;

/// Concrete adapter that combines the node's actuators behind port traits.
pub struct HardwareAdapter<P = GpioPin, D = StdDelay> {
    relay: Option<RelayDriver<P, D>>,
    led: StatusLed<P, D>,
}

impl<P: OutputPin, D: DelayNs> HardwareAdapter<P, D> {
    /// Garage node: relay and LED.
    pub fn with_relay(relay: RelayDriver<P, D>, led: StatusLed<P, D>) -> Self {
        Self {
            relay: Some(relay),
            led,
        }
    }

    /// Car node: LED only.
    pub fn without_relay(led: StatusLed<P, D>) -> Self {
        Self { relay: None, led }
    }

    pub fn relay(&self) -> Option<&RelayDriver<P, D>> {
        self.relay.as_ref()
    }

    pub fn led(&self) -> &StatusLed<P, D> {
        &self.led
    }
}

impl HardwareAdapter<GpioPin, StdDelay> {
    /// Bring up the board's GPIO outputs. `relay_pin` is `None` on the car.
    pub fn from_pins(relay_pin: Option<i32>) -> Result<Self, GpioError> {
        let led = StatusLed::new(GpioPin::output(pins::STATUS_LED_GPIO)?, StdDelay);
        Ok(match relay_pin {
            Some(pin) => Self::with_relay(RelayDriver::new(GpioPin::output(pin)?, StdDelay), led),
            None => Self::without_relay(led),
        })
    }
}

// ── RelayActuator implementation ──────────────────────────────

impl<P: OutputPin, D: DelayNs> RelayActuator for HardwareAdapter<P, D> {
    fn pulse(&mut self, duration: Duration) -> Result<(), ActuatorError> {
        match self.relay.as_mut() {
            Some(relay) => relay.pulse(duration),
            None => {
                warn!("Hardware: relay pulse requested but no relay fitted");
                Err(ActuatorError::NotFitted)
            }
        }
    }
}

// ── StatusIndicator implementation ────────────────────────────

impl<P: OutputPin, D: DelayNs> StatusIndicator for HardwareAdapter<P, D> {
    fn blink(&mut self) {
        self.led.blink();
    }
}
