//! Garage-door relay driver.
//!
//! The relay contacts sit in parallel with the wall button, so a short
//! pulse is a button press. The driver is generic over any `embedded-hal`
//! output pin and delay provider.
//!
//! ## Safety contract
//!
//! The relay is never left energised: [`RelayDriver::pulse`] drives the pin
//! low again even when the high phase failed part-way.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::warn;

use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Open,
    Closed,
}

pub struct RelayDriver<P, D> {
    pin: P,
    delay: D,
    state: RelayState,
    pulses: u32,
}

impl<P: OutputPin, D: DelayNs> RelayDriver<P, D> {
    /// Take ownership of the pin and force the relay open.
    pub fn new(mut pin: P, delay: D) -> Self {
        if pin.set_low().is_err() {
            warn!("Relay: could not drive pin low at init");
        }
        Self {
            pin,
            delay,
            state: RelayState::Open,
            pulses: 0,
        }
    }

    /// Close the relay for `duration`, then open it again.
    pub fn pulse(&mut self, duration: Duration) -> Result<(), ActuatorError> {
        let closed = self.pin.set_high();
        if closed.is_ok() {
            self.state = RelayState::Closed;
            self.delay.delay_us(duration.as_micros() as u32);
        }

        let opened = self.pin.set_low();
        if opened.is_ok() {
            self.state = RelayState::Open;
        }

        closed
            .and(opened)
            .map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.pulses = self.pulses.wrapping_add(1);
        Ok(())
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Completed pulses since boot.
    pub fn pulse_count(&self) -> u32 {
        self.pulses
    }
}
