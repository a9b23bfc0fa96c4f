//! Single-colour activity LED driver.
//!
//! Blinks once for every handled command. Generic over an `embedded-hal`
//! output pin; a failed write is logged and otherwise ignored since the LED
//! is purely cosmetic.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::trace;

use crate::pins;

pub struct StatusLed<P, D> {
    pin: P,
    delay: D,
    blinks: u32,
}

impl<P: OutputPin, D: DelayNs> StatusLed<P, D> {
    pub fn new(mut pin: P, delay: D) -> Self {
        let _ = pin.set_low();
        Self {
            pin,
            delay,
            blinks: 0,
        }
    }

    /// On for [`pins::BLINK_MS`], then off.
    pub fn blink(&mut self) {
        if self.pin.set_high().is_err() {
            trace!("StatusLed: set_high failed");
        }
        self.delay.delay_ms(pins::BLINK_MS);
        if self.pin.set_low().is_err() {
            trace!("StatusLed: set_low failed");
        }
        self.blinks = self.blinks.wrapping_add(1);
    }

    /// Blinks since boot.
    pub fn blink_count(&self) -> u32 {
        self.blinks
    }
}
