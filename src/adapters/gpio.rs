//! GPIO output pin adapter.
//!
//! Implements `embedded-hal`'s [`OutputPin`] for a numbered GPIO so the
//! generic drivers can run on the board and on the host.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: configures the pin as a push-pull output and writes it with
//! `gpio_set_level`.
//! On host/test: tracks the level in memory only.

use core::fmt;

use embedded_hal::digital::{Error, ErrorKind, ErrorType, OutputPin, StatefulOutputPin};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// ESP-IDF return code from a failed GPIO call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioError(pub i32);

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO call failed (rc={})", self.0)
    }
}

impl std::error::Error for GpioError {}

impl Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// One push-pull output.
pub struct GpioPin {
    pin: i32,
    high: bool,
}

impl GpioPin {
    /// Configure `pin` as an output, initially low.
    #[cfg(target_os = "espidf")]
    pub fn output(pin: i32) -> Result<Self, GpioError> {
        let pin_bit_mask = u32::try_from(pin)
            .ok()
            .and_then(|p| 1u64.checked_shl(p))
            .ok_or(GpioError(ESP_ERR_INVALID_ARG as i32))?;
        let cfg = gpio_config_t {
            pin_bit_mask,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: called from the single main task during bring-up.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(GpioError(ret));
        }
        let mut this = Self { pin, high: true };
        this.write(false)?;
        Ok(this)
    }

    /// Configure `pin` as an output, initially low.
    #[cfg(not(target_os = "espidf"))]
    pub fn output(pin: i32) -> Result<Self, GpioError> {
        log::debug!("gpio(sim): pin {} configured as output", pin);
        Ok(Self { pin, high: false })
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }

    #[cfg(target_os = "espidf")]
    fn write(&mut self, high: bool) -> Result<(), GpioError> {
        // SAFETY: pin was configured as an output in `output()`; main-loop only.
        let ret = unsafe { gpio_set_level(self.pin, u32::from(high)) };
        if ret != ESP_OK as i32 {
            return Err(GpioError(ret));
        }
        self.high = high;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn write(&mut self, high: bool) -> Result<(), GpioError> {
        log::trace!("gpio(sim): pin {} -> {}", self.pin, u8::from(high));
        self.high = high;
        Ok(())
    }
}

impl ErrorType for GpioPin {
    type Error = GpioError;
}

impl OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), GpioError> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), GpioError> {
        self.write(true)
    }
}

impl StatefulOutputPin for GpioPin {
    fn is_set_high(&mut self) -> Result<bool, GpioError> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, GpioError> {
        Ok(!self.high)
    }
}
