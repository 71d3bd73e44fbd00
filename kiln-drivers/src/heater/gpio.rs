//! GPIO relay and indicator outputs
//!
//! Heater control through a GPIO pin driving an SSR or relay module.

use embedded_hal::digital::OutputPin;
use kiln_core::traits::{HeaterOutput, Indicator, OutputError};

/// GPIO heater relay
///
/// The pin can be configured as active-high (default) or active-low.
pub struct GpioHeater<P> {
    pin: P,
    /// If true, heater ON = pin LOW
    inverted: bool,
    /// Last state successfully written
    on: bool,
}

impl<P: OutputPin> GpioHeater<P> {
    /// Create a new GPIO heater output, driven off
    ///
    /// # Arguments
    /// - `pin`: The GPIO pin to control
    /// - `inverted`: If true, heater is ON when pin is LOW (active-low relay boards)
    pub fn new(pin: P, inverted: bool) -> Result<Self, OutputError> {
        let mut heater = Self {
            pin,
            inverted,
            on: true,
        };
        heater.set_on(false)?;
        Ok(heater)
    }

    /// Create a new GPIO heater with active-high output
    pub fn new_active_high(pin: P) -> Result<Self, OutputError> {
        Self::new(pin, false)
    }

    /// Create a new GPIO heater with active-low output
    pub fn new_active_low(pin: P) -> Result<Self, OutputError> {
        Self::new(pin, true)
    }

    /// Release the pin
    pub fn free(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> HeaterOutput for GpioHeater<P> {
    fn set_on(&mut self, on: bool) -> Result<(), OutputError> {
        drive(&mut self.pin, on != self.inverted)?;
        self.on = on;
        Ok(())
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

/// Active-high GPIO indicator (LED)
pub struct GpioIndicator<P> {
    pin: P,
}

impl<P: OutputPin> GpioIndicator<P> {
    /// Create a new indicator, driven off
    pub fn new(mut pin: P) -> Result<Self, OutputError> {
        drive(&mut pin, false)?;
        Ok(Self { pin })
    }
}

impl<P: OutputPin> Indicator for GpioIndicator<P> {
    fn set_on(&mut self, on: bool) -> Result<(), OutputError> {
        drive(&mut self.pin, on)
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), OutputError> {
    let result = if high { pin.set_high() } else { pin.set_low() };
    result.map_err(|_| OutputError::Pin)
}
