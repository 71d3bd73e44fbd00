//! Heater, indicator and temperature sensor traits

/// Raw readings that a sensor reports instead of a temperature when the
/// probe is disconnected, shorted or the bus returned nothing.
pub const SENSOR_FAULT_SENTINELS: [f32; 2] = [0.0, -1.0];

/// Check whether a raw sensor value is a usable temperature
///
/// NaN is treated like a sentinel so drivers that report "no value" that way
/// still trip the fault filter.
pub fn is_valid_reading(raw_c: f32) -> bool {
    !raw_c.is_nan() && !SENSOR_FAULT_SENTINELS.contains(&raw_c)
}

/// Errors that can occur when driving an output pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// The underlying pin rejected the write
    Pin,
}

/// Trait for temperature sensors
///
/// Implementations wrap the specific probe (thermocouple amplifier,
/// thermistor, etc.). There is no richer error channel: a failed read is
/// reported as one of [`SENSOR_FAULT_SENTINELS`].
pub trait TemperatureSensor {
    /// Read the current temperature in degrees Celsius
    ///
    /// Takes `&mut self` because bus reads typically require mutable access.
    fn read_celsius(&mut self) -> f32;
}

/// Trait for heater output control
///
/// Implementations control the heater element via GPIO or SSR.
pub trait HeaterOutput {
    /// Turn the heater on or off
    fn set_on(&mut self, on: bool) -> Result<(), OutputError>;

    /// Check if the heater is currently on
    fn is_on(&self) -> bool;
}

/// Trait for the "run complete" indicator (LED, buzzer)
pub trait Indicator {
    /// Turn the indicator on or off
    fn set_on(&mut self, on: bool) -> Result<(), OutputError>;
}
