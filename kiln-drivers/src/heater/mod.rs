//! Relay and indicator outputs

pub mod gpio;

pub use gpio::{GpioHeater, GpioIndicator};
