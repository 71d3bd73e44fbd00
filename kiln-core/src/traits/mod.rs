//! Hardware abstraction traits
//!
//! These traits define the narrow capabilities the control core needs from
//! the board: one temperature input, two on/off outputs, one switch and a
//! status display.

pub mod display;
pub mod heater;
pub mod input;

pub use display::{DisplayError, SoakProgress, StatusDisplay, StatusSnapshot};
pub use heater::{
    is_valid_reading, HeaterOutput, Indicator, OutputError, TemperatureSensor,
    SENSOR_FAULT_SENTINELS,
};
pub use input::SwitchInput;
