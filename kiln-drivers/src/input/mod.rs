//! Operator inputs

pub mod switch;

pub use switch::GpioSwitch;
