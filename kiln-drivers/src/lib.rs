//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in kiln-core on top of `embedded-hal` 1.0:
//!
//! - Thermocouple sensor (MAX6675 over SPI)
//! - Relay and indicator outputs (GPIO)
//! - Push-button input (GPIO, active low)
//! - Text status display formatting

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod heater;
pub mod input;
pub mod sensor;
