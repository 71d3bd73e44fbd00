//! Board-agnostic core logic for the Kiln oven controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (sensor, heater, switch, display)
//! - Sensor fault filtering
//! - Push-button debouncing
//! - Thermal profile registry
//! - Reflow phase state machine
//! - Time-proportioning PID heater control
//! - Configuration type definitions
//! - The per-tick control loop tying them together

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod control;
pub mod input;
pub mod oven;
pub mod profile;
pub mod safety;
pub mod state;
pub mod traits;

pub use oven::{Board, Oven, OvenCore, OvenError, TickReport};
