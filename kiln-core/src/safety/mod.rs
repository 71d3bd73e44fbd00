//! Safety monitoring
//!
//! Detects sensor faults that must gate the heater off.

pub mod fault;

pub use fault::{FaultFilter, FilteredReading, DEFAULT_FAULT_THRESHOLD};
