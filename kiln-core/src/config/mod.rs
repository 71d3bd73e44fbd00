//! Configuration types

pub mod oven;

pub use oven::{ConfigError, OvenConfig, PREHEAT_GAINS, SOAK_GAINS};
