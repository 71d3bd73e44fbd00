//! Oven configuration
//!
//! Thresholds, timing and controller tuning. The defaults reproduce the
//! stock sanitizer/dryer build; the firmware overrides them from its
//! build-time configuration file.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::control::{PidGains, DEFAULT_PID_SAMPLE_MS, DEFAULT_WINDOW_MS};
use crate::input::{DEFAULT_DEBOUNCE_MS, DEFAULT_LONG_PRESS_MS};
use crate::safety::DEFAULT_FAULT_THRESHOLD;
use crate::state::PhaseLimits;

/// Aggressive gains for the heat-up ramp
pub const PREHEAT_GAINS: PidGains = PidGains::new(300.0, 0.05, 250.0);

/// Gentle gains for holding temperature without overshoot
pub const SOAK_GAINS: PidGains = PidGains::new(50.0, 0.025, 50.0);

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No thermal profiles registered
    NoProfiles,
    /// Sensor sampling period is zero
    ZeroSensorPeriod,
    /// Relay window is zero
    ZeroWindow,
    /// PID sample period is zero
    ZeroPidSample,
    /// Fault threshold is zero
    ZeroFaultThreshold,
    /// Long-press time must exceed the debounce time
    LongPressTooShort,
}

/// Oven configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OvenConfig {
    /// Idle oven at or above this refuses to start (°C)
    pub room_temperature_c: i16,
    /// Cooling oven at or below this is done (°C)
    pub cool_min_c: i16,
    /// Sensor sampling period (ms)
    pub sensor_period_ms: u32,
    /// Consecutive invalid samples that latch a fault
    pub fault_threshold: u8,
    /// Switch debounce time (ms)
    pub debounce_ms: u32,
    /// Hold time for a long press (ms)
    pub long_press_ms: u32,
    /// Time-proportioning window (ms)
    pub window_ms: u32,
    /// PID sample period (ms)
    pub pid_sample_ms: u32,
    /// How long the Complete phase lasts (ms)
    pub complete_hold_ms: u32,
    /// Gains used while heating up
    pub preheat_gains: PidGains,
    /// Gains used while holding temperature
    pub soak_gains: PidGains,
}

impl Default for OvenConfig {
    fn default() -> Self {
        Self {
            room_temperature_c: 45,
            cool_min_c: 50,
            sensor_period_ms: 1000,
            fault_threshold: DEFAULT_FAULT_THRESHOLD,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            long_press_ms: DEFAULT_LONG_PRESS_MS,
            window_ms: DEFAULT_WINDOW_MS,
            pid_sample_ms: DEFAULT_PID_SAMPLE_MS,
            complete_hold_ms: 5000,
            preheat_gains: PREHEAT_GAINS,
            soak_gains: SOAK_GAINS,
        }
    }
}

impl OvenConfig {
    /// Check the configuration for values the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sensor_period_ms == 0 {
            return Err(ConfigError::ZeroSensorPeriod);
        }
        if self.window_ms == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.pid_sample_ms == 0 {
            return Err(ConfigError::ZeroPidSample);
        }
        if self.fault_threshold == 0 {
            return Err(ConfigError::ZeroFaultThreshold);
        }
        if self.long_press_ms <= self.debounce_ms {
            return Err(ConfigError::LongPressTooShort);
        }
        Ok(())
    }

    /// Thresholds consumed by the phase state machine
    pub fn phase_limits(&self) -> PhaseLimits {
        PhaseLimits {
            room_temperature_c: f32::from(self.room_temperature_c),
            cool_min_c: f32::from(self.cool_min_c),
            complete_hold_ms: self.complete_hold_ms,
        }
    }
}
