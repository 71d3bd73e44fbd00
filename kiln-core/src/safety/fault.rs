//! Sensor fault filter
//!
//! A single noisy sample must not abort a multi-hour run, but a sensor that
//! keeps returning garbage must stop the heater. The filter counts
//! consecutive invalid samples and latches a fault once the count reaches
//! the threshold; the next valid sample clears it.

use crate::traits::is_valid_reading;

/// Consecutive invalid samples that latch a fault
pub const DEFAULT_FAULT_THRESHOLD: u8 = 3;

/// Result of feeding one raw sample through the filter
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FilteredReading {
    /// Most recent valid temperature, held across isolated bad samples
    pub temperature_c: Option<f32>,
    /// The raw sample that produced this reading was usable
    pub valid: bool,
    /// Fault latched
    pub fault: bool,
}

/// Consecutive-invalid counter with a latched fault flag
#[derive(Debug, Clone)]
pub struct FaultFilter {
    threshold: u8,
    consecutive_invalid: u8,
    faulted: bool,
    last_valid_c: Option<f32>,
    last_sample_valid: bool,
}

impl Default for FaultFilter {
    fn default() -> Self {
        Self::new(DEFAULT_FAULT_THRESHOLD)
    }
}

impl FaultFilter {
    /// Create a new filter
    ///
    /// A threshold of zero is treated as one.
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive_invalid: 0,
            faulted: false,
            last_valid_c: None,
            last_sample_valid: false,
        }
    }

    /// Feed one raw sample
    pub fn sample(&mut self, raw_c: f32) -> FilteredReading {
        if is_valid_reading(raw_c) {
            self.consecutive_invalid = 0;
            self.faulted = false;
            self.last_valid_c = Some(raw_c);
            self.last_sample_valid = true;
        } else {
            self.consecutive_invalid = self.consecutive_invalid.saturating_add(1);
            self.last_sample_valid = false;
            if self.consecutive_invalid >= self.threshold {
                self.faulted = true;
            }
        }

        self.reading()
    }

    /// Current filtered view without feeding a sample
    pub fn reading(&self) -> FilteredReading {
        FilteredReading {
            temperature_c: self.last_valid_c,
            valid: self.last_sample_valid,
            fault: self.faulted,
        }
    }

    /// Check whether the fault is latched
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    /// Number of invalid samples since the last valid one
    pub fn consecutive_invalid(&self) -> u8 {
        self.consecutive_invalid
    }

    /// Most recent valid temperature
    pub fn last_valid(&self) -> Option<f32> {
        self.last_valid_c
    }
}
