//! Status display trait
//!
//! The display is output-only: it receives a read-only snapshot each tick
//! and never feeds anything back into the control core.

use crate::state::ReflowPhase;

/// Errors that can occur with display communication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transaction failed
    Bus,
    /// Text did not fit the line buffer
    BufferOverflow,
}

/// Soak timer shown while holding temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoakProgress {
    /// Seconds spent in the hold phase so far
    pub elapsed_s: u32,
    /// Configured hold duration in seconds
    pub total_s: u32,
}

/// Per-tick view of the controller handed to the display
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusSnapshot<'a> {
    /// Last good temperature, `None` until the first valid sample
    pub temperature_c: Option<f32>,
    /// Sensor fault currently latched
    pub sensor_fault: bool,
    /// Selected profile name
    pub profile_name: &'a str,
    /// Active phase
    pub phase: ReflowPhase,
    /// Soak timer, only present during [`ReflowPhase::Soak`]
    pub soak: Option<SoakProgress>,
}

impl StatusSnapshot<'_> {
    /// Human-readable phase label
    pub fn phase_label(&self) -> &'static str {
        self.phase.label()
    }
}

/// Trait for anything that can present the status snapshot
pub trait StatusDisplay {
    /// Render one snapshot
    fn render(&mut self, status: &StatusSnapshot<'_>) -> Result<(), DisplayError>;
}
