//! State machine definition
//!
//! Heating, the setpoint and the done indicator are all a function of the
//! current phase. A latched sensor fault overrides every other transition.

use super::events::UserEvent;
use crate::profile::{ProfileRegistry, ThermalProfile};
use crate::traits::SoakProgress;

/// Oven phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReflowPhase {
    /// Ready, waiting for the user to start
    #[default]
    Idle,
    /// Heating toward the profile's hold temperature
    Preheat,
    /// Holding temperature for the profile's duration
    Soak,
    /// Heater off, waiting for the chamber to cool
    Cool,
    /// Run finished, done indicator lit
    Complete,
    /// Chamber too warm to start safely
    TooHot,
    /// Sensor fault; heater forced off
    Error,
}

impl ReflowPhase {
    /// Status label for the display
    pub fn label(&self) -> &'static str {
        match self {
            ReflowPhase::Idle => "Ready",
            ReflowPhase::Preheat => "Heating",
            ReflowPhase::Soak => "Holding temp",
            ReflowPhase::Cool => "Cool",
            ReflowPhase::Complete => "Complete",
            ReflowPhase::TooHot => "Wait,hot",
            ReflowPhase::Error => "Error",
        }
    }

    /// Check if this phase drives the heater
    pub fn heating_enabled(&self) -> bool {
        matches!(self, ReflowPhase::Preheat | ReflowPhase::Soak)
    }

    /// Check if a run is in progress (cancellable)
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            ReflowPhase::Preheat | ReflowPhase::Soak | ReflowPhase::Cool
        )
    }

    /// Check if this is the fault state
    pub fn is_error(&self) -> bool {
        matches!(self, ReflowPhase::Error)
    }
}

/// A phase change produced by one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub from: ReflowPhase,
    pub to: ReflowPhase,
}

/// Inputs for one step of the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReflowInputs {
    /// Current time (ms, free running)
    pub now_ms: u32,
    /// Filtered temperature, `None` until the first valid sample
    pub temperature_c: Option<f32>,
    /// Sensor fault latched
    pub fault: bool,
    /// User intent for this tick
    pub event: UserEvent,
}

/// Temperature thresholds and timers that shape the run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseLimits {
    /// At or above this an idle oven refuses to start (°C)
    pub room_temperature_c: f32,
    /// At or below this a cooling oven counts as done (°C)
    pub cool_min_c: f32,
    /// How long the Complete phase lasts (ms)
    pub complete_hold_ms: u32,
}

impl Default for PhaseLimits {
    fn default() -> Self {
        Self {
            room_temperature_c: 45.0,
            cool_min_c: 50.0,
            complete_hold_ms: 5000,
        }
    }
}

/// Reflow phase state machine
///
/// Owns the phase, the profile selection and the run timers. Controller
/// side effects (window start, integrator reset, gain swap) are driven by
/// the caller from the returned [`Transition`].
#[derive(Debug, Clone)]
pub struct ReflowStateMachine {
    phase: ReflowPhase,
    profiles: ProfileRegistry,
    limits: PhaseLimits,
    setpoint_c: Option<f32>,
    soak_started_ms: Option<u32>,
    complete_started_ms: Option<u32>,
    done_indicator: bool,
}

impl ReflowStateMachine {
    /// Create a state machine in [`ReflowPhase::Idle`]
    pub fn new(profiles: ProfileRegistry, limits: PhaseLimits) -> Self {
        Self {
            phase: ReflowPhase::Idle,
            profiles,
            limits,
            setpoint_c: None,
            soak_started_ms: None,
            complete_started_ms: None,
            done_indicator: false,
        }
    }

    /// Active phase
    pub fn phase(&self) -> ReflowPhase {
        self.phase
    }

    /// Check if the heater may run
    pub fn heating_enabled(&self) -> bool {
        self.phase.heating_enabled()
    }

    /// Target temperature, only meaningful while heating
    pub fn setpoint_c(&self) -> Option<f32> {
        if self.heating_enabled() {
            self.setpoint_c
        } else {
            None
        }
    }

    /// Done indicator state
    pub fn done_indicator(&self) -> bool {
        self.done_indicator
    }

    /// The profile table
    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    /// The selected profile
    pub fn current_profile(&self) -> Option<&ThermalProfile> {
        self.profiles.current()
    }

    /// End of the hold phase, while soaking
    pub fn soak_deadline_ms(&self) -> Option<u32> {
        let start = self.soak_started_ms?;
        let profile = self.profiles.current()?;
        Some(start.wrapping_add(profile.soak_duration_ms()))
    }

    /// End of the Complete phase, while complete
    pub fn completion_deadline_ms(&self) -> Option<u32> {
        self.complete_started_ms
            .map(|start| start.wrapping_add(self.limits.complete_hold_ms))
    }

    /// Soak timer for the display, only during [`ReflowPhase::Soak`]
    pub fn soak_progress(&self, now_ms: u32) -> Option<SoakProgress> {
        if self.phase != ReflowPhase::Soak {
            return None;
        }
        let start = self.soak_started_ms?;
        let profile = self.profiles.current()?;
        Some(SoakProgress {
            elapsed_s: now_ms.wrapping_sub(start) / 1000,
            total_s: profile.soak_duration_ms() / 1000,
        })
    }

    /// Advance one tick
    ///
    /// Returns the transition if the phase changed.
    pub fn step(&mut self, inputs: &ReflowInputs) -> Option<Transition> {
        let from = self.phase;
        let to = if inputs.fault {
            self.enter_error()
        } else {
            self.next_phase(inputs)
        };
        self.phase = to;

        if from == to {
            None
        } else {
            Some(Transition { from, to })
        }
    }

    fn next_phase(&mut self, inputs: &ReflowInputs) -> ReflowPhase {
        use ReflowPhase::*;

        let now = inputs.now_ms;
        let temperature = inputs.temperature_c;

        match self.phase {
            Idle => match (temperature, inputs.event) {
                (Some(t), _) if t >= self.limits.room_temperature_c => TooHot,
                (Some(_), UserEvent::StartOrCancel) => self.start_run(),
                (_, UserEvent::NextProfile) => {
                    self.profiles.select_next();
                    Idle
                }
                // Never start blind before the first valid sample
                _ => Idle,
            },

            Preheat | Soak | Cool if !inputs.event.is_none() => self.cancel_run(),

            Preheat => match (temperature, self.hold_temperature_c()) {
                (Some(t), Some(hold)) if t >= hold => {
                    self.soak_started_ms = Some(now);
                    Soak
                }
                _ => Preheat,
            },

            Soak => match (self.soak_started_ms, self.hold_duration_ms()) {
                (Some(start), Some(duration)) if now.wrapping_sub(start) > duration => {
                    self.soak_started_ms = None;
                    self.setpoint_c = None;
                    Cool
                }
                _ => Soak,
            },

            Cool => match temperature {
                Some(t) if t <= self.limits.cool_min_c => {
                    self.done_indicator = true;
                    self.complete_started_ms = Some(now);
                    Complete
                }
                _ => Cool,
            },

            Complete => match self.complete_started_ms {
                Some(start) if now.wrapping_sub(start) > self.limits.complete_hold_ms => {
                    self.complete_started_ms = None;
                    self.profiles.reset();
                    Idle
                }
                Some(_) => Complete,
                None => Idle,
            },

            TooHot => {
                if inputs.event == UserEvent::NextProfile {
                    self.profiles.select_next();
                }
                match temperature {
                    Some(t) if t < self.limits.room_temperature_c => Idle,
                    _ => TooHot,
                }
            }

            // Fault already cleared by a valid sample
            Error => Idle,
        }
    }

    fn start_run(&mut self) -> ReflowPhase {
        match self.hold_temperature_c() {
            Some(hold) => {
                self.done_indicator = false;
                self.setpoint_c = Some(hold);
                self.soak_started_ms = None;
                self.complete_started_ms = None;
                ReflowPhase::Preheat
            }
            None => ReflowPhase::Idle,
        }
    }

    fn cancel_run(&mut self) -> ReflowPhase {
        self.clear_run();
        self.profiles.reset();
        ReflowPhase::Idle
    }

    fn enter_error(&mut self) -> ReflowPhase {
        self.clear_run();
        ReflowPhase::Error
    }

    fn clear_run(&mut self) {
        self.setpoint_c = None;
        self.soak_started_ms = None;
        self.complete_started_ms = None;
    }

    fn hold_temperature_c(&self) -> Option<f32> {
        self.profiles
            .current()
            .map(|p| f32::from(p.soak_temperature_c()))
    }

    fn hold_duration_ms(&self) -> Option<u32> {
        self.profiles.current().map(|p| p.soak_duration_ms())
    }
}
