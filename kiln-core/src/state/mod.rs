//! Reflow phase state machine
//!
//! Defines the authoritative runtime behavior of the oven.
//! The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::UserEvent;
pub use machine::{PhaseLimits, ReflowInputs, ReflowPhase, ReflowStateMachine, Transition};
