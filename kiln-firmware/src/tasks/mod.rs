//! Embassy async tasks
//!
//! The controller is single-loop: one task owns every peripheral it drives.

pub mod control;

pub use control::{control_task, BoardOven};
