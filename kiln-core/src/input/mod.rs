//! User input handling

pub mod debounce;

pub use debounce::{ButtonEvent, Debouncer, DEFAULT_DEBOUNCE_MS, DEFAULT_LONG_PRESS_MS};
