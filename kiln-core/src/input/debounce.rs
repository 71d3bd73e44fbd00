//! Push-button debouncer
//!
//! Turns the raw active-low switch level, sampled once per tick, into at
//! most one press event per physical press/release cycle.
//!
//! State transitions:
//! Idle (await low) -> Check (low held for the debounce time, else back to
//! Idle) -> Release (await high) -> emit ShortPress or LongPress -> Idle

/// Minimum time the line must stay low to count as a press
pub const DEFAULT_DEBOUNCE_MS: u32 = 50;

/// Hold time at which a press becomes a long press
pub const DEFAULT_LONG_PRESS_MS: u32 = 1000;

/// Debounced button events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    #[default]
    None,
    /// Pressed and released before the long-press time
    ShortPress,
    /// Held at least the long-press time before release
    LongPress,
}

/// Debouncer state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Check { since_ms: u32 },
    Release { since_ms: u32 },
}

/// Active-low button debouncer
#[derive(Debug, Clone)]
pub struct Debouncer {
    debounce_ms: u32,
    long_press_ms: u32,
    state: State,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS, DEFAULT_LONG_PRESS_MS)
    }
}

impl Debouncer {
    /// Create a new debouncer
    pub fn new(debounce_ms: u32, long_press_ms: u32) -> Self {
        Self {
            debounce_ms,
            long_press_ms,
            state: State::Idle,
        }
    }

    /// Feed one sample of the raw line level
    ///
    /// `is_low` is the raw level (pressed = low). Returns the event completed
    /// by this sample, if any.
    pub fn update(&mut self, is_low: bool, now_ms: u32) -> ButtonEvent {
        match self.state {
            State::Idle => {
                if is_low {
                    self.state = State::Check { since_ms: now_ms };
                }
                ButtonEvent::None
            }
            State::Check { since_ms } => {
                if !is_low {
                    // Bounce
                    self.state = State::Idle;
                } else if now_ms.wrapping_sub(since_ms) >= self.debounce_ms {
                    self.state = State::Release { since_ms };
                }
                ButtonEvent::None
            }
            State::Release { since_ms } => {
                if is_low {
                    return ButtonEvent::None;
                }

                self.state = State::Idle;
                if now_ms.wrapping_sub(since_ms) >= self.long_press_ms {
                    ButtonEvent::LongPress
                } else {
                    ButtonEvent::ShortPress
                }
            }
        }
    }

    /// Check whether a debounced press is currently held
    pub fn is_pressed(&self) -> bool {
        matches!(self.state, State::Release { .. })
    }
}
