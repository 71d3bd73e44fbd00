//! User intent events consumed by the phase state machine

use crate::input::ButtonEvent;

/// Edge-triggered user intent, consumed by exactly one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UserEvent {
    #[default]
    None,
    /// Start a run when idle, cancel it when running
    StartOrCancel,
    /// Cycle the selected profile (cancels a running profile)
    NextProfile,
}

impl UserEvent {
    /// Check if no event is pending
    pub fn is_none(&self) -> bool {
        matches!(self, UserEvent::None)
    }
}

impl From<ButtonEvent> for UserEvent {
    fn from(event: ButtonEvent) -> Self {
        match event {
            ButtonEvent::None => UserEvent::None,
            ButtonEvent::ShortPress => UserEvent::StartOrCancel,
            ButtonEvent::LongPress => UserEvent::NextProfile,
        }
    }
}
