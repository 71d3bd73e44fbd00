//! Push-button input trait

/// Trait for the single front-panel switch
///
/// The switch is wired active-low: pressed pulls the line to ground.
pub trait SwitchInput {
    /// Sample the raw line level, `true` while the line is low
    fn is_low(&mut self) -> bool;
}
