//! Active-low push button on a GPIO pin

use embedded_hal::digital::InputPin;
use kiln_core::traits::SwitchInput;

/// Push button wired to ground with a pull-up
///
/// A pin read error is reported as released so a flaky input can never
/// produce a press.
pub struct GpioSwitch<P> {
    pin: P,
}

impl<P: InputPin> GpioSwitch<P> {
    /// Create a new switch input
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin> SwitchInput for GpioSwitch<P> {
    fn is_low(&mut self) -> bool {
        self.pin.is_low().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{Error, ErrorKind, ErrorType};

    #[derive(Debug)]
    struct PinFault;

    impl Error for PinFault {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    struct MockPin {
        level: Option<bool>,
    }

    impl ErrorType for MockPin {
        type Error = PinFault;
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, PinFault> {
            self.level.ok_or(PinFault)
        }

        fn is_low(&mut self) -> Result<bool, PinFault> {
            self.level.map(|high| !high).ok_or(PinFault)
        }
    }

    #[test]
    fn test_pressed_reads_low() {
        let mut switch = GpioSwitch::new(MockPin { level: Some(false) });
        assert!(switch.is_low());
    }

    #[test]
    fn test_released_reads_high() {
        let mut switch = GpioSwitch::new(MockPin { level: Some(true) });
        assert!(!switch.is_low());
    }

    #[test]
    fn test_pin_error_is_released() {
        let mut switch = GpioSwitch::new(MockPin { level: None });
        assert!(!switch.is_low());
    }
}
