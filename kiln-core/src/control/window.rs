//! Time-proportioning relay window
//!
//! An on/off heater cannot follow a continuous duty value, so time is cut
//! into fixed windows and the relay is held on for the first `duty`
//! milliseconds of each one.

/// Default window length (ms)
pub const DEFAULT_WINDOW_MS: u32 = 2000;

/// Sliding relay window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelayWindow {
    window_start_ms: u32,
    window_size_ms: u32,
}

impl RelayWindow {
    /// Create a window starting at `now_ms`
    pub fn new(window_size_ms: u32, now_ms: u32) -> Self {
        Self {
            window_start_ms: now_ms,
            window_size_ms: window_size_ms.max(1),
        }
    }

    /// Restart the window at `now_ms`
    pub fn restart(&mut self, now_ms: u32) {
        self.window_start_ms = now_ms;
    }

    /// Start of the current window
    pub fn window_start_ms(&self) -> u32 {
        self.window_start_ms
    }

    /// Window length
    pub fn window_size_ms(&self) -> u32 {
        self.window_size_ms
    }

    /// Advance the window if needed and decide the relay state
    ///
    /// The start moves forward in whole window steps, never to `now_ms`, so
    /// slow or jittery ticks do not drift the window phase.
    pub fn relay_on(&mut self, duty_ms: f32, now_ms: u32) -> bool {
        while now_ms.wrapping_sub(self.window_start_ms) > self.window_size_ms {
            self.window_start_ms = self.window_start_ms.wrapping_add(self.window_size_ms);
        }

        let elapsed = now_ms.wrapping_sub(self.window_start_ms);
        (elapsed as f32) < duty_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_relay_on_for_duty_portion() {
        let mut window = RelayWindow::new(2000, 0);
        assert!(window.relay_on(500.0, 0));
        assert!(window.relay_on(500.0, 499));
        assert!(!window.relay_on(500.0, 500));
        assert!(!window.relay_on(500.0, 1999));
    }

    #[test]
    fn test_zero_duty_never_on() {
        let mut window = RelayWindow::new(2000, 0);
        assert!(!window.relay_on(0.0, 0));
        assert!(!window.relay_on(0.0, 1000));
    }

    #[test]
    fn test_full_duty_always_on() {
        let mut window = RelayWindow::new(2000, 0);
        for now in (50..10_000).step_by(100) {
            assert!(window.relay_on(2000.0, now));
        }
    }

    #[test]
    fn test_rollover_advances_by_window_size() {
        let mut window = RelayWindow::new(2000, 1_000);
        window.relay_on(500.0, 3_000);
        assert_eq!(window.window_start_ms(), 1_000);

        window.relay_on(500.0, 3_001);
        assert_eq!(window.window_start_ms(), 3_000);
    }

    #[test]
    fn test_rollover_catches_up_over_gaps() {
        let mut window = RelayWindow::new(2000, 0);
        assert!(window.relay_on(500.0, 6_100));
        assert_eq!(window.window_start_ms(), 6_000);
    }

    #[test]
    fn test_rollover_across_timer_wrap() {
        let start = u32::MAX - 999;
        let mut window = RelayWindow::new(2000, start);
        window.relay_on(500.0, start.wrapping_add(2_500));
        assert_eq!(window.window_start_ms(), start.wrapping_add(2_000));
    }

    proptest! {
        #[test]
        fn prop_window_start_stays_aligned(
            start in 0u32..1_000_000,
            steps in proptest::collection::vec(1u32..5_000, 1..50),
        ) {
            let mut window = RelayWindow::new(2000, start);
            let mut now = start;
            for step in steps {
                now += step;
                window.relay_on(1000.0, now);
                let offset = window.window_start_ms() - start;
                prop_assert_eq!(offset % 2000, 0);
                prop_assert!(now - window.window_start_ms() <= 2000);
            }
        }
    }
}
