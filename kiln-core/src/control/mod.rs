//! Time-proportioning heater control
//!
//! A continuous PID produces an on-time in `[0, window_ms]`, and a sliding
//! relay window turns that on-time into discrete relay on/off slices.

pub mod pid;
pub mod window;

pub use pid::{Pid, PidGains};
pub use window::{RelayWindow, DEFAULT_WINDOW_MS};

/// Default PID sample period (ms)
pub const DEFAULT_PID_SAMPLE_MS: u32 = 1000;

/// PID + relay window for an on/off heater
#[derive(Debug, Clone)]
pub struct TimeProportioningController {
    pid: Pid,
    window: RelayWindow,
    relay_on: bool,
}

impl TimeProportioningController {
    /// Create a new controller
    pub fn new(window_ms: u32, sample_period_ms: u32, gains: PidGains) -> Self {
        let window = RelayWindow::new(window_ms, 0);
        Self {
            pid: Pid::new(gains, sample_period_ms, 0.0, window.window_size_ms() as f32),
            window,
            relay_on: false,
        }
    }

    /// Prepare a new run
    ///
    /// Restarts the window at `now_ms`, clears the integrator, bounds the
    /// output to the window and loads `gains`.
    pub fn arm(&mut self, now_ms: u32, gains: PidGains) {
        self.window.restart(now_ms);
        self.pid.set_output_limits(0.0, self.window.window_size_ms() as f32);
        self.pid.reset();
        self.pid.set_gains(gains);
        self.relay_on = false;
    }

    /// Swap the gain preset without clearing the integrator
    pub fn set_gains(&mut self, gains: PidGains) {
        self.pid.set_gains(gains);
    }

    /// Run one control step and return the relay command
    ///
    /// With heating disabled the PID is bypassed and the relay is forced off,
    /// whatever the last duty was. Without a temperature or setpoint the last
    /// duty is held.
    pub fn update(
        &mut self,
        now_ms: u32,
        heating_enabled: bool,
        setpoint_c: Option<f32>,
        temperature_c: Option<f32>,
    ) -> bool {
        if !heating_enabled {
            self.relay_on = false;
            return false;
        }

        if let (Some(setpoint), Some(temperature)) = (setpoint_c, temperature_c) {
            self.pid.compute(setpoint, temperature, now_ms);
        }

        self.relay_on = self.window.relay_on(self.pid.output(), now_ms);
        self.relay_on
    }

    /// Last relay command
    pub fn relay_on(&self) -> bool {
        self.relay_on
    }

    /// Current on-time per window (ms)
    pub fn duty_ms(&self) -> f32 {
        self.pid.output()
    }

    /// The relay window
    pub fn window(&self) -> &RelayWindow {
        &self.window
    }

    /// The PID stage
    pub fn pid(&self) -> &Pid {
        &self.pid
    }
}
