//! Continuous PID computation
//!
//! Gains are expressed per second and rescaled to the sample period, so a
//! preset stays meaningful if the period changes. The output is bounded to
//! `[out_min, out_max]`; for time-proportioning that range is
//! `[0, window_ms]` and the output is read directly as an on-time.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// PID coefficients
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PidGains {
    /// Proportional gain (Kp)
    pub kp: f32,
    /// Integral gain (Ki), per second
    pub ki: f32,
    /// Derivative gain (Kd), seconds
    pub kd: f32,
}

impl PidGains {
    /// Create a gain preset
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self { kp, ki, kd }
    }

    /// Check if any coefficient is non-zero
    pub fn is_configured(&self) -> bool {
        self.kp != 0.0 || self.ki != 0.0 || self.kd != 0.0
    }
}

/// PID controller internal state
#[derive(Debug, Clone, Copy, Default)]
struct PidState {
    /// Accumulated integral term, in output units
    integral: f32,
    /// Previous measurement for derivative-on-measurement
    last_input: Option<f32>,
    /// Time of the last computation
    last_compute_ms: Option<u32>,
    /// Last computed output
    output: f32,
}

/// Sampled PID controller
///
/// Proportional acts on error, derivative acts on the measurement so a
/// setpoint step does not kick the output, and the integral is clamped to
/// the output range to stop windup during the long heat-up.
#[derive(Debug, Clone)]
pub struct Pid {
    gains: PidGains,
    sample_period_ms: u32,
    out_min: f32,
    out_max: f32,
    state: PidState,
}

impl Pid {
    /// Create a new PID controller
    pub fn new(gains: PidGains, sample_period_ms: u32, out_min: f32, out_max: f32) -> Self {
        Self {
            gains,
            sample_period_ms: sample_period_ms.max(1),
            out_min,
            out_max,
            state: PidState::default(),
        }
    }

    /// Swap the gain preset
    ///
    /// The accumulated integral is kept so the output does not jump.
    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains;
    }

    /// Current gain preset
    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    /// Bound the output, re-clamping the integral and last output
    pub fn set_output_limits(&mut self, out_min: f32, out_max: f32) {
        if out_min >= out_max {
            return;
        }
        self.out_min = out_min;
        self.out_max = out_max;
        self.state.integral = self.state.integral.clamp(out_min, out_max);
        self.state.output = self.state.output.clamp(out_min, out_max);
    }

    /// Output bounds
    pub fn output_limits(&self) -> (f32, f32) {
        (self.out_min, self.out_max)
    }

    /// Clear the integral, derivative history and sample timer
    ///
    /// The next [`compute`](Self::compute) runs immediately.
    pub fn reset(&mut self) {
        self.state = PidState {
            output: self.out_min,
            ..PidState::default()
        };
    }

    /// Accumulated integral term
    pub fn integral(&self) -> f32 {
        self.state.integral
    }

    /// Last computed output
    pub fn output(&self) -> f32 {
        self.state.output
    }

    /// Run one computation if a sample period has elapsed
    ///
    /// Returns `true` if a new output was computed. Between samples the
    /// previous output is held.
    pub fn compute(&mut self, setpoint: f32, input: f32, now_ms: u32) -> bool {
        if let Some(last) = self.state.last_compute_ms {
            if now_ms.wrapping_sub(last) < self.sample_period_ms {
                return false;
            }
        }

        let dt_s = self.sample_period_ms as f32 / 1000.0;
        let ki = self.gains.ki * dt_s;
        let kd = self.gains.kd / dt_s;

        let error = setpoint - input;
        let d_input = match self.state.last_input {
            Some(last) => input - last,
            None => 0.0,
        };

        self.state.integral = (self.state.integral + ki * error).clamp(self.out_min, self.out_max);

        let output = self.gains.kp * error + self.state.integral - kd * d_input;
        self.state.output = output.clamp(self.out_min, self.out_max);
        self.state.last_input = Some(input);
        self.state.last_compute_ms = Some(now_ms);

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p_only(kp: f32) -> Pid {
        Pid::new(PidGains::new(kp, 0.0, 0.0), 1000, 0.0, 2000.0)
    }

    #[test]
    fn test_heating_needed() {
        let mut pid = p_only(10.0);
        assert!(pid.compute(70.0, 25.0, 0));
        assert_eq!(pid.output(), 450.0);
    }

    #[test]
    fn test_output_clamped() {
        let mut pid = p_only(100.0);
        pid.compute(70.0, 25.0, 0);
        assert_eq!(pid.output(), 2000.0);

        pid.compute(70.0, 90.0, 1000);
        assert_eq!(pid.output(), 0.0);
    }

    #[test]
    fn test_sample_period_rate_limits() {
        let mut pid = p_only(10.0);
        assert!(pid.compute(70.0, 25.0, 0));
        assert!(!pid.compute(70.0, 60.0, 999));
        assert_eq!(pid.output(), 450.0);
        assert!(pid.compute(70.0, 60.0, 1000));
        assert_eq!(pid.output(), 100.0);
    }

    #[test]
    fn test_integral_accumulates_and_clamps() {
        let mut pid = Pid::new(PidGains::new(0.0, 100.0, 0.0), 1000, 0.0, 2000.0);
        pid.compute(70.0, 60.0, 0);
        assert_eq!(pid.integral(), 1000.0);
        pid.compute(70.0, 60.0, 1000);
        assert_eq!(pid.integral(), 2000.0);
        pid.compute(70.0, 60.0, 2000);
        assert_eq!(pid.integral(), 2000.0);
    }

    #[test]
    fn test_gain_swap_keeps_integral() {
        let mut pid = Pid::new(PidGains::new(50.0, 1.0, 50.0), 1000, 0.0, 2000.0);
        pid.compute(70.0, 60.0, 0);
        let integral = pid.integral();
        assert!(integral > 0.0);

        pid.set_gains(PidGains::new(300.0, 0.05, 250.0));
        assert_eq!(pid.integral(), integral);
    }

    #[test]
    fn test_reset_clears_integral_and_timer() {
        let mut pid = Pid::new(PidGains::new(0.0, 1.0, 0.0), 1000, 0.0, 2000.0);
        pid.compute(70.0, 60.0, 0);
        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.output(), 0.0);
        // Runs immediately after a reset
        assert!(pid.compute(70.0, 60.0, 10));
    }

    #[test]
    fn test_derivative_on_measurement() {
        let mut pid = Pid::new(PidGains::new(0.0, 0.0, 100.0), 1000, -2000.0, 2000.0);
        pid.compute(70.0, 50.0, 0);
        assert_eq!(pid.output(), 0.0);

        // Rising temperature brakes the output
        pid.compute(70.0, 52.0, 1000);
        assert_eq!(pid.output(), -200.0);

        // Setpoint change alone does not kick
        pid.compute(90.0, 52.0, 2000);
        assert_eq!(pid.output(), 0.0);
    }

    #[test]
    fn test_output_limits_reclamp() {
        let mut pid = p_only(100.0);
        pid.compute(70.0, 25.0, 0);
        pid.set_output_limits(0.0, 1000.0);
        assert_eq!(pid.output(), 1000.0);
        assert_eq!(pid.output_limits(), (0.0, 1000.0));

        // Inverted limits are ignored
        pid.set_output_limits(10.0, 5.0);
        assert_eq!(pid.output_limits(), (0.0, 1000.0));
    }
}
