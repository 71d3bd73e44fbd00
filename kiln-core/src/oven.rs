//! Per-tick control loop
//!
//! One tick runs in a fixed order: sample the sensor (if due), debounce the
//! switch, advance the phase state machine, run the heater controller,
//! drive the outputs and render the status. All mutable state lives in one
//! [`OvenCore`] value threaded through the tick, so nothing is shared and
//! nothing needs locking.

use crate::config::{ConfigError, OvenConfig};
use crate::control::TimeProportioningController;
use crate::input::Debouncer;
use crate::profile::ProfileRegistry;
use crate::safety::FaultFilter;
use crate::state::{ReflowInputs, ReflowPhase, ReflowStateMachine, Transition, UserEvent};
use crate::traits::{
    DisplayError, HeaterOutput, Indicator, OutputError, StatusDisplay, StatusSnapshot,
    SwitchInput, TemperatureSensor,
};

/// Errors surfaced by a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OvenError {
    /// Configuration rejected at construction
    Config(ConfigError),
    /// Heater or indicator write failed
    Output(OutputError),
    /// Status display failed
    Display(DisplayError),
}

impl From<ConfigError> for OvenError {
    fn from(e: ConfigError) -> Self {
        OvenError::Config(e)
    }
}

impl From<OutputError> for OvenError {
    fn from(e: OutputError) -> Self {
        OvenError::Output(e)
    }
}

impl From<DisplayError> for OvenError {
    fn from(e: DisplayError) -> Self {
        OvenError::Display(e)
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Tick time (ms)
    pub now_ms: u32,
    /// Phase after the tick
    pub phase: ReflowPhase,
    /// Phase change made by this tick
    pub transition: Option<Transition>,
    /// User intent consumed by this tick
    pub event: UserEvent,
    /// A sensor sample was taken this tick
    pub sampled: bool,
    /// Filtered temperature
    pub temperature_c: Option<f32>,
    /// Sensor fault latched
    pub sensor_fault: bool,
    /// Phase allows heating
    pub heating: bool,
    /// Relay command
    pub relay_on: bool,
    /// Current on-time per window (ms)
    pub duty_ms: f32,
    /// Setpoint while heating
    pub setpoint_c: Option<f32>,
    /// Done indicator command
    pub done_indicator: bool,
}

/// Hardware-free controller state
#[derive(Debug, Clone)]
pub struct OvenCore {
    config: OvenConfig,
    filter: FaultFilter,
    debouncer: Debouncer,
    machine: ReflowStateMachine,
    controller: TimeProportioningController,
    last_sample_ms: Option<u32>,
}

impl OvenCore {
    /// Build the controller state
    ///
    /// Fails if the configuration is invalid or no profile is registered.
    pub fn new(config: OvenConfig, profiles: ProfileRegistry) -> Result<Self, ConfigError> {
        config.validate()?;
        if profiles.is_empty() {
            return Err(ConfigError::NoProfiles);
        }

        Ok(Self {
            filter: FaultFilter::new(config.fault_threshold),
            debouncer: Debouncer::new(config.debounce_ms, config.long_press_ms),
            machine: ReflowStateMachine::new(profiles, config.phase_limits()),
            controller: TimeProportioningController::new(
                config.window_ms,
                config.pid_sample_ms,
                config.preheat_gains,
            ),
            last_sample_ms: None,
            config,
        })
    }

    /// Check whether the sensor should be read this tick
    ///
    /// The first tick after boot always samples.
    pub fn sample_due(&self, now_ms: u32) -> bool {
        match self.last_sample_ms {
            Some(last) => now_ms.wrapping_sub(last) >= self.config.sensor_period_ms,
            None => true,
        }
    }

    /// Run one tick on already-acquired inputs
    ///
    /// `raw_sample` is `Some` only when the sensor was read this tick.
    pub fn step(&mut self, now_ms: u32, raw_sample: Option<f32>, switch_low: bool) -> TickReport {
        if let Some(raw) = raw_sample {
            self.filter.sample(raw);
            self.last_sample_ms = Some(now_ms);
        }
        let reading = self.filter.reading();

        let event = UserEvent::from(self.debouncer.update(switch_low, now_ms));

        let transition = self.machine.step(&ReflowInputs {
            now_ms,
            temperature_c: reading.temperature_c,
            fault: reading.fault,
            event,
        });
        if let Some(transition) = transition {
            self.apply_transition(transition, now_ms);
        }

        let relay_on = self.controller.update(
            now_ms,
            self.machine.heating_enabled(),
            self.machine.setpoint_c(),
            reading.temperature_c,
        );

        TickReport {
            now_ms,
            phase: self.machine.phase(),
            transition,
            event,
            sampled: raw_sample.is_some(),
            temperature_c: reading.temperature_c,
            sensor_fault: reading.fault,
            heating: self.machine.heating_enabled(),
            relay_on,
            duty_ms: self.controller.duty_ms(),
            setpoint_c: self.machine.setpoint_c(),
            done_indicator: self.machine.done_indicator(),
        }
    }

    fn apply_transition(&mut self, transition: Transition, now_ms: u32) {
        match (transition.from, transition.to) {
            (ReflowPhase::Idle, ReflowPhase::Preheat) => {
                self.controller.arm(now_ms, self.config.preheat_gains);
            }
            (ReflowPhase::Preheat, ReflowPhase::Soak) => {
                self.controller.set_gains(self.config.soak_gains);
            }
            _ => {}
        }
    }

    /// Read-only view for the display
    pub fn snapshot(&self, now_ms: u32) -> StatusSnapshot<'_> {
        StatusSnapshot {
            temperature_c: self.filter.last_valid(),
            sensor_fault: self.filter.is_faulted(),
            profile_name: self
                .machine
                .current_profile()
                .map(|p| p.name())
                .unwrap_or(""),
            phase: self.machine.phase(),
            soak: self.machine.soak_progress(now_ms),
        }
    }

    /// Active phase
    pub fn phase(&self) -> ReflowPhase {
        self.machine.phase()
    }

    /// The phase state machine
    pub fn machine(&self) -> &ReflowStateMachine {
        &self.machine
    }

    /// The heater controller
    pub fn controller(&self) -> &TimeProportioningController {
        &self.controller
    }

    /// The sensor fault filter
    pub fn fault_filter(&self) -> &FaultFilter {
        &self.filter
    }

    /// Active configuration
    pub fn config(&self) -> &OvenConfig {
        &self.config
    }
}

/// The collaborators an [`Oven`] drives
pub struct Board<S, H, L, B, D> {
    /// Chamber temperature sensor
    pub sensor: S,
    /// Heater relay
    pub heater: H,
    /// "Run complete" indicator
    pub indicator: L,
    /// Start/cancel/select button
    pub switch: B,
    /// Status display
    pub display: D,
}

/// Controller core wired to its hardware
pub struct Oven<S, H, L, B, D> {
    core: OvenCore,
    board: Board<S, H, L, B, D>,
    indicator_on: bool,
}

impl<S, H, L, B, D> Oven<S, H, L, B, D>
where
    S: TemperatureSensor,
    H: HeaterOutput,
    L: Indicator,
    B: SwitchInput,
    D: StatusDisplay,
{
    /// Create an oven, forcing both outputs off
    pub fn new(
        config: OvenConfig,
        profiles: ProfileRegistry,
        mut board: Board<S, H, L, B, D>,
    ) -> Result<Self, OvenError> {
        let core = OvenCore::new(config, profiles)?;
        board.heater.set_on(false)?;
        board.indicator.set_on(false)?;

        Ok(Self {
            core,
            board,
            indicator_on: false,
        })
    }

    /// Run one tick at `now_ms`
    ///
    /// Outputs are written only when their command changes. The display is
    /// rendered last, after the relay has been driven.
    pub fn tick(&mut self, now_ms: u32) -> Result<TickReport, OvenError> {
        let raw_sample = if self.core.sample_due(now_ms) {
            Some(self.board.sensor.read_celsius())
        } else {
            None
        };
        let switch_low = self.board.switch.is_low();

        let report = self.core.step(now_ms, raw_sample, switch_low);

        if self.board.heater.is_on() != report.relay_on {
            self.board.heater.set_on(report.relay_on)?;
        }
        if self.indicator_on != report.done_indicator {
            self.board.indicator.set_on(report.done_indicator)?;
            self.indicator_on = report.done_indicator;
        }

        self.board.display.render(&self.core.snapshot(now_ms))?;

        Ok(report)
    }

    /// The controller core
    pub fn core(&self) -> &OvenCore {
        &self.core
    }

    /// The attached hardware
    pub fn board(&self) -> &Board<S, H, L, B, D> {
        &self.board
    }

    /// Mutable access to the attached hardware
    pub fn board_mut(&mut self) -> &mut Board<S, H, L, B, D> {
        &mut self.board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ThermalProfile;
    use crate::traits::SoakProgress;
    use heapless::String;

    struct MockSensor {
        temp_c: f32,
        reads: u32,
    }

    impl TemperatureSensor for MockSensor {
        fn read_celsius(&mut self) -> f32 {
            self.reads += 1;
            self.temp_c
        }
    }

    struct MockHeater {
        on: bool,
        writes: u32,
        fail: bool,
    }

    impl HeaterOutput for MockHeater {
        fn set_on(&mut self, on: bool) -> Result<(), OutputError> {
            if self.fail {
                return Err(OutputError::Pin);
            }
            self.on = on;
            self.writes += 1;
            Ok(())
        }

        fn is_on(&self) -> bool {
            self.on
        }
    }

    struct MockLed {
        on: bool,
    }

    impl Indicator for MockLed {
        fn set_on(&mut self, on: bool) -> Result<(), OutputError> {
            self.on = on;
            Ok(())
        }
    }

    struct MockSwitch {
        low: bool,
    }

    impl SwitchInput for MockSwitch {
        fn is_low(&mut self) -> bool {
            self.low
        }
    }

    #[derive(Default)]
    struct MockDisplay {
        frames: u32,
        phase: ReflowPhase,
        label: &'static str,
        profile: String<16>,
        fault: bool,
        temperature_c: Option<f32>,
        soak: Option<SoakProgress>,
    }

    impl StatusDisplay for MockDisplay {
        fn render(&mut self, status: &StatusSnapshot<'_>) -> Result<(), DisplayError> {
            self.frames += 1;
            self.phase = status.phase;
            self.label = status.phase_label();
            self.profile.clear();
            self.profile
                .push_str(status.profile_name)
                .map_err(|_| DisplayError::BufferOverflow)?;
            self.fault = status.sensor_fault;
            self.temperature_c = status.temperature_c;
            self.soak = status.soak;
            Ok(())
        }
    }

    type TestOven = Oven<MockSensor, MockHeater, MockLed, MockSwitch, MockDisplay>;

    const HOLD_MS: u32 = 1_800_000;

    fn board(temp_c: f32) -> Board<MockSensor, MockHeater, MockLed, MockSwitch, MockDisplay> {
        Board {
            sensor: MockSensor { temp_c, reads: 0 },
            heater: MockHeater {
                on: true,
                writes: 0,
                fail: false,
            },
            indicator: MockLed { on: true },
            switch: MockSwitch { low: false },
            display: MockDisplay::default(),
        }
    }

    fn profiles() -> ProfileRegistry {
        let mut registry = ProfileRegistry::new();
        registry
            .push(ThermalProfile::new("Sanitize Masks", 70, HOLD_MS).unwrap())
            .unwrap();
        registry
            .push(ThermalProfile::new("Dry PLA", 45, 14_400_000).unwrap())
            .unwrap();
        registry
    }

    fn oven(temp_c: f32) -> TestOven {
        Oven::new(OvenConfig::default(), profiles(), board(temp_c)).unwrap()
    }

    /// Tick every `step_ms` over `[from, to)`, checking the heating
    /// invariant on every tick. Returns the last report.
    fn run(oven: &mut TestOven, from: u32, to: u32, step_ms: u32) -> TickReport {
        let mut now = from;
        let mut last = None;
        while now < to {
            let report = oven.tick(now).unwrap();
            assert_eq!(
                report.heating,
                matches!(report.phase, ReflowPhase::Preheat | ReflowPhase::Soak)
            );
            if !report.heating {
                assert!(!report.relay_on);
                assert!(!oven.board().heater.on);
            }
            last = Some(report);
            now += step_ms;
        }
        last.unwrap()
    }

    /// Press for `hold_ms` starting at `at`, returning the release tick report
    fn press(oven: &mut TestOven, at: u32, hold_ms: u32) -> TickReport {
        oven.board_mut().switch.low = true;
        run(oven, at, at + hold_ms, 10);
        oven.board_mut().switch.low = false;
        oven.tick(at + hold_ms).unwrap()
    }

    #[test]
    fn test_new_forces_outputs_off() {
        let oven = oven(25.0);
        assert!(!oven.board().heater.on);
        assert!(!oven.board().indicator.on);
    }

    #[test]
    fn test_rejects_empty_registry() {
        let result = Oven::new(OvenConfig::default(), ProfileRegistry::new(), board(25.0));
        assert!(matches!(
            result,
            Err(OvenError::Config(ConfigError::NoProfiles))
        ));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = OvenConfig {
            window_ms: 0,
            ..Default::default()
        };
        let result = Oven::new(config, profiles(), board(25.0));
        assert!(matches!(
            result,
            Err(OvenError::Config(ConfigError::ZeroWindow))
        ));
    }

    #[test]
    fn test_sensor_rate_limited() {
        let mut oven = oven(25.0);
        let report = oven.tick(0).unwrap();
        assert!(report.sampled);
        assert_eq!(report.temperature_c, Some(25.0));

        run(&mut oven, 10, 1000, 10);
        assert_eq!(oven.board().sensor.reads, 1);

        assert!(oven.tick(1000).unwrap().sampled);
        assert_eq!(oven.board().sensor.reads, 2);
    }

    #[test]
    fn test_scenario_a_start() {
        let mut oven = oven(25.0);
        run(&mut oven, 0, 100, 10);

        let report = press(&mut oven, 100, 100);
        assert_eq!(report.event, UserEvent::StartOrCancel);
        assert_eq!(report.phase, ReflowPhase::Preheat);
        assert_eq!(report.setpoint_c, Some(70.0));
        assert!(report.heating);
        assert!(report.relay_on);
        assert!(oven.board().heater.on);
        assert_eq!(
            oven.core().controller().window().window_start_ms(),
            200
        );
    }

    #[test]
    fn test_scenario_b_soak_then_cool() {
        let mut oven = oven(25.0);
        press(&mut oven, 0, 100);
        assert_eq!(oven.core().phase(), ReflowPhase::Preheat);

        oven.board_mut().sensor.temp_c = 70.0;
        let report = oven.tick(1_000).unwrap();
        assert_eq!(report.phase, ReflowPhase::Soak);
        assert_eq!(oven.core().machine().soak_deadline_ms(), Some(1_000 + HOLD_MS));
        assert_eq!(*oven.core().controller().pid().gains(), OvenConfig::default().soak_gains);

        let report = run(&mut oven, 2_000, 1_000 + HOLD_MS + 1, 1_000);
        assert_eq!(report.phase, ReflowPhase::Soak);
        assert_eq!(oven.board().display.label, "Holding temp");

        let report = oven.tick(1_000 + HOLD_MS + 1).unwrap();
        assert_eq!(report.phase, ReflowPhase::Cool);
        assert!(!report.heating);
        assert!(!oven.board().heater.on);
    }

    #[test]
    fn test_scenario_c_complete_then_idle() {
        let mut oven = oven(25.0);
        oven.board_mut().sensor.temp_c = 25.0;
        press(&mut oven, 0, 100);
        oven.board_mut().sensor.temp_c = 70.0;
        oven.tick(1_000).unwrap();
        let end = 1_000 + HOLD_MS + 1;
        oven.tick(end).unwrap();
        assert_eq!(oven.core().phase(), ReflowPhase::Cool);

        oven.board_mut().sensor.temp_c = 50.0;
        let report = oven.tick(end + 1_000).unwrap();
        assert_eq!(report.phase, ReflowPhase::Complete);
        assert!(report.done_indicator);
        assert!(oven.board().indicator.on);
        let done_at = end + 1_000;
        assert_eq!(
            oven.core().machine().completion_deadline_ms(),
            Some(done_at + 5_000)
        );

        assert_eq!(oven.tick(done_at + 5_000).unwrap().phase, ReflowPhase::Complete);
        oven.board_mut().sensor.temp_c = 30.0;
        let report = oven.tick(done_at + 5_001).unwrap();
        assert_eq!(report.phase, ReflowPhase::Idle);
        assert_eq!(oven.core().machine().profiles().selected_index(), 0);
    }

    #[test]
    fn test_scenario_d_three_zero_readings_fault() {
        for start_phase in [ReflowPhase::Idle, ReflowPhase::Preheat, ReflowPhase::Soak] {
            let mut oven = oven(25.0);
            if start_phase != ReflowPhase::Idle {
                press(&mut oven, 0, 100);
            }
            if start_phase == ReflowPhase::Soak {
                oven.board_mut().sensor.temp_c = 70.0;
                oven.tick(1_000).unwrap();
            }
            assert_eq!(oven.core().phase(), start_phase);

            oven.board_mut().sensor.temp_c = 0.0;
            assert_ne!(oven.tick(2_000).unwrap().phase, ReflowPhase::Error);
            assert_ne!(oven.tick(3_000).unwrap().phase, ReflowPhase::Error);
            let report = oven.tick(4_000).unwrap();
            assert_eq!(report.phase, ReflowPhase::Error);
            assert!(report.sensor_fault);
            assert!(!report.heating);
            assert!(!oven.board().heater.on);
            assert!(oven.board().display.fault);
            assert_eq!(oven.board().display.label, "Error");
        }
    }

    #[test]
    fn test_isolated_bad_samples_do_not_interrupt() {
        let mut oven = oven(25.0);
        press(&mut oven, 0, 100);
        oven.board_mut().sensor.temp_c = 0.0;
        oven.tick(1_000).unwrap();
        oven.board_mut().sensor.temp_c = -1.0;
        oven.tick(2_000).unwrap();
        oven.board_mut().sensor.temp_c = 40.0;
        let report = oven.tick(3_000).unwrap();

        assert_eq!(report.phase, ReflowPhase::Preheat);
        assert_eq!(report.temperature_c, Some(40.0));
    }

    #[test]
    fn test_error_recovers_to_idle() {
        let mut oven = oven(0.0);
        oven.tick(0).unwrap();
        oven.tick(1_000).unwrap();
        assert_eq!(oven.tick(2_000).unwrap().phase, ReflowPhase::Error);

        oven.board_mut().sensor.temp_c = 22.0;
        let report = oven.tick(3_000).unwrap();
        assert_eq!(
            report.transition,
            Some(Transition {
                from: ReflowPhase::Error,
                to: ReflowPhase::Idle
            })
        );
    }

    #[test]
    fn test_cancel_from_running_phases() {
        for phase in [ReflowPhase::Preheat, ReflowPhase::Soak, ReflowPhase::Cool] {
            let mut oven = oven(25.0);
            press(&mut oven, 0, 100);
            if phase != ReflowPhase::Preheat {
                oven.board_mut().sensor.temp_c = 70.0;
                oven.tick(1_000).unwrap();
            }
            let mut at = 3_000;
            if phase == ReflowPhase::Cool {
                oven.tick(2_000 + HOLD_MS).unwrap();
                at += HOLD_MS;
            }
            assert_eq!(oven.core().phase(), phase);

            let report = press(&mut oven, at, 100);
            assert_eq!(report.phase, ReflowPhase::Idle);
            assert!(!report.heating);
            assert!(!oven.board().heater.on);
        }
    }

    #[test]
    fn test_long_press_selects_next_profile() {
        let mut oven = oven(25.0);
        let report = press(&mut oven, 0, 1_200);
        assert_eq!(report.event, UserEvent::NextProfile);
        assert_eq!(report.phase, ReflowPhase::Idle);
        assert_eq!(oven.board().display.profile.as_str(), "Dry PLA");

        let report = press(&mut oven, 2_000, 100);
        assert_eq!(report.setpoint_c, Some(45.0));
    }

    #[test]
    fn test_too_hot_blocks_start() {
        let mut oven = oven(60.0);
        let report = press(&mut oven, 0, 100);
        assert_eq!(report.phase, ReflowPhase::TooHot);
        assert!(!oven.board().heater.on);
        assert_eq!(oven.board().display.label, "Wait,hot");
    }

    #[test]
    fn test_display_sees_soak_timer() {
        let mut oven = oven(25.0);
        press(&mut oven, 0, 100);
        oven.board_mut().sensor.temp_c = 70.0;
        oven.tick(1_000).unwrap();
        oven.tick(62_000).unwrap();

        assert_eq!(
            oven.board().display.soak,
            Some(SoakProgress {
                elapsed_s: 61,
                total_s: 1800
            })
        );
        assert_eq!(oven.board().display.temperature_c, Some(70.0));
    }

    #[test]
    fn test_heater_written_only_on_change() {
        let mut oven = oven(25.0);
        let writes = oven.board().heater.writes;
        run(&mut oven, 0, 1_000, 10);
        assert_eq!(oven.board().heater.writes, writes);
    }

    #[test]
    fn test_soak_timer_across_rollover() {
        let mut oven = oven(25.0);
        let base = u32::MAX - 999;

        oven.board_mut().switch.low = true;
        for i in 0..10 {
            oven.tick(base.wrapping_add(i * 10)).unwrap();
        }
        oven.board_mut().switch.low = false;
        assert_eq!(
            oven.tick(base.wrapping_add(100)).unwrap().phase,
            ReflowPhase::Preheat
        );

        oven.board_mut().sensor.temp_c = 70.0;
        let soak_at = base.wrapping_add(1_000);
        assert_eq!(soak_at, 0);
        assert_eq!(oven.tick(soak_at).unwrap().phase, ReflowPhase::Soak);
        assert_eq!(oven.tick(HOLD_MS).unwrap().phase, ReflowPhase::Soak);
        assert_eq!(oven.tick(HOLD_MS + 1).unwrap().phase, ReflowPhase::Cool);
    }

    #[test]
    fn test_output_error_surfaces() {
        let mut oven = oven(25.0);
        press(&mut oven, 0, 100);
        oven.board_mut().heater.fail = true;
        oven.board_mut().heater.on = false;
        assert_eq!(oven.tick(150), Err(OvenError::Output(OutputError::Pin)));
    }
}
