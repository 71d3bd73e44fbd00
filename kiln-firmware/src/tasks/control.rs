//! Oven control task
//!
//! Runs the whole controller tick every [`TICK_INTERVAL_MS`] and logs
//! phase transitions, sensor fault onset and output errors.

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::{Delay, Duration, Instant, Ticker};
use embedded_hal_bus::spi::ExclusiveDevice;

use kiln_core::{Oven, OvenError};
use kiln_drivers::display::TextStatusDisplay;
use kiln_drivers::heater::{GpioHeater, GpioIndicator};
use kiln_drivers::input::GpioSwitch;
use kiln_drivers::sensor::Max6675;

use crate::display::LogSink;

/// Tick interval in milliseconds
pub const TICK_INTERVAL_MS: u64 = 10;

/// Heartbeat period in ticks
const HEARTBEAT_TICKS: u32 = 1000;

/// Thermocouple on SPI0 with its own chip select
pub type Thermocouple =
    Max6675<ExclusiveDevice<Spi<'static, SPI0, Blocking>, Output<'static>, Delay>>;

/// The oven as wired on this board
pub type BoardOven = Oven<
    Thermocouple,
    GpioHeater<Output<'static>>,
    GpioIndicator<Output<'static>>,
    GpioSwitch<Input<'static>>,
    TextStatusDisplay<LogSink>,
>;

/// Control task - owns the oven and ticks it forever
#[embassy_executor::task]
pub async fn control_task(mut oven: BoardOven) {
    info!("Control task started");

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    let mut faulted = false;
    let mut ticks: u32 = 0;

    loop {
        ticker.next().await;

        // Truncation wraps every ~49 days, the core handles rollover
        let now_ms = Instant::now().as_millis() as u32;

        match oven.tick(now_ms) {
            Ok(report) => {
                if let Some(t) = report.transition {
                    info!("Phase {} -> {}", t.from.label(), t.to.label());
                }
                if report.sensor_fault && !faulted {
                    warn!("Thermocouple fault, heater disabled");
                }
                faulted = report.sensor_fault;

                if report.sampled {
                    debug!(
                        "temp={} setpoint={} duty={}ms relay={}",
                        report.temperature_c, report.setpoint_c, report.duty_ms, report.relay_on
                    );
                }
            }
            Err(OvenError::Output(e)) => warn!("Output write failed: {}", e),
            Err(OvenError::Display(e)) => warn!("Display update failed: {}", e),
            Err(OvenError::Config(e)) => error!("Configuration error: {}", e),
        }

        ticks = ticks.wrapping_add(1);
        if ticks % HEARTBEAT_TICKS == 0 {
            trace!("heartbeat phase={}", oven.core().phase());
        }
    }
}
