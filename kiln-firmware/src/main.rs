//! Kiln - Thermal Profile Oven Firmware
//!
//! Main firmware binary for RP2040-based oven controllers: a MAX6675
//! thermocouple, a solid-state relay, a "done" LED and one push button.
//! Profiles and tuning come from oven.toml at build time.
//!
//! Wiring:
//! - SPI0 SCK GPIO18, MISO GPIO16, thermocouple CS GPIO17
//! - SSR GPIO4 (active high), done LED GPIO5
//! - Button GPIO3 to ground (internal pull-up)

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::spi::{Config as SpiConfig, Spi};
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use {defmt_rtt as _, panic_probe as _};

use kiln_core::{Board, Oven};
use kiln_drivers::display::TextStatusDisplay;
use kiln_drivers::heater::{GpioHeater, GpioIndicator};
use kiln_drivers::input::GpioSwitch;
use kiln_drivers::sensor::Max6675;

mod config;
mod display;
mod tasks;

/// MAX6675 SPI clock, the chip tops out at 4.3 MHz
const THERMOCOUPLE_SPI_HZ: u32 = 1_000_000;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Kiln firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Outputs first, so the relay is off as early as possible
    let relay = Output::new(p.PIN_4, Level::Low);
    let led = Output::new(p.PIN_5, Level::Low);
    let button = Input::new(p.PIN_3, Pull::Up);

    let mut spi_config = SpiConfig::default();
    spi_config.frequency = THERMOCOUPLE_SPI_HZ;
    let spi = Spi::new_blocking_rxonly(p.SPI0, p.PIN_18, p.PIN_16, spi_config);
    let cs = Output::new(p.PIN_17, Level::High);
    let spi_device = ExclusiveDevice::new(spi, cs, Delay).unwrap();

    let oven_config = config::oven_config();
    info!(
        "Config: room={}C cool={}C window={}ms fault_threshold={}",
        oven_config.room_temperature_c,
        oven_config.cool_min_c,
        oven_config.window_ms,
        oven_config.fault_threshold
    );

    let profiles = unwrap!(config::profile_registry());
    for profile in profiles.profiles() {
        info!(
            "Profile '{}': {}C for {}s",
            profile.name(),
            profile.soak_temperature_c(),
            profile.soak_duration_ms() / 1000
        );
    }

    let board = Board {
        sensor: Max6675::new(spi_device),
        heater: unwrap!(GpioHeater::new_active_high(relay)),
        indicator: unwrap!(GpioIndicator::new(led)),
        switch: GpioSwitch::new(button),
        display: TextStatusDisplay::new(display::LogSink),
    };
    let oven = unwrap!(Oven::new(oven_config, profiles, board));
    info!("Configuration loaded, {} profiles", oven.core().machine().profiles().len());

    spawner.spawn(tasks::control_task(oven)).unwrap();

    info!("Control task spawned, firmware running");
}
