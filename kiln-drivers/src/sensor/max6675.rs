//! MAX6675 K-type thermocouple converter
//!
//! The chip shifts out one 16-bit frame per conversion, MSB first:
//!
//! | bit  | meaning                         |
//! |------|---------------------------------|
//! | 15   | dummy sign bit (always 0)       |
//! | 14-3 | 12-bit temperature, 0.25 °C/LSB |
//! | 2    | thermocouple input open         |
//! | 1    | device ID                       |
//! | 0    | three-state                     |
//!
//! Failures are reported with the sentinel values the core's fault filter
//! understands, not as errors.

use embedded_hal::spi::SpiDevice;
use kiln_core::traits::TemperatureSensor;

/// Reading returned when the thermocouple is disconnected
pub const OPEN_THERMOCOUPLE_C: f32 = -1.0;

/// Reading returned when the SPI transfer fails
pub const BUS_ERROR_C: f32 = 0.0;

const OPEN_INPUT_BIT: u16 = 1 << 2;
const DEGREES_PER_LSB: f32 = 0.25;

/// MAX6675 on an SPI device (CS handled by the device)
pub struct Max6675<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Max6675<SPI> {
    /// Create a new sensor
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Decode one raw frame
    pub fn decode(raw: u16) -> f32 {
        if raw & OPEN_INPUT_BIT != 0 {
            return OPEN_THERMOCOUPLE_C;
        }
        f32::from(raw >> 3) * DEGREES_PER_LSB
    }

    /// Release the SPI device
    pub fn free(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> TemperatureSensor for Max6675<SPI> {
    fn read_celsius(&mut self) -> f32 {
        let mut frame = [0u8; 2];
        match self.spi.read(&mut frame) {
            Ok(()) => Self::decode(u16::from_be_bytes(frame)),
            Err(_) => BUS_ERROR_C,
        }
    }
}
